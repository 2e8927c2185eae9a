use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use platescreen::config::MeasurementLabel;
use platescreen::process::precipitation_test;
use platescreen::reader::{collect_measurements, read_readerfiles};
use platescreen::writer::write_precipitation;

/// Run the precipitation test over a directory of reader exports
pub fn run(readouts: PathBuf, output: Option<PathBuf>, measurement: String) -> Result<()> {
    let label = MeasurementLabel::from_raw_label(&measurement)?;
    let files = read_readerfiles(&readouts)
        .with_context(|| format!("Failed to read exports from {}", readouts.display()))?;
    let measurements = collect_measurements(&files)?;
    let result = precipitation_test(&measurements, None)?;

    info!(
        "Limit of quantification {}: {} of {} wells precipitated",
        result.limit_of_quantification,
        result.precipitated().count(),
        result.wells.len()
    );

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_precipitation(BufWriter::new(file), &result, &label)?;
            println!(
                "Wrote {} wells to {} ({} precipitated)",
                result.wells.len(),
                path.display(),
                result.precipitated().count()
            );
        }
        None => {
            write_precipitation(io::stdout().lock(), &result, &label)?;
        }
    }
    Ok(())
}
