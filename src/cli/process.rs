use anyhow::{Context, Result};
use log::{info, warn};
use std::path::PathBuf;

use platescreen::pipeline::Experiment;
use platescreen::writer::write_experiment;

use super::config::Config;

/// Z-factor below which a plate is reported as poorly separated
const POOR_PLATE_CUTOFF: f64 = 0.5;

/// Run the full pipeline and write its tables
#[allow(clippy::too_many_arguments)]
pub fn run(
    input: PathBuf,
    readouts: PathBuf,
    mp_ast: PathBuf,
    ast_acd: PathBuf,
    output: PathBuf,
    config_path: Option<PathBuf>,
    substance_id: Option<String>,
    thresholds: Vec<f64>,
) -> Result<()> {
    let config = Config::load(config_path.as_deref())?.into_pipeline(substance_id, thresholds);

    info!("platescreen process");
    info!("  Workbook: {}", input.display());
    info!("  Readouts: {}", readouts.display());
    info!("  Output:   {}", output.display());

    let mut experiment = Experiment::from_paths(config, &input, &readouts, &mp_ast, &ast_acd)
        .context("Failed to load experiment inputs")?;
    let summary = write_experiment(&mut experiment, &output)
        .with_context(|| format!("Failed to write results to {}", output.display()))?;

    for plate in summary.poor_plates(POOR_PLATE_CUTOFF) {
        warn!(
            "Plate {} has Z-factor {:.2} (blanks: {}, negative controls: {})",
            plate.plate, plate.z_factor, plate.blank_count, plate.negative_count
        );
    }

    println!("{}", summary);
    for (threshold, count) in &summary.hits {
        println!("  hits below {}%: {}", threshold, count);
    }
    Ok(())
}
