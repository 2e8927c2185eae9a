//! # Result Writer
//!
//! Writes the tables of a pipeline run to an output directory:
//!
//! | file | content |
//! |---|---|
//! | `processed.csv` | merged columns plus raw, denoised and relative measurement, Z-Factor, Robust Z-Factor |
//! | `hits_<threshold>.csv` | hits aggregated per substance and organism |
//! | `set_membership_<threshold>.csv` | binary substance × organism table |
//! | `mic.csv` | minimum inhibitory concentrations |
//! | `summary.json` | configuration, per-plate quality, join diagnostics |
//!
//! Missing values (`None`, `NaN`) are written as empty cells. The table
//! writers are generic over [`std::io::Write`] and usable on their own.

mod error;
mod summary;
mod tables;

#[cfg(test)]
mod tests;

use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use log::info;

use crate::pipeline::Experiment;

pub use error::WriterError;
pub use summary::RunSummary;
pub use tables::{
    write_hits, write_membership, write_mic, write_precipitation, write_processed,
    write_template,
};

/// File-name label of a threshold (`50.0` → `"50"`, `12.5` → `"12.5"`)
pub fn threshold_label(threshold: f64) -> String {
    threshold.to_string()
}

fn create(dir: &Path, name: &str) -> Result<BufWriter<File>, WriterError> {
    Ok(BufWriter::new(File::create(dir.join(name))?))
}

/// Compute every stage of `experiment` and write its tables.
///
/// Hit and set-membership tables are written for each configured
/// threshold. Returns the summary that was written to `summary.json`.
pub fn write_experiment<P: AsRef<Path>>(
    experiment: &mut Experiment,
    output_dir: P,
) -> Result<RunSummary, WriterError> {
    let dir = output_dir.as_ref();
    if dir.exists() && !dir.is_dir() {
        return Err(WriterError::NotADirectory(dir.display().to_string()));
    }
    fs::create_dir_all(dir)?;

    let config = experiment.config().clone();
    let measurement = experiment.measurement().clone();
    let id_column = config.substance_id_column.as_str();
    let mut summary = RunSummary::new(config.clone());

    summary.row_counts = experiment.merged()?.diagnostics.clone();

    let processed = experiment.processed()?;
    summary.records = write_processed(
        create(dir, "processed.csv")?,
        &processed.records,
        id_column,
        &measurement,
    )?;
    summary.plates = processed.quality.clone();
    summary.files.push("processed.csv".to_string());

    for &threshold in &config.thresholds {
        let label = threshold_label(threshold);

        let name = format!("hits_{}.csv", label);
        let hits = experiment.hits(threshold)?;
        let count = write_hits(create(dir, &name)?, hits, id_column, &measurement)?;
        summary.hits.insert(label.clone(), count);
        summary.files.push(name);

        let name = format!("set_membership_{}.csv", label);
        let table = experiment.set_membership(threshold)?;
        write_membership(create(dir, &name)?, table, id_column)?;
        summary.files.push(name);
    }

    let mics = experiment.mic()?;
    write_mic(create(dir, "mic.csv")?, mics, id_column)?;
    summary.mic_determined = mics.iter().filter(|m| m.mic.is_some()).count();
    summary.files.push("mic.csv".to_string());

    summary.files.push("summary.json".to_string());
    fs::write(dir.join("summary.json"), summary.to_json()?)?;

    info!("{} in {}", summary, dir.display());
    Ok(summary)
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} files: {} processed rows on {} plates, {} MIC values",
            self.files.len(),
            self.records,
            self.plates.len(),
            self.mic_determined
        )
    }
}
