//! # Pipeline orchestration
//!
//! [`Experiment`] wires the stages together:
//!
//! ```text
//! workbook + lineage + readouts
//!     → reconcile            (StageKey::Merged)
//!     → normalize + score    (StageKey::Processed)
//!     → hits / membership    (StageKey::Hits, StageKey::Membership per threshold)
//!     → MIC                  (StageKey::Mic)
//! ```
//!
//! Each stage is a pure function of the previous one. Results are computed
//! on first access and kept in an explicit cache; later accesses return the
//! cached table.
//!
//! ```no_run
//! use platescreen::pipeline::Experiment;
//! use platescreen::PipelineConfig;
//!
//! let mut experiment = Experiment::from_paths(
//!     PipelineConfig::default(),
//!     "input",
//!     "readouts",
//!     "mp_ast.txt",
//!     "ast_acd.txt",
//! )?;
//! let hits = experiment.hits(50.0)?;
//! println!("{} hits", hits.len());
//! # Ok::<(), platescreen::pipeline::PipelineError>(())
//! ```

mod cache;
mod error;

#[cfg(test)]
mod tests;

use std::path::Path;

use log::info;

use crate::config::{MeasurementLabel, PipelineConfig};
use crate::metadata::{read_inputs_dir, read_platemapping_file, ExperimentInputs, PlateMapping};
use crate::process::ProcessedTable;
use crate::reader::{collect_measurements, read_readerfiles, RawMeasurement};
use crate::reconcile::ReconciledTable;
use crate::threshold::{HitRecord, MembershipTable, MicRecord};

pub use cache::StageKey;
pub use error::PipelineError;

use cache::StageCache;

/// Immutable inputs of an experiment
#[derive(Debug)]
struct Sources {
    inputs: ExperimentInputs,
    mp_ast: PlateMapping,
    ast_acd: PlateMapping,
    measurements: Vec<RawMeasurement>,
}

/// One screening experiment with memoized stage outputs
#[derive(Debug)]
pub struct Experiment {
    config: PipelineConfig,
    measurement: MeasurementLabel,
    sources: Sources,
    cache: StageCache,
}

impl Experiment {
    /// Assemble an experiment from typed inputs; fails on an invalid
    /// configuration
    pub fn new(
        config: PipelineConfig,
        inputs: ExperimentInputs,
        mp_ast: PlateMapping,
        ast_acd: PlateMapping,
        measurements: Vec<RawMeasurement>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let measurement = config.measurement()?;
        Ok(Self {
            config,
            measurement,
            sources: Sources {
                inputs,
                mp_ast,
                ast_acd,
                measurements,
            },
            cache: StageCache::default(),
        })
    }

    /// Load every input from disk.
    ///
    /// The mother → transfer mapping must list exactly the mother plates of
    /// the Substances sheet; the transfer → detection mapping must list
    /// exactly the transfer plates of the first mapping.
    pub fn from_paths<P, R, M, A>(
        config: PipelineConfig,
        workbook_dir: P,
        readouts_dir: R,
        mp_ast_path: M,
        ast_acd_path: A,
    ) -> Result<Self, PipelineError>
    where
        P: AsRef<Path>,
        R: AsRef<Path>,
        M: AsRef<Path>,
        A: AsRef<Path>,
    {
        config.validate()?;
        let inputs = read_inputs_dir(workbook_dir, &config)?;
        let mp_ast = read_platemapping_file(mp_ast_path, &inputs.mother_plates())?;

        let mut transfer_plates: Vec<String> = Vec::new();
        for ast in mp_ast.children() {
            if !ast.is_empty() && !transfer_plates.iter().any(|t| t == ast) {
                transfer_plates.push(ast.to_string());
            }
        }
        let ast_acd = read_platemapping_file(ast_acd_path, &transfer_plates)?;

        let files = read_readerfiles(readouts_dir)?;
        let measurements = collect_measurements(&files)?;
        info!(
            "Loaded {} measurements from {} reader files",
            measurements.len(),
            files.len()
        );
        Self::new(config, inputs, mp_ast, ast_acd, measurements)
    }

    /// Pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parsed measurement label
    pub fn measurement(&self) -> &MeasurementLabel {
        &self.measurement
    }

    /// Typed workbook
    pub fn inputs(&self) -> &ExperimentInputs {
        &self.sources.inputs
    }

    /// Reconciled table
    pub fn merged(&mut self) -> Result<&ReconciledTable, PipelineError> {
        Ok(self.cache.merged(&self.sources)?)
    }

    /// Normalized table with per-plate quality
    pub fn processed(&mut self) -> Result<&ProcessedTable, PipelineError> {
        Ok(self.cache.processed(&self.sources, &self.config)?)
    }

    /// Hit table for one threshold
    pub fn hits(&mut self, threshold: f64) -> Result<&[HitRecord], PipelineError> {
        Ok(self.cache.hits(&self.sources, &self.config, threshold)?)
    }

    /// Set-membership table for one threshold
    pub fn set_membership(&mut self, threshold: f64) -> Result<&MembershipTable, PipelineError> {
        Ok(self.cache.membership(&self.sources, &self.config, threshold)?)
    }

    /// MIC table
    pub fn mic(&mut self) -> Result<&[MicRecord], PipelineError> {
        Ok(self.cache.mic(&self.sources, &self.config)?)
    }

    /// Stages computed so far
    pub fn cached_stages(&self) -> Vec<StageKey> {
        self.cache.keys()
    }
}
