use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::process::PlateQuality;
use crate::reconcile::PlateRowCount;

use super::WriterError;

/// Machine-readable overview of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// RFC 3339 timestamp of the run
    pub generated_at: String,
    /// Crate version that produced the outputs
    pub version: String,
    /// Configuration in effect
    pub config: PipelineConfig,
    /// Processed rows
    pub records: usize,
    /// Per-plate quality scores (non-finite values serialize as `null`)
    pub plates: Vec<PlateQuality>,
    /// Per-mother-plate join diagnostics
    pub row_counts: Vec<PlateRowCount>,
    /// Hit count per threshold
    pub hits: BTreeMap<String, usize>,
    /// Substance/organism/replicate series with a MIC
    pub mic_determined: usize,
    /// Output files written, relative to the output directory
    pub files: Vec<String>,
}

impl RunSummary {
    /// Start a summary stamped with the current time
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            config,
            records: 0,
            plates: Vec::new(),
            row_counts: Vec::new(),
            hits: BTreeMap::new(),
            mic_determined: 0,
            files: Vec::new(),
        }
    }

    /// Plates whose Z-factor is below `cutoff` or undefined
    pub fn poor_plates(&self, cutoff: f64) -> Vec<&PlateQuality> {
        self.plates
            .iter()
            .filter(|p| p.z_factor.is_nan() || p.z_factor < cutoff)
            .collect()
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String, WriterError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
