//! Pipeline configuration.
//!
//! Collects the column names, control labels and activity thresholds used
//! throughout the pipeline into one structure. All options have defaults
//! matching the usual laboratory conventions, so an empty TOML table is a
//! valid configuration:
//!
//! ```toml
//! [pipeline]
//! substance_id_column = "Internal ID"
//! measurement_label = "Raw Optical Density"
//! negative_control_label = "Negative Control"
//! blank_label = "Blank"
//! plate_grouping = "AcD Barcode 384"
//! blank_dataset = "Blank"
//! thresholds = [50.0]
//! mic_threshold = 50.0
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix every raw measurement label must carry
pub const RAW_PREFIX: &str = "Raw ";

/// Errors in the pipeline configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The measurement label does not start with `"Raw "`
    #[error("Measurement label {0:?} must start with \"Raw \" (e.g. \"Raw Optical Density\")")]
    MeasurementLabel(String),

    /// Several options are invalid
    #[error("Invalid pipeline configuration:\n- {}", .0.join("\n- "))]
    Invalid(Vec<String>),
}

/// Lineage barcode used to group rows into plates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlateGrouping {
    /// 96-well mother plate barcode
    #[serde(rename = "MP Barcode 96")]
    MotherPlate,
    /// 384-well assay-transfer plate barcode
    #[serde(rename = "AsT Barcode 384")]
    AssayTransfer,
    /// 384-well assay-detection plate barcode (the measured plate)
    #[default]
    #[serde(rename = "AcD Barcode 384")]
    AssayDetection,
}

impl PlateGrouping {
    /// Column name used in output tables
    pub const fn column_name(self) -> &'static str {
        match self {
            PlateGrouping::MotherPlate => "MP Barcode 96",
            PlateGrouping::AssayTransfer => "AsT Barcode 384",
            PlateGrouping::AssayDetection => "AcD Barcode 384",
        }
    }
}

impl fmt::Display for PlateGrouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Measurement label split into its raw form and base name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementLabel {
    base: String,
}

impl MeasurementLabel {
    /// Parse a raw label such as `"Raw Optical Density"`.
    ///
    /// Only the exact `"Raw "` prefix is removed; labels without it are
    /// rejected.
    pub fn from_raw_label(label: &str) -> Result<Self, ConfigError> {
        match label.strip_prefix(RAW_PREFIX) {
            Some(base) if !base.trim().is_empty() => Ok(Self {
                base: base.to_string(),
            }),
            _ => Err(ConfigError::MeasurementLabel(label.to_string())),
        }
    }

    /// Base name (`"Optical Density"`)
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `"Raw <base>"`
    pub fn raw(&self) -> String {
        format!("{}{}", RAW_PREFIX, self.base)
    }

    /// `"Denoised <base>"`
    pub fn denoised(&self) -> String {
        format!("Denoised {}", self.base)
    }

    /// `"Relative <base>"`
    pub fn relative(&self) -> String {
        format!("Relative {}", self.base)
    }
}

/// Options recognised by the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Substances column identifying each tested entity
    pub substance_id_column: String,

    /// Raw measurement label, `"Raw <base name>"`
    pub measurement_label: String,

    /// Identity label of negative-control wells (quality scoring, normalization)
    pub negative_control_label: String,

    /// Identity label of blank wells (background subtraction)
    pub blank_label: String,

    /// Per-plate aggregation key
    pub plate_grouping: PlateGrouping,

    /// Dataset tag of blank-only plates excluded from hit tables
    pub blank_dataset: String,

    /// Relative-activity cutoffs in percent
    pub thresholds: Vec<f64>,

    /// Relative-activity cutoff for MIC determination
    pub mic_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            substance_id_column: "Internal ID".to_string(),
            measurement_label: "Raw Optical Density".to_string(),
            negative_control_label: "Negative Control".to_string(),
            blank_label: "Blank".to_string(),
            plate_grouping: PlateGrouping::AssayDetection,
            blank_dataset: "Blank".to_string(),
            thresholds: vec![50.0],
            mic_threshold: 50.0,
        }
    }
}

impl PipelineConfig {
    /// Check every option, reporting all problems at once
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = Vec::new();

        if self.substance_id_column.trim().is_empty() {
            issues.push("substance_id_column must not be empty".to_string());
        }
        if let Err(e) = MeasurementLabel::from_raw_label(&self.measurement_label) {
            issues.push(e.to_string());
        }
        if self.negative_control_label.trim().is_empty() {
            issues.push("negative_control_label must not be empty".to_string());
        }
        if self.blank_label.trim().is_empty() {
            issues.push("blank_label must not be empty".to_string());
        }
        if self.blank_label == self.negative_control_label {
            issues.push(format!(
                "blank_label and negative_control_label are both {:?}",
                self.blank_label
            ));
        }
        for threshold in &self.thresholds {
            if !threshold.is_finite() || *threshold <= 0.0 {
                issues.push(format!("threshold {} must be a positive number", threshold));
            }
        }
        if !self.mic_threshold.is_finite() || self.mic_threshold <= 0.0 {
            issues.push(format!(
                "mic_threshold {} must be a positive number",
                self.mic_threshold
            ));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }

    /// Parsed measurement label
    pub fn measurement(&self) -> Result<MeasurementLabel, ConfigError> {
        MeasurementLabel::from_raw_label(&self.measurement_label)
    }
}
