//! TOML configuration file support.
//!
//! Options not given on the command line can be kept in a config file:
//!
//! ```toml
//! # platescreen.toml
//! [pipeline]
//! substance_id_column = "Internal ID"
//! measurement_label = "Raw Optical Density"
//! plate_grouping = "AcD Barcode 384"
//! thresholds = [50.0, 80.0]
//! mic_threshold = 50.0
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use platescreen::PipelineConfig;

/// Root configuration structure for platescreen.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Pipeline options; unspecified keys keep their defaults.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load the file when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line flags on top of the file values.
    ///
    /// An empty threshold list keeps the configured thresholds.
    pub fn into_pipeline(self, substance_id: Option<String>, thresholds: Vec<f64>) -> PipelineConfig {
        let mut pipeline = self.pipeline;
        if let Some(column) = substance_id {
            pipeline.substance_id_column = column;
        }
        if !thresholds.is_empty() {
            pipeline.thresholds = thresholds;
        }
        pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platescreen::config::PlateGrouping;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [pipeline]
            substance_id_column = "ID"
            measurement_label = "Raw Fluorescence"
            plate_grouping = "MP Barcode 96"
            thresholds = [50.0, 80.0]
            mic_threshold = 40.0
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.pipeline.substance_id_column, "ID");
        assert_eq!(config.pipeline.measurement_label, "Raw Fluorescence");
        assert_eq!(config.pipeline.plate_grouping, PlateGrouping::MotherPlate);
        assert_eq!(config.pipeline.thresholds, vec![50.0, 80.0]);
        assert_eq!(config.pipeline.mic_threshold, 40.0);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [pipeline]
            blank_label = "Medium"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.pipeline.blank_label, "Medium");
        assert_eq!(config.pipeline.negative_control_label, "Negative Control");
        assert_eq!(config.pipeline.thresholds, vec![50.0]);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.pipeline, PipelineConfig::default());
    }

    #[test]
    fn test_invalid_config() {
        assert!(Config::from_str("[pipeline]\nthresholds = \"high\"").is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let config = Config::from_str("[pipeline]\nthresholds = [70.0]\nsubstance_id_column = \"ID\"").unwrap();
        let pipeline = config.into_pipeline(Some("Compound".to_string()), vec![25.0, 50.0]);
        assert_eq!(pipeline.substance_id_column, "Compound");
        assert_eq!(pipeline.thresholds, vec![25.0, 50.0]);

        let config = Config::from_str("[pipeline]\nthresholds = [70.0]").unwrap();
        let pipeline = config.into_pipeline(None, Vec::new());
        assert_eq!(pipeline.thresholds, vec![70.0]);
        assert_eq!(pipeline.substance_id_column, "Internal ID");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("absent.toml"))).is_err());
        assert_eq!(Config::load(None).unwrap().pipeline, PipelineConfig::default());
    }
}
