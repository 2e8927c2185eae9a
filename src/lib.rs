//! # platescreen - Microtiter Plate Screening Pipeline
//!
//! `platescreen` turns plate-reader measurements of an antimicrobial
//! screening experiment into normalized, quality-scored activity tables.
//!
//! ## Key Features
//!
//! - **Well-position codec**: parse and format labels like `"A1"`/`"P24"`
//!   and map 96-well positions into one of the four quadrants of a
//!   384-well plate.
//!
//! - **Metadata reconciliation**: joins the substance library with the
//!   mother → transfer → detection plate lineage, the organism and dilution
//!   layout, the control wells and the raw measurements.
//!
//! - **Normalization and quality scoring**: per-plate blank subtraction,
//!   normalization to negative controls, Z-factor and robust Z-factor.
//!
//! - **Hit calling**: hit tables per threshold, substance × organism set
//!   membership and minimum inhibitory concentrations.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use platescreen::pipeline::Experiment;
//! use platescreen::writer::write_experiment;
//! use platescreen::PipelineConfig;
//!
//! let mut experiment = Experiment::from_paths(
//!     PipelineConfig::default(),
//!     "input/workbook",
//!     "input/readouts",
//!     "input/mp_ast.txt",
//!     "input/ast_acd.txt",
//! )?;
//!
//! for hit in experiment.hits(50.0)? {
//!     println!("{} inhibits {:?}", hit.internal_id, hit.organism_formatted);
//! }
//!
//! let summary = write_experiment(&mut experiment, "results")?;
//! println!("{}", summary);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! This writes:
//! ```text
//! results/
//! ├── processed.csv            # merged metadata + raw/denoised/relative values
//! ├── hits_50.csv              # aggregated hits below 50 %
//! ├── set_membership_50.csv    # substance × organism table
//! ├── mic.csv                  # minimum inhibitory concentrations
//! └── summary.json             # config, plate quality, join diagnostics
//! ```
//!
//! ## Architecture
//!
//! - [`geometry`]: supported plate formats and their dimensions
//! - [`position`]: well labels and the 96 → 384 quadrant mapping
//! - [`config`]: pipeline options and measurement column naming
//! - [`workbook`]: directory-of-sheets input
//! - [`validator`]: aggregated workbook checks
//! - [`metadata`]: typed sheet records and plate-lineage mappings
//! - [`reader`]: plate-reader export parser
//! - [`reconcile`]: the join chain producing merged records
//! - [`process`]: statistics, normalization, Z-factors, precipitation test
//! - [`threshold`]: hit tables, set membership, MIC
//! - [`pipeline`]: lazily computed, cached pipeline stages
//! - [`writer`]: CSV tables and the JSON run summary

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
// Allow some patterns common in scientific code
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod geometry;
pub mod metadata;
pub mod pipeline;
pub mod position;
pub mod process;
pub mod reader;
pub mod reconcile;
pub mod threshold;
pub mod validator;
pub mod workbook;
pub mod writer;

pub use config::PipelineConfig;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{MeasurementLabel, PipelineConfig, PlateGrouping};
    pub use crate::geometry::PlateFormat;
    pub use crate::metadata::{read_inputs, read_inputs_dir, ExperimentInputs, PlateMapping};
    pub use crate::pipeline::{Experiment, PipelineError, StageKey};
    pub use crate::position::{map_96_to_384, parse_position, Quadrant, WellPosition};
    pub use crate::process::{robust_zfactor, zfactor, PlateQuality, ProcessedRecord};
    pub use crate::reader::{read_readerfiles, RawMeasurement, ReaderFile};
    pub use crate::reconcile::MergedRecord;
    pub use crate::threshold::{HitRecord, MembershipTable, MicRecord};
    pub use crate::validator::{validate_workbook, ValidationReport};
    pub use crate::workbook::Workbook;
    pub use crate::writer::{write_experiment, RunSummary, WriterError};
}
