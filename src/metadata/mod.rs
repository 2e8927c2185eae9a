//! # Experiment Metadata
//!
//! Typed views of the experiment workbook and the plate-lineage mapping
//! files.
//!
//! ## Inputs
//!
//! 1. **Substances**: tested entities with dataset tag, mother-plate barcode
//!    and well position (96-well + quadrant, or 384-well directly)
//! 2. **Organisms**: test organisms, one assay-detection rack each
//! 3. **Dilutions**: concentration levels, one assay-transfer rack each
//! 4. **Controls**: blank, negative-control and positive-control wells,
//!    identical on every assay plate
//! 5. **Lineage**: mother plate → assay-transfer plates → assay-detection
//!    plates, read from barcode-reader mapping files
//!
//! [`generate_input_table`] produces a placeholder input table for new
//! experiments.
//!
//! [`read_inputs`] validates the whole workbook first and fails with a
//! single [`MetadataError::Validation`] listing every problem.

mod error;

pub(crate) mod controls;
pub(crate) mod dilutions;
pub(crate) mod lineage;
pub(crate) mod organisms;
pub(crate) mod substances;
mod template;


use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::validator::{validate_workbook, CheckStatus};
use crate::workbook::{Sheet, Workbook, WorkbookError};

pub use controls::{read_controls, Control, ControlRole};
pub use dilutions::{read_dilutions, split_unit_header, Dilution};
pub use error::MetadataError;
pub use lineage::{
    parse_mappingfile, parse_mappingfile_path, read_platemapping, read_platemapping_file,
    validate_lineage, LineageRow, PlateMapping,
};
pub use organisms::{format_organism_name, read_organisms, Organism, ORGANISM_COLUMN, RACK_COLUMN};
pub use substances::{
    read_substances, Substance, COL_384_COLUMN, COL_96_COLUMN, DATASET_COLUMN,
    MP_BARCODE_COLUMN, POSITION_384_COLUMN, POSITION_96_COLUMN, QUADRANT_COLUMN,
    ROW_384_COLUMN, ROW_96_COLUMN,
};
pub use template::{generate_input_table, TemplateRow, DEFAULT_TEMPLATE_BARCODE};

/// The four typed workbook sheets of one experiment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentInputs {
    /// Tested substances
    pub substances: Vec<Substance>,
    /// Test organisms
    pub organisms: Vec<Organism>,
    /// Concentration levels
    pub dilutions: Vec<Dilution>,
    /// Control wells
    pub controls: Vec<Control>,
}

impl ExperimentInputs {
    /// Mother-plate barcodes of all substances, in first-seen order
    pub fn mother_plates(&self) -> Vec<String> {
        let mut barcodes: Vec<String> = Vec::new();
        for substance in &self.substances {
            if !substance.mp_barcode.is_empty() && !barcodes.contains(&substance.mp_barcode) {
                barcodes.push(substance.mp_barcode.clone());
            }
        }
        barcodes
    }
}

fn required<'a>(workbook: &'a Workbook, name: &str) -> Result<&'a Sheet, MetadataError> {
    workbook
        .sheet(name)
        .ok_or_else(|| WorkbookError::NotFound(format!("{} (sheet '{}')", workbook.source, name)).into())
}

/// Validate and type the experiment workbook
pub fn read_inputs(workbook: &Workbook, config: &PipelineConfig) -> Result<ExperimentInputs, MetadataError> {
    let report = validate_workbook(workbook, &config.substance_id_column);
    for check in &report.checks {
        if let CheckStatus::Warning(msg) = &check.status {
            warn!("{}: {}", check.name, msg);
        }
    }
    if report.has_failures() {
        return Err(MetadataError::Validation {
            workbook: workbook.source.clone(),
            issues: report.failure_messages(),
        });
    }

    let inputs = ExperimentInputs {
        substances: read_substances(required(workbook, "Substances")?, &config.substance_id_column)?,
        organisms: read_organisms(required(workbook, "Organisms")?)?,
        dilutions: read_dilutions(required(workbook, "Dilutions")?)?,
        controls: read_controls(
            required(workbook, "Controls")?,
            &config.substance_id_column,
            &config.blank_label,
            &config.negative_control_label,
        )?,
    };

    info!(
        "Read {} substances, {} organisms, {} dilutions, {} controls from {}",
        inputs.substances.len(),
        inputs.organisms.len(),
        inputs.dilutions.len(),
        inputs.controls.len(),
        workbook.source
    );
    Ok(inputs)
}

/// Load a workbook directory and type it, see [`read_inputs`]
pub fn read_inputs_dir<P: AsRef<Path>>(dir: P, config: &PipelineConfig) -> Result<ExperimentInputs, MetadataError> {
    let workbook = Workbook::from_dir(dir)?;
    read_inputs(&workbook, config)
}
