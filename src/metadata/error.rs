use crate::position::PositionError;
use crate::workbook::WorkbookError;

/// Errors that can occur while reading experiment metadata
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// The workbook could not be loaded
    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    /// I/O error reading a mapping file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Aggregated workbook validation failure
    #[error(
        "Input file validation failed. Please fix the following issues in {workbook}:\n- {}",
        .issues.join("\n- ")
    )]
    Validation {
        /// Workbook that failed validation
        workbook: String,
        /// Every failed check, in check order
        issues: Vec<String>,
    },

    /// A sheet value could not be typed
    #[error("Invalid value in sheet '{sheet}', row {row}, column '{column}': {message}")]
    InvalidValue {
        /// Sheet name
        sheet: String,
        /// 1-based data row
        row: usize,
        /// Column header
        column: String,
        /// What is wrong
        message: String,
    },

    /// A well position could not be converted
    #[error(transparent)]
    Position(#[from] PositionError),

    /// Malformed plate-lineage mapping file
    #[error("Invalid mapping file '{mapping}' (line {line}): {message}")]
    Mapping {
        /// Mapping file name
        mapping: String,
        /// 1-based line number
        line: usize,
        /// What is wrong
        message: String,
    },

    /// Origin barcodes in a mapping file differ from the expected set
    #[error(
        "The origin barcodes from the mapping file '{mapping}' and the expected barcodes do not coincide (missing in file: [{}]; unexpected in file: [{}])",
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    BarcodeMismatch {
        /// Mapping file name
        mapping: String,
        /// Expected barcodes absent from the file
        missing: Vec<String>,
        /// Barcodes in the file that were not expected
        unexpected: Vec<String>,
    },

    /// Inconsistent barcodes between lineage levels
    #[error("Please check the mapping .txt files.\n- {}", .0.join("\n- "))]
    Lineage(Vec<String>),
}
