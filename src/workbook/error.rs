/// Errors that can occur while loading an input workbook
#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    /// I/O error reading a sheet file or directory
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that could not be read
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// CSV/TSV parsing error
    #[error("CSV parsing error in sheet '{sheet}': {source}")]
    Csv {
        /// Sheet being parsed
        sheet: String,
        /// Underlying error
        #[source]
        source: csv::Error,
    },

    /// The workbook path is not a directory of sheets
    #[error("Workbook not found: {0}")]
    NotFound(String),
}
