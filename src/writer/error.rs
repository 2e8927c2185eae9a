use crate::pipeline::PipelineError;

/// Errors that can occur while writing result files
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the CSV writer
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error serializing the run summary
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A pipeline stage failed while producing a table
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The output path exists and is not a directory
    #[error("Output path {0} is not a directory")]
    NotADirectory(String),
}
