use crate::geometry::GeometryError;

/// Errors that can occur while reading plate-reader exports
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// I/O error reading an export or listing a directory
    #[error("Failed to read {path}: {source}")]
    IoError {
        /// Path that could not be read
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The export contains no lines
    #[error("Empty raw file {0}.")]
    Empty(String),

    /// A section of the export is malformed
    #[error("Invalid reader file '{file}' (line {line}): {message}")]
    InvalidFormat {
        /// File name
        file: String,
        /// 1-based line number among non-empty lines
        line: usize,
        /// What is wrong
        message: String,
    },

    /// The export declares an unsupported plate type
    #[error("Reader file '{file}': {source}")]
    Geometry {
        /// File name
        file: String,
        /// Underlying error
        #[source]
        source: GeometryError,
    },

    /// Exports in one batch use different plate types
    #[error("Different plate types used {0:?}")]
    MixedPlateTypes(Vec<u32>),
}
