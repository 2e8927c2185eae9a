/// Errors raised by the position codec
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    /// A well label is not a letter followed by digits
    #[error("Invalid well position {text:?}: {reason}")]
    Format {
        /// Offending text
        text: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// A row, column or quadrant lies outside the allowed range
    #[error("Position out of range: {0}")]
    Domain(String),
}
