use crate::config::ConfigError;
use crate::metadata::MetadataError;
use crate::reader::ReaderError;
use crate::reconcile::ReconcileError;

/// Errors raised while assembling or running an experiment
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Invalid pipeline configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Workbook or mapping file problem
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Plate-reader export problem
    #[error(transparent)]
    Reader(#[from] ReaderError),

    /// Join failure
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}
