use crate::metadata::MetadataError;

/// Errors raised while joining metadata, lineage and measurements
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Lineage mappings are inconsistent
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Substance mother plates that the lineage mapping does not know
    #[error("Mother plates {barcodes:?} from the Substances sheet are not origin barcodes of mapping '{mapping}'")]
    UnmappedMotherPlates {
        /// Mapping file name
        mapping: String,
        /// Barcodes without lineage
        barcodes: Vec<String>,
    },

    /// Nothing joined; the merged table would be empty
    #[error(
        "No measurement matched the experiment layout ({measurements} measurements, {layout_rows} layout rows); \
         check that reader barcodes and positions match the AcD barcodes of the lineage mapping"
    )]
    NoMatches {
        /// Raw measurements offered
        measurements: usize,
        /// Layout rows after the concentration join
        layout_rows: usize,
    },
}
