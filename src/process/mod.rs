//! # Normalization & Quality Engine
//!
//! Per-plate background subtraction, normalization against negative
//! controls and Z-factor quality scoring, plus the precipitation test.
//!
//! ## Per-plate scalars
//!
//! For every plate group (see [`PlateGrouping`](crate::config::PlateGrouping)):
//!
//! | scalar | definition |
//! |---|---|
//! | blank mean | mean raw value of the blank wells |
//! | negative mean | mean denoised value of the negative-control wells |
//! | Z-factor | `1 - 3(σ_neg + σ_blank) / \|μ_neg - μ_blank\|` |
//! | robust Z-factor | as above with median and MAD |
//!
//! Each row then gets `denoised = raw - blank mean` and
//! `relative = denoised / negative mean · 100`. Degenerate plates are not
//! errors: missing controls or coinciding means yield `NaN` or `±inf`.
//!
//! ## Example
//!
//! ```
//! use platescreen::process::{robust_zfactor, zfactor};
//!
//! let negatives = [0.8, 0.9, 1.0];
//! let blanks = [0.1, 0.2];
//! assert!((zfactor(&negatives, &blanks) - 0.4734).abs() < 1e-4);
//! assert!((robust_zfactor(&negatives, &blanks) - 0.4).abs() < 1e-9);
//! ```

mod normalize;
mod precipitation;
mod quality;
mod stats;


pub use normalize::{
    background_normalize_zfactor, max_normalization, minmax_normalization, ProcessedRecord,
    ProcessedTable,
};
pub use precipitation::{
    default_background_locations, limit_of_quantification, precipitation_test,
    PrecipitationResult, PrecipitationWell,
};
pub use quality::{robust_zfactor, zfactor, PlateQuality};
pub use stats::{mad, mean, median, population_std, round2, round3, round_to, sample_std};
