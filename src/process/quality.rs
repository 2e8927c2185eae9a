use serde::{Deserialize, Serialize};

use super::stats::{mad, mean, median, population_std};

/// Z-factor of two control populations.
///
/// `1 - 3·(σ₊ + σ₋) / |μ₊ - μ₋|` with population standard deviations.
/// Coinciding means give `±inf` or `NaN`.
///
/// ```
/// use platescreen::process::zfactor;
///
/// let z = zfactor(&[0.1, 0.01, 0.1], &[1.0, 1.0, 0.9]);
/// assert!((z - 0.7).abs() < 1e-2);
/// ```
pub fn zfactor(positive: &[f64], negative: &[f64]) -> f64 {
    1.0 - 3.0 * (population_std(positive) + population_std(negative))
        / (mean(positive) - mean(negative)).abs()
}

/// Z-factor with median for mean and median absolute deviation for std
pub fn robust_zfactor(positive: &[f64], negative: &[f64]) -> f64 {
    1.0 - 3.0 * (mad(positive) + mad(negative)) / (median(positive) - median(negative)).abs()
}

/// Scalars of one plate group, computed once and broadcast to its rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateQuality {
    /// Plate key (barcode of the grouping column)
    pub plate: String,
    /// Mean raw value of the blank wells
    pub blank_mean: f64,
    /// Mean denoised value of the negative-control wells
    pub negative_mean: f64,
    /// Z-factor of negative controls against blanks
    pub z_factor: f64,
    /// Robust Z-factor of negative controls against blanks
    pub robust_z_factor: f64,
    /// Blank wells in the group
    pub blank_count: usize,
    /// Negative-control wells in the group
    pub negative_count: usize,
}

impl PlateQuality {
    /// Score a plate from its raw blank and negative-control readings
    pub fn from_controls(plate: impl Into<String>, blanks: &[f64], negatives: &[f64]) -> Self {
        let blank_mean = mean(blanks);
        let denoised: Vec<f64> = negatives.iter().map(|v| v - blank_mean).collect();
        Self {
            plate: plate.into(),
            blank_mean,
            negative_mean: mean(&denoised),
            z_factor: zfactor(negatives, blanks),
            robust_z_factor: robust_zfactor(negatives, blanks),
            blank_count: blanks.len(),
            negative_count: negatives.len(),
        }
    }

    /// Whether both control populations were present
    pub fn has_controls(&self) -> bool {
        self.blank_count > 0 && self.negative_count > 0
    }

    /// Background-subtracted value
    pub fn denoise(&self, raw: f64) -> f64 {
        raw - self.blank_mean
    }

    /// Denoised value as percent of the negative-control mean
    pub fn relative(&self, denoised: f64) -> f64 {
        super::max_normalization(denoised, self.negative_mean)
    }
}
