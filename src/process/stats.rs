//! Descriptive statistics over `f64` slices.
//!
//! Empty input gives `NaN` throughout; nothing here panics or returns an
//! error.

/// Arithmetic mean
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sum_squared_deviations(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum()
}

/// Population standard deviation (divides by `n`)
pub fn population_std(values: &[f64]) -> f64 {
    (sum_squared_deviations(values) / values.len() as f64).sqrt()
}

/// Sample standard deviation (divides by `n - 1`); `NaN` below two values
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    (sum_squared_deviations(values) / (values.len() - 1) as f64).sqrt()
}

/// Median; the mean of the two middle values for even lengths
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Median absolute deviation from the median (unscaled)
pub fn mad(values: &[f64]) -> f64 {
    let center = median(values);
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round to 2 decimals
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Round to 3 decimals
pub fn round3(value: f64) -> f64 {
    round_to(value, 3)
}
