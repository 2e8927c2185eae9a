use std::collections::HashSet;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::geometry::PlateFormat;
use crate::position::{PositionError, WellPosition};
use crate::reader::RawMeasurement;

use super::stats::{mean, round3, sample_std};

/// Default background wells: the last column of every row
pub fn default_background_locations(format: PlateFormat) -> Vec<WellPosition> {
    format
        .row_letters()
        .map(|row| WellPosition::new(row, format.columns()))
        .collect()
}

/// `round3(mean + 10 · sd)` of the background readings (sample sd)
pub fn limit_of_quantification(background: &[f64]) -> f64 {
    round3(mean(background) + 10.0 * sample_std(background))
}

/// One well of a precipitation test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationWell {
    /// Plate barcode
    pub barcode: String,
    /// Well position
    pub position: WellPosition,
    /// Raw reading
    pub raw: f64,
    /// Whether the well is a background well
    pub background: bool,
    /// Reading above the limit of quantification
    pub precipitated: bool,
}

/// Result of [`precipitation_test`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationResult {
    /// Limit of quantification shared by every plate of the batch
    pub limit_of_quantification: f64,
    /// Every measured well
    pub wells: Vec<PrecipitationWell>,
}

impl PrecipitationResult {
    /// Precipitated wells only
    pub fn precipitated(&self) -> impl Iterator<Item = &PrecipitationWell> {
        self.wells.iter().filter(|w| w.precipitated)
    }
}

/// Flag wells whose reading exceeds the limit of quantification.
///
/// The limit is derived from the background wells of all plates together;
/// `background` defaults to [`default_background_locations`] of the batch's
/// plate format. Custom locations must lie on that format.
pub fn precipitation_test(
    measurements: &[RawMeasurement],
    background: Option<&[WellPosition]>,
) -> Result<PrecipitationResult, PositionError> {
    let format = measurements
        .first()
        .map(|m| m.plate_format)
        .unwrap_or(PlateFormat::Wells384);
    let locations: HashSet<WellPosition> = match background {
        Some(custom) => {
            for position in custom {
                position.check_format(format)?;
            }
            custom.iter().copied().collect()
        }
        None => default_background_locations(format).into_iter().collect(),
    };

    let readings: Vec<f64> = measurements
        .iter()
        .filter(|m| locations.contains(&m.position))
        .map(|m| m.value)
        .collect();
    if readings.len() < 2 {
        warn!(
            "Only {} background readings; the limit of quantification is undefined",
            readings.len()
        );
    }
    let loq = limit_of_quantification(&readings);

    let wells: Vec<PrecipitationWell> = measurements
        .iter()
        .map(|m| PrecipitationWell {
            barcode: m.barcode.clone(),
            position: m.position,
            raw: m.value,
            background: locations.contains(&m.position),
            precipitated: m.value > loq,
        })
        .collect();

    info!(
        "Precipitation test: limit of quantification {}, {} of {} wells precipitated",
        loq,
        wells.iter().filter(|w| w.precipitated).count(),
        wells.len()
    );
    Ok(PrecipitationResult {
        limit_of_quantification: loq,
        wells,
    })
}
