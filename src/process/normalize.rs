use std::collections::HashMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::reconcile::MergedRecord;

use super::quality::PlateQuality;
use super::stats::round2;

/// Scale `x` into the `[minimum, maximum]` range, in percent
pub fn minmax_normalization(x: f64, minimum: f64, maximum: f64) -> f64 {
    (x - minimum) / (maximum - minimum) * 100.0
}

/// `x` as percent of `maximum`
pub fn max_normalization(x: f64, maximum: f64) -> f64 {
    x / maximum * 100.0
}

/// A merged record with its background-corrected and normalized values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    /// Merged record; its concentration is rounded to 2 decimals
    pub record: MergedRecord,
    /// Raw value minus the plate's blank mean
    pub denoised: f64,
    /// Denoised value as percent of the plate's negative-control mean
    pub relative: f64,
    /// Z-factor of the record's plate
    pub z_factor: f64,
    /// Robust Z-factor of the record's plate
    pub robust_z_factor: f64,
}

/// Output of [`background_normalize_zfactor`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedTable {
    /// Processed records, in merged order
    pub records: Vec<ProcessedRecord>,
    /// One entry per plate group, in first-seen order
    pub quality: Vec<PlateQuality>,
}

/// Subtract background, normalize against negative controls and score
/// every plate.
///
/// Records are grouped by [`PipelineConfig::plate_grouping`]. Blank and
/// negative-control wells are recognised by their identity label. Per-plate
/// scalars are computed once per group and joined back onto each row;
/// plates without blanks or negative controls produce `NaN` values.
pub fn background_normalize_zfactor(
    records: &[MergedRecord],
    config: &PipelineConfig,
) -> ProcessedTable {
    // group
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, (Vec<f64>, Vec<f64>)> = HashMap::new();
    for record in records {
        let plate = record.plate_barcode(config.plate_grouping);
        let (blanks, negatives) = groups.entry(plate).or_insert_with(|| {
            order.push(plate);
            (Vec::new(), Vec::new())
        });
        if record.internal_id == config.blank_label {
            blanks.push(record.raw);
        } else if record.internal_id == config.negative_control_label {
            negatives.push(record.raw);
        }
    }

    // scalars
    let quality: Vec<PlateQuality> = order
        .iter()
        .map(|plate| {
            let (blanks, negatives) = &groups[plate];
            let q = PlateQuality::from_controls(*plate, blanks, negatives);
            if q.blank_count == 0 {
                warn!("Plate {} has no '{}' wells", plate, config.blank_label);
            }
            if q.negative_count == 0 {
                warn!("Plate {} has no '{}' wells", plate, config.negative_control_label);
            }
            debug!(
                "Plate {}: blank mean {:.4}, negative mean {:.4}, Z-factor {:.3}, robust Z-factor {:.3}",
                plate, q.blank_mean, q.negative_mean, q.z_factor, q.robust_z_factor
            );
            q
        })
        .collect();

    // join back
    let by_plate: HashMap<&str, &PlateQuality> =
        quality.iter().map(|q| (q.plate.as_str(), q)).collect();
    let processed = records
        .iter()
        .filter_map(|record| {
            let q = by_plate.get(record.plate_barcode(config.plate_grouping))?;
            let denoised = q.denoise(record.raw);
            let mut record = record.clone();
            record.concentration = record.concentration.map(round2);
            Some(ProcessedRecord {
                record,
                denoised: round2(denoised),
                relative: round2(q.relative(denoised)),
                z_factor: round2(q.z_factor),
                robust_z_factor: round2(q.robust_z_factor),
            })
        })
        .collect::<Vec<_>>();

    info!(
        "Normalized {} records on {} plates (grouped by {})",
        processed.len(),
        quality.len(),
        config.plate_grouping
    );
    ProcessedTable {
        records: processed,
        quality,
    }
}
