use std::collections::HashMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::process::ProcessedRecord;

use super::hits::is_tested_substance;

/// Minimum inhibitory concentration of one substance, organism and replicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicRecord {
    /// Substance identifier
    pub internal_id: String,
    /// Dataset tag
    pub dataset: Option<String>,
    /// Organism name
    pub organism: Option<String>,
    /// Abbreviated organism name
    pub organism_formatted: Option<String>,
    /// Mother-plate replicate
    pub replicate: u32,
    /// Lowest inhibiting concentration; `None` if the highest concentration
    /// does not inhibit
    pub mic: Option<f64>,
    /// Concentration unit
    pub unit: Option<String>,
    /// Concentrations tested
    pub concentrations: usize,
}

/// Lowest concentration below which every higher concentration inhibits.
///
/// `points` are `(concentration, relative)` pairs in any order.
///
/// ```
/// use platescreen::threshold::minimum_inhibitory_concentration;
///
/// let series = [(50.0, 2.0), (25.0, 10.0), (12.5, 80.0), (6.25, 30.0)];
/// assert_eq!(minimum_inhibitory_concentration(&series, 50.0), Some(25.0));
/// assert_eq!(minimum_inhibitory_concentration(&[(50.0, 60.0)], 50.0), None);
/// ```
pub fn minimum_inhibitory_concentration(points: &[(f64, f64)], threshold: f64) -> Option<f64> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| b.0.total_cmp(&a.0));
    let mut mic = None;
    for (concentration, relative) in sorted {
        if relative < threshold {
            mic = Some(concentration);
        } else {
            break;
        }
    }
    mic
}

type MicKey<'a> = (&'a str, Option<&'a str>, Option<&'a str>, u32);

/// MIC per (substance, dataset, organism, replicate) using
/// [`PipelineConfig::mic_threshold`]; rows without a concentration are
/// skipped
pub fn determine_mic(processed: &[ProcessedRecord], config: &PipelineConfig) -> Vec<MicRecord> {
    let mut order: Vec<MicKey<'_>> = Vec::new();
    let mut series: HashMap<MicKey<'_>, Vec<&ProcessedRecord>> = HashMap::new();
    for record in processed.iter().filter(|r| is_tested_substance(r, config)) {
        let r = &record.record;
        if r.concentration.is_none() {
            continue;
        }
        let key = (
            r.internal_id.as_str(),
            r.dataset.as_deref(),
            r.organism.as_deref(),
            r.replicate,
        );
        series
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(record);
    }

    let results: Vec<MicRecord> = order
        .iter()
        .map(|key| {
            let rows = &series[key];
            let points: Vec<(f64, f64)> = rows
                .iter()
                .filter_map(|p| p.record.concentration.map(|c| (c, p.relative)))
                .collect();
            let first = &rows[0].record;
            let mic = minimum_inhibitory_concentration(&points, config.mic_threshold);
            debug!(
                "MIC of {} against {:?} (replicate {}): {:?}",
                first.internal_id, first.organism, first.replicate, mic
            );
            MicRecord {
                internal_id: first.internal_id.clone(),
                dataset: first.dataset.clone(),
                organism: first.organism.clone(),
                organism_formatted: first.organism_formatted.clone(),
                replicate: first.replicate,
                mic,
                unit: first.unit.clone(),
                concentrations: points.len(),
            }
        })
        .collect();

    info!(
        "Determined {} MIC values ({} without inhibition at the highest concentration)",
        results.len(),
        results.iter().filter(|r| r.mic.is_none()).count()
    );
    results
}
