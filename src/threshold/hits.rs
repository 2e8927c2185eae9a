use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::process::{mean, round2, sample_std, ProcessedRecord};

/// Aggregated activity of one substance against one organism
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitRecord {
    /// Substance identifier
    pub internal_id: String,
    /// Dataset of the substance
    pub dataset: Option<String>,
    /// Organism name
    pub organism: Option<String>,
    /// Abbreviated organism name of the first contributing row
    pub organism_formatted: Option<String>,
    /// Mean relative measurement over the active rows
    pub relative_mean: f64,
    /// Sample standard deviation of the relative measurement (`NaN` for one row)
    pub relative_std: f64,
    /// Number of active rows aggregated
    pub replicates: usize,
}

/// (dataset, substance, organism)
type HitKey<'a> = (Option<&'a str>, &'a str, Option<&'a str>);

/// Whether a processed row is a tested substance (not a blank or negative
/// control, not on a blank-only plate group)
pub(crate) fn is_tested_substance(record: &ProcessedRecord, config: &PipelineConfig) -> bool {
    let r = &record.record;
    r.internal_id != config.blank_label
        && r.internal_id != config.negative_control_label
        && r.dataset.as_deref() != Some(config.blank_dataset.as_str())
}

/// Substances whose relative measurement is strictly below `threshold`,
/// aggregated per (dataset, substance, organism) in first-seen order.
///
/// Identifiers are only unique within a dataset, so equal IDs of different
/// datasets stay separate hits.
pub fn hit_table(
    processed: &[ProcessedRecord],
    config: &PipelineConfig,
    threshold: f64,
) -> Vec<HitRecord> {
    let mut order: Vec<HitKey<'_>> = Vec::new();
    let mut groups: HashMap<HitKey<'_>, Vec<&ProcessedRecord>> = HashMap::new();
    for record in processed
        .iter()
        .filter(|r| is_tested_substance(r, config))
        .filter(|r| r.relative < threshold)
    {
        let r = &record.record;
        let key = (r.dataset.as_deref(), r.internal_id.as_str(), r.organism.as_deref());
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(record);
    }

    let hits: Vec<HitRecord> = order
        .iter()
        .map(|key| {
            let rows = &groups[key];
            let values: Vec<f64> = rows.iter().map(|r| r.relative).collect();
            let first = &rows[0].record;
            HitRecord {
                internal_id: first.internal_id.clone(),
                dataset: first.dataset.clone(),
                organism: first.organism.clone(),
                organism_formatted: first.organism_formatted.clone(),
                relative_mean: round2(mean(&values)),
                relative_std: round2(sample_std(&values)),
                replicates: values.len(),
            }
        })
        .collect();

    info!(
        "{} substance/organism pairs below {}% relative activity",
        hits.len(),
        threshold
    );
    hits
}
