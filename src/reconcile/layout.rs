//! Layout rows: substances and controls per mother plate, joined to dilutions.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};

use crate::metadata::{ControlRole, Dilution, ExperimentInputs};
use crate::position::{Quadrant, WellPosition};

/// One well of one mother plate at one concentration level
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LayoutRow {
    pub internal_id: String,
    pub dataset: Option<String>,
    pub role: Option<ControlRole>,
    pub mp_barcode: String,
    pub position_96: Option<WellPosition>,
    pub quadrant: Option<Quadrant>,
    pub position_384: WellPosition,
    pub rack: Option<u32>,
    pub concentration: Option<f64>,
    pub unit: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

/// Substances plus controls replicated once per mother plate
pub(crate) fn plate_layout(inputs: &ExperimentInputs) -> Vec<LayoutRow> {
    let mut plate_dataset: HashMap<&str, &str> = HashMap::new();
    for s in &inputs.substances {
        plate_dataset.entry(s.mp_barcode.as_str()).or_insert(s.dataset.as_str());
    }

    let mut rows: Vec<LayoutRow> = inputs
        .substances
        .iter()
        .map(|s| LayoutRow {
            internal_id: s.internal_id.clone(),
            dataset: Some(s.dataset.clone()),
            role: None,
            mp_barcode: s.mp_barcode.clone(),
            position_96: s.position_96,
            quadrant: s.quadrant,
            position_384: s.position_384,
            rack: None,
            concentration: None,
            unit: None,
            attributes: s.attributes.clone(),
        })
        .collect();

    for mp in inputs.mother_plates() {
        for control in &inputs.controls {
            let dataset = control
                .dataset
                .clone()
                .or_else(|| plate_dataset.get(mp.as_str()).map(|d| d.to_string()));
            rows.push(LayoutRow {
                internal_id: control.label.clone(),
                dataset,
                role: Some(control.role),
                mp_barcode: mp.clone(),
                position_96: None,
                quadrant: None,
                position_384: control.position,
                rack: None,
                concentration: None,
                unit: None,
                attributes: control.attributes.clone(),
            });
        }
    }

    debug!(
        "Plate layout: {} substance rows, {} control rows",
        inputs.substances.len(),
        rows.len() - inputs.substances.len()
    );
    rows
}

fn applies(dilution: &Dilution, dataset: Option<&str>) -> bool {
    match dilution.dataset.as_deref() {
        None => true,
        Some(d) => Some(d) == dataset,
    }
}

/// Outer join of layout rows with the concentration levels of their dataset
pub(crate) fn join_dilutions(rows: Vec<LayoutRow>, dilutions: &[Dilution]) -> Vec<LayoutRow> {
    let mut joined = Vec::with_capacity(rows.len() * dilutions.len().max(1));
    let mut unmatched = 0usize;
    for row in rows {
        let mut levels = dilutions
            .iter()
            .filter(|d| applies(d, row.dataset.as_deref()))
            .peekable();
        if levels.peek().is_none() {
            unmatched += 1;
            joined.push(row);
            continue;
        }
        for level in levels {
            joined.push(LayoutRow {
                rack: Some(level.rack),
                concentration: Some(level.concentration),
                unit: Some(level.unit.clone()),
                ..row.clone()
            });
        }
    }
    if unmatched > 0 {
        warn!(
            "{} layout rows have no concentration level for their dataset",
            unmatched
        );
    }
    joined
}
