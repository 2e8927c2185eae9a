//! # Metadata Reconciler
//!
//! Joins the typed workbook, the plate lineage and the raw measurements into
//! one long table with a [`MergedRecord`] per measured well, organism and
//! replicate.
//!
//! ## Join chain
//!
//! 1. Controls are repeated for every mother plate; substances and controls
//!    are joined (outer) with the concentration levels of their dataset.
//! 2. Mother → transfer lineage is expanded through transfer → detection
//!    lineage; each detection plate is joined (outer) with the organism of
//!    its rack.
//! 3. Detection plates are joined (inner) with the raw measurements on
//!    barcode and 384-well position, then with the layout rows on mother
//!    plate, transfer rack and position.
//!
//! Every mother plate gets a [`PlateRowCount`] so join losses or
//! explosions show up in the logs and in the run summary.

mod error;
mod layout;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::PlateGrouping;
use crate::metadata::{
    validate_lineage, ControlRole, ExperimentInputs, LineageRow, Organism, PlateMapping,
};
use crate::position::{Quadrant, WellPosition};
use crate::reader::RawMeasurement;

pub use error::ReconcileError;

use layout::{join_dilutions, plate_layout, LayoutRow};

/// One measured well with all of its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    /// Substance identifier or control label
    pub internal_id: String,
    /// Dataset tag
    pub dataset: Option<String>,
    /// Control role; `None` for tested substances
    pub role: Option<ControlRole>,
    /// Mother-plate barcode (96-well)
    pub mp_barcode: String,
    /// Assay-transfer plate barcode (384-well)
    pub ast_barcode: String,
    /// Assay-detection plate barcode (384-well, the measured plate)
    pub acd_barcode: String,
    /// 1-based replicate of the mother plate
    pub replicate: u32,
    /// Transfer rack index (concentration level)
    pub rack: u32,
    /// Organism name
    pub organism: Option<String>,
    /// Abbreviated organism name
    pub organism_formatted: Option<String>,
    /// Well on the mother plate
    pub position_96: Option<WellPosition>,
    /// Quadrant of the mother plate
    pub quadrant: Option<Quadrant>,
    /// Well on the 384-well plates
    pub position_384: WellPosition,
    /// Concentration of the level
    pub concentration: Option<f64>,
    /// Concentration unit
    pub unit: Option<String>,
    /// Raw reading
    pub raw: f64,
    /// Additional substance / control columns
    pub attributes: BTreeMap<String, String>,
}

impl MergedRecord {
    /// Barcode used as plate key for the given grouping
    pub fn plate_barcode(&self, grouping: PlateGrouping) -> &str {
        match grouping {
            PlateGrouping::MotherPlate => &self.mp_barcode,
            PlateGrouping::AssayTransfer => &self.ast_barcode,
            PlateGrouping::AssayDetection => &self.acd_barcode,
        }
    }
}

/// Row-count diagnostic of one mother plate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateRowCount {
    /// Mother-plate barcode
    pub mp_barcode: String,
    /// Merged rows originating from the plate
    pub rows: usize,
    /// Distinct detection plates among those rows
    pub detection_plates: usize,
    /// `rows / detection_plates` (NaN without detection plates)
    pub rows_per_plate: f64,
}

/// Output of [`reconcile`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciledTable {
    /// Merged records
    pub records: Vec<MergedRecord>,
    /// Per-mother-plate diagnostics
    pub diagnostics: Vec<PlateRowCount>,
}

/// A detection plate with its full lineage
#[derive(Debug, Clone)]
struct DetectionPlate<'a> {
    mp: &'a str,
    ast: &'a str,
    acd: &'a str,
    replicate: u32,
    rack: u32,
    organism: Option<&'a Organism>,
}

fn detection_plates<'a>(
    mp_ast: &'a [LineageRow],
    ast_acd: &'a [LineageRow],
    organisms: &'a [Organism],
) -> Vec<DetectionPlate<'a>> {
    let mut by_ast: HashMap<&str, Vec<&LineageRow>> = HashMap::new();
    for row in ast_acd {
        by_ast.entry(row.parent.as_str()).or_default().push(row);
    }

    let mut plates = Vec::new();
    for transfer in mp_ast {
        for detection in by_ast.get(transfer.child.as_str()).into_iter().flatten() {
            let organism = organisms.iter().find(|o| o.rack == detection.rack);
            if organism.is_none() {
                warn!(
                    "Detection plate {} (rack {}) has no organism",
                    detection.child, detection.rack
                );
            }
            plates.push(DetectionPlate {
                mp: &transfer.parent,
                ast: &transfer.child,
                acd: &detection.child,
                replicate: transfer.replicate,
                rack: transfer.rack,
                organism,
            });
        }
    }
    plates
}

fn merge(plate: &DetectionPlate<'_>, row: &LayoutRow, raw: f64) -> MergedRecord {
    MergedRecord {
        internal_id: row.internal_id.clone(),
        dataset: row.dataset.clone(),
        role: row.role,
        mp_barcode: plate.mp.to_string(),
        ast_barcode: plate.ast.to_string(),
        acd_barcode: plate.acd.to_string(),
        replicate: plate.replicate,
        rack: plate.rack,
        organism: plate.organism.map(|o| o.name.clone()),
        organism_formatted: plate.organism.map(|o| o.formatted.clone()),
        position_96: row.position_96,
        quadrant: row.quadrant,
        position_384: row.position_384,
        concentration: row.concentration,
        unit: row.unit.clone(),
        raw,
        attributes: row.attributes.clone(),
    }
}

/// Row counts per mother plate, in mapping order
pub fn plate_row_counts(records: &[MergedRecord], mp_ast: &PlateMapping) -> Vec<PlateRowCount> {
    mp_ast
        .parents()
        .map(|mp| {
            let rows: Vec<&MergedRecord> = records.iter().filter(|r| r.mp_barcode == mp).collect();
            let detection: BTreeSet<&str> = rows.iter().map(|r| r.acd_barcode.as_str()).collect();
            PlateRowCount {
                mp_barcode: mp.to_string(),
                rows: rows.len(),
                detection_plates: detection.len(),
                rows_per_plate: rows.len() as f64 / detection.len() as f64,
            }
        })
        .collect()
}

fn log_row_counts(counts: &[PlateRowCount]) {
    for count in counts {
        if count.rows == 0 {
            warn!("Mother plate {} has no merged rows", count.mp_barcode);
        } else {
            info!(
                "Mother plate {}: {} rows on {} detection plates ({} per plate)",
                count.mp_barcode, count.rows, count.detection_plates, count.rows_per_plate
            );
        }
    }
    let per_plate: BTreeSet<u64> = counts
        .iter()
        .filter(|c| c.rows > 0)
        .map(|c| c.rows_per_plate.to_bits())
        .collect();
    if per_plate.len() > 1 {
        warn!("Mother plates differ in rows per detection plate; check the mapping files and layout");
    }
}

/// Join workbook, lineage and measurements.
///
/// Lineage consistency is checked first; every substance mother plate must
/// be an origin of `mp_ast`.
pub fn reconcile(
    inputs: &ExperimentInputs,
    mp_ast: &PlateMapping,
    ast_acd: &PlateMapping,
    measurements: &[RawMeasurement],
) -> Result<ReconciledTable, ReconcileError> {
    validate_lineage(mp_ast, ast_acd)?;
    let unmapped: Vec<String> = inputs
        .mother_plates()
        .into_iter()
        .filter(|mp| !mp_ast.contains(mp))
        .collect();
    if !unmapped.is_empty() {
        return Err(ReconcileError::UnmappedMotherPlates {
            mapping: mp_ast.name.clone(),
            barcodes: unmapped,
        });
    }

    let layout = join_dilutions(plate_layout(inputs), &inputs.dilutions);
    let mut by_plate_rack: HashMap<(&str, u32), Vec<&LayoutRow>> = HashMap::new();
    for row in &layout {
        if let Some(rack) = row.rack {
            by_plate_rack
                .entry((row.mp_barcode.as_str(), rack))
                .or_default()
                .push(row);
        }
    }

    let readings: HashMap<(&str, WellPosition), f64> = measurements
        .iter()
        .map(|m| ((m.barcode.as_str(), m.position), m.value))
        .collect();

    let mp_rows = mp_ast.rows();
    let acd_rows = ast_acd.rows();
    let plates = detection_plates(&mp_rows, &acd_rows, &inputs.organisms);

    let known: BTreeSet<&str> = plates.iter().map(|p| p.acd).collect();
    let unknown: BTreeSet<&str> = measurements
        .iter()
        .map(|m| m.barcode.as_str())
        .filter(|b| !known.contains(b))
        .collect();
    if !unknown.is_empty() {
        warn!(
            "Measurements of plates without lineage are ignored: {}",
            unknown.into_iter().collect::<Vec<_>>().join(", ")
        );
    }

    let mut records = Vec::new();
    for plate in &plates {
        let Some(rows) = by_plate_rack.get(&(plate.mp, plate.rack)) else {
            continue;
        };
        for row in rows {
            if let Some(&raw) = readings.get(&(plate.acd, row.position_384)) {
                records.push(merge(plate, row, raw));
            }
        }
    }

    if records.is_empty() {
        return Err(ReconcileError::NoMatches {
            measurements: measurements.len(),
            layout_rows: layout.len(),
        });
    }

    let diagnostics = plate_row_counts(&records, mp_ast);
    log_row_counts(&diagnostics);
    info!(
        "Merged {} records from {} detection plates",
        records.len(),
        plates.len()
    );
    Ok(ReconciledTable {
        records,
        diagnostics,
    })
}
