use serde::{Deserialize, Serialize};

use crate::geometry::PlateFormat;
use crate::position::WellPosition;

/// Barcode used when no readouts are given
pub const DEFAULT_TEMPLATE_BARCODE: &str = "001PrS01001";

/// One row of a generated input table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRow {
    /// Plate barcode
    pub barcode: String,
    /// Replicate number
    pub replicate: u32,
    /// Placeholder organism
    pub organism: String,
    /// Placeholder substance identifier
    pub substance: String,
    /// Well of the substance
    pub position: WellPosition,
    /// Concentration (mg/mL)
    pub concentration: f64,
}

/// `A`, `B`, …, `Z`, `AA`, `AB`, … for a zero-based index
fn letter_label(mut index: usize) -> String {
    let mut label = Vec::new();
    loop {
        label.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}

/// Minimal input table: every barcode crossed with one placeholder
/// substance per well.
///
/// Substances fill the plate column by column (`A1`, `B1`, …) at
/// concentration 1. Each barcode is replicate 1 with its own placeholder
/// organism. Without barcodes, [`DEFAULT_TEMPLATE_BARCODE`] is used.
pub fn generate_input_table(barcodes: &[String], format: PlateFormat) -> Vec<TemplateRow> {
    let default = [DEFAULT_TEMPLATE_BARCODE.to_string()];
    let barcodes = if barcodes.is_empty() { &default[..] } else { barcodes };

    let wells: Vec<WellPosition> = (1..=format.columns())
        .flat_map(|column| format.row_letters().map(move |row| WellPosition::new(row, column)))
        .collect();

    barcodes
        .iter()
        .enumerate()
        .flat_map(|(i, barcode)| {
            let organism = format!("Placeholder Organism {}", letter_label(i));
            wells.iter().enumerate().map(move |(n, position)| TemplateRow {
                barcode: barcode.clone(),
                replicate: 1,
                organism: organism.clone(),
                substance: format!("Substance {}", n + 1),
                position: *position,
                concentration: 1.0,
            })
        })
        .collect()
}
