use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::PlateFormat;
use crate::position::{parse_position, WellPosition};
use crate::workbook::Sheet;

use super::MetadataError;

/// Identity headers tried, in order, after the configured substance-id column
const FALLBACK_ID_HEADERS: [&str; 3] = ["Internal ID", "ID", "Control"];

/// Role of a control well
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlRole {
    /// Medium only, defines the background
    Blank,
    /// Organism without substance, defines uninhibited growth
    NegativeControl,
    /// Any other reference well (e.g. a known antibiotic)
    PositiveControl,
}

impl ControlRole {
    /// Classify a control label against the configured labels
    pub fn classify(label: &str, blank_label: &str, negative_control_label: &str) -> Self {
        if label == blank_label {
            ControlRole::Blank
        } else if label == negative_control_label {
            ControlRole::NegativeControl
        } else {
            ControlRole::PositiveControl
        }
    }
}

impl fmt::Display for ControlRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ControlRole::Blank => "blank",
            ControlRole::NegativeControl => "negative control",
            ControlRole::PositiveControl => "positive control",
        })
    }
}

/// A control well, defined once for every assay plate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    /// Identity label (`"Blank"`, `"Negative Control"`, ...)
    pub label: String,
    /// Role derived from the label
    pub role: ControlRole,
    /// Well on the 384-well assay plates
    pub position: WellPosition,
    /// Dataset the control belongs to, if the sheet says so
    pub dataset: Option<String>,
    /// Remaining sheet columns
    pub attributes: BTreeMap<String, String>,
}

/// Index of the first column whose header starts with `Position`
pub(crate) fn position_column(sheet: &Sheet) -> Option<usize> {
    sheet.find_column(|h| h.starts_with("Position"))
}

/// Index of the control identity column
pub(crate) fn identity_column(sheet: &Sheet, substance_id: &str) -> Option<usize> {
    sheet
        .column(substance_id)
        .or_else(|| FALLBACK_ID_HEADERS.iter().find_map(|h| sheet.column(h)))
}

/// Type the controls sheet
pub fn read_controls(
    sheet: &Sheet,
    substance_id: &str,
    blank_label: &str,
    negative_control_label: &str,
) -> Result<Vec<Control>, MetadataError> {
    let invalid = |row: usize, column: &str, message: String| MetadataError::InvalidValue {
        sheet: sheet.name.clone(),
        row: row + 1,
        column: column.to_string(),
        message,
    };

    let pos_idx = position_column(sheet)
        .ok_or_else(|| invalid(0, "Position", "column is missing".to_string()))?;
    let id_idx = identity_column(sheet, substance_id)
        .ok_or_else(|| invalid(0, substance_id, "identity column is missing".to_string()))?;
    let dataset_idx = sheet.column(super::substances::DATASET_COLUMN);
    let pos_header = sheet.headers[pos_idx].as_str();

    let mut controls = Vec::new();
    for row in 0..sheet.len() {
        let Some(text) = sheet.cell(row, pos_idx) else {
            continue;
        };
        let (r, c) = parse_position(text).map_err(|e| invalid(row, pos_header, e.to_string()))?;
        let position = WellPosition::new(r, c);
        position
            .check_format(PlateFormat::Wells384)
            .map_err(|e| invalid(row, pos_header, e.to_string()))?;

        let label = sheet
            .cell(row, id_idx)
            .ok_or_else(|| invalid(row, &sheet.headers[id_idx], "empty control label".to_string()))?
            .to_string();

        let attributes = sheet
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != pos_idx && *i != id_idx && Some(*i) != dataset_idx)
            .filter_map(|(i, h)| sheet.cell(row, i).map(|v| (h.clone(), v.to_string())))
            .collect();

        controls.push(Control {
            role: ControlRole::classify(&label, blank_label, negative_control_label),
            label,
            position,
            dataset: dataset_idx.and_then(|i| sheet.cell(row, i)).map(str::to_string),
            attributes,
        });
    }
    Ok(controls)
}
