use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::workbook::Sheet;

use super::MetadataError;

/// Headers accepted as an explicit unit column
const UNIT_HEADERS: [&str; 3] = ["unit", "units", "concentration unit"];

/// One concentration level of a dilution series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dilution {
    /// Transfer rack index this level is plated on
    pub rack: u32,
    /// Concentration value
    pub concentration: f64,
    /// Concentration unit (`mg/mL`, `µM`, ...)
    pub unit: String,
    /// Dataset the level applies to; `None` applies to every dataset
    pub dataset: Option<String>,
}

fn unit_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<name>.+?)\s*\((?P<unit>.+?)\)\s*$").expect("valid regex"))
}

fn in_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(?P<name>.+?)\s+in\s+(?P<unit>.+?)\s*$").expect("valid regex"))
}

fn concentration_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)conc|dilut|dose").expect("valid regex"))
}

/// Split a header carrying its unit.
///
/// `"Concentration in mg/mL"` and `"Concentration (mg/mL)"` both give
/// `("Concentration", "mg/mL")`. Headers without a unit give `None`.
pub fn split_unit_header(header: &str) -> Option<(String, String)> {
    let header = header.trim();
    let caps = in_header_re()
        .captures(header)
        .or_else(|| unit_header_re().captures(header))?;
    Some((caps["name"].trim().to_string(), caps["unit"].trim().to_string()))
}

fn is_unit_header(header: &str) -> bool {
    UNIT_HEADERS.contains(&header.trim().to_lowercase().as_str())
}

/// Index of the explicit unit column, if any
pub(crate) fn unit_column(sheet: &Sheet) -> Option<usize> {
    sheet.find_column(is_unit_header)
}

/// Concentration-bearing column of a dilutions sheet.
///
/// Prefers headers naming a concentration, dilution or dose; falls back to
/// the first numeric column that is not a rack index.
pub(crate) fn concentration_column(sheet: &Sheet) -> Option<usize> {
    sheet
        .find_column(|h| concentration_name_re().is_match(h) && !is_unit_header(h))
        .or_else(|| {
            (0..sheet.headers.len()).find(|&i| {
                let h = sheet.headers[i].as_str();
                !h.eq_ignore_ascii_case("rack") && !is_unit_header(h) && sheet.is_numeric_column(i)
            })
        })
}

/// Whether a unit can be resolved for the concentration column
pub(crate) fn has_unit(sheet: &Sheet, conc_idx: usize) -> bool {
    split_unit_header(&sheet.headers[conc_idx]).is_some()
        || unit_column(sheet).is_some_and(|u| sheet.values(u).any(|v| !v.is_empty()))
}

/// Type the dilutions sheet.
///
/// Without a `Rack` column, levels are assigned racks 1, 2, ... in sheet
/// order, counted separately per dataset.
pub fn read_dilutions(sheet: &Sheet) -> Result<Vec<Dilution>, MetadataError> {
    let invalid = |row: usize, column: &str, message: String| MetadataError::InvalidValue {
        sheet: sheet.name.clone(),
        row: row + 1,
        column: column.to_string(),
        message,
    };

    let conc_idx = concentration_column(sheet).ok_or_else(|| {
        invalid(0, "Concentration", "no concentration column found".to_string())
    })?;
    let conc_header = sheet.headers[conc_idx].clone();
    let header_unit = split_unit_header(&conc_header).map(|(_, unit)| unit);
    let unit_idx = unit_column(sheet);
    let fallback_unit = unit_idx.and_then(|u| sheet.values(u).find(|v| !v.is_empty()));
    let rack_idx = sheet.find_column(|h| h.eq_ignore_ascii_case("rack"));
    let dataset_idx = sheet.column(super::substances::DATASET_COLUMN);

    let mut next_rack: HashMap<Option<String>, u32> = HashMap::new();
    let mut dilutions = Vec::new();
    for row in 0..sheet.len() {
        let Some(value) = sheet.cell(row, conc_idx) else {
            continue;
        };
        let concentration = value
            .parse::<f64>()
            .map_err(|_| invalid(row, &conc_header, format!("{:?} is not a number", value)))?;

        let unit = header_unit
            .clone()
            .or_else(|| unit_idx.and_then(|u| sheet.cell(row, u)).map(str::to_string))
            .or_else(|| fallback_unit.map(str::to_string))
            .ok_or_else(|| invalid(row, &conc_header, "no concentration unit".to_string()))?;

        let dataset = dataset_idx.and_then(|i| sheet.cell(row, i)).map(str::to_string);
        let counter = next_rack.entry(dataset.clone()).or_insert(0);
        *counter += 1;
        let rack = match rack_idx.and_then(|i| sheet.cell(row, i)) {
            Some(r) => r
                .parse::<u32>()
                .map_err(|_| invalid(row, "Rack", format!("{:?} is not a rack number", r)))?,
            None => *counter,
        };

        dilutions.push(Dilution {
            rack,
            concentration,
            unit,
            dataset,
        });
    }
    Ok(dilutions)
}
