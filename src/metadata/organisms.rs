use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::workbook::Sheet;

use super::MetadataError;

/// Column holding the organism name
pub const ORGANISM_COLUMN: &str = "Organism";
/// Optional column assigning the assay-detection rack index
pub const RACK_COLUMN: &str = "Rack";

/// A test organism
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    /// Name as written in the sheet
    pub name: String,
    /// Abbreviated display label
    pub formatted: String,
    /// Rack index of the organism's detection plate within an assay-transfer plate
    pub rack: u32,
    /// Remaining sheet columns
    pub attributes: BTreeMap<String, String>,
}

/// Abbreviate a binomial organism name to its genus initial.
///
/// ```
/// use platescreen::metadata::format_organism_name;
///
/// assert_eq!(format_organism_name("Escherichia coli ATCC 25922"), "E. coli ATCC 25922");
/// assert_eq!(format_organism_name("S. aureus"), "S. aureus");
/// assert_eq!(format_organism_name("Blank"), "Blank");
/// ```
pub fn format_organism_name(name: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    match tokens.as_slice() {
        [genus, species, rest @ ..] if is_genus(genus) && is_epithet(species) => {
            let initial = genus.chars().next().unwrap_or_default();
            let mut out = format!("{}. {}", initial, species);
            for token in rest {
                out.push(' ');
                out.push_str(token);
            }
            out
        }
        _ => tokens.join(" "),
    }
}

fn is_genus(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_uppercase())
        && token.chars().count() > 1
        && chars.all(|c| c.is_lowercase())
}

fn is_epithet(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_lowercase())
}

/// Type the organisms sheet.
///
/// Without a `Rack` column the sheet order defines the rack index (1-based).
pub fn read_organisms(sheet: &Sheet) -> Result<Vec<Organism>, MetadataError> {
    let invalid = |row: usize, column: &str, message: String| MetadataError::InvalidValue {
        sheet: sheet.name.clone(),
        row: row + 1,
        column: column.to_string(),
        message,
    };

    let name_idx = sheet
        .column(ORGANISM_COLUMN)
        .ok_or_else(|| invalid(0, ORGANISM_COLUMN, "column is missing".to_string()))?;
    let rack_idx = sheet.column(RACK_COLUMN);

    let mut organisms = Vec::new();
    for row in 0..sheet.len() {
        let Some(name) = sheet.cell(row, name_idx) else {
            continue;
        };
        let rack = match rack_idx.and_then(|i| sheet.cell(row, i)) {
            Some(value) => value
                .parse::<u32>()
                .map_err(|_| invalid(row, RACK_COLUMN, format!("{:?} is not a rack number", value)))?,
            None => organisms.len() as u32 + 1,
        };
        let attributes = sheet
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != name_idx && Some(*i) != rack_idx)
            .filter_map(|(i, h)| sheet.cell(row, i).map(|v| (h.clone(), v.to_string())))
            .collect();

        organisms.push(Organism {
            name: name.to_string(),
            formatted: format_organism_name(name),
            rack,
            attributes,
        });
    }
    Ok(organisms)
}
