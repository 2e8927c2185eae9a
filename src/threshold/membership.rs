use log::warn;
use serde::{Deserialize, Serialize};

use super::HitRecord;

/// Strip everything but letters and digits from a column name.
///
/// Set-visualization tools treat separators and punctuation as syntax.
///
/// ```
/// use platescreen::threshold::sanitize_column_name;
///
/// assert_eq!(sanitize_column_name("E. coli ATCC 25922"), "EcoliATCC25922");
/// assert_eq!(sanitize_column_name("P. aeruginosa (PAO1)"), "PaeruginosaPAO1");
/// ```
pub fn sanitize_column_name(name: &str) -> String {
    name.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// One substance with its membership per organism column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipRow {
    /// Dataset of the substance
    pub dataset: Option<String>,
    /// Substance identifier
    pub internal_id: String,
    /// One flag per [`MembershipTable::columns`] entry
    pub members: Vec<bool>,
}

/// Binary substance × organism table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MembershipTable {
    /// Sanitized organism column names, unique, in first-seen order
    pub columns: Vec<String>,
    /// One row per (dataset, substance), in first-seen order
    pub rows: Vec<MembershipRow>,
}

impl MembershipTable {
    /// Whether the substance `internal_id` of `dataset` is a member of `column`
    pub fn is_member(&self, dataset: Option<&str>, internal_id: &str, column: &str) -> Option<bool> {
        let idx = self.columns.iter().position(|c| c == column)?;
        let row = self
            .rows
            .iter()
            .find(|r| r.dataset.as_deref() == dataset && r.internal_id == internal_id)?;
        row.members.get(idx).copied()
    }

    /// Number of members per column
    pub fn column_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), self.rows.iter().filter(|r| r.members[i]).count()))
            .collect()
    }
}

/// Organism identity of a hit: full name, else the formatted label
fn organism_key(hit: &HitRecord) -> &str {
    hit.organism
        .as_deref()
        .or(hit.organism_formatted.as_deref())
        .unwrap_or("Unknown")
}

/// Reshape hits into one row per substance and one flag per organism.
///
/// Columns are the sanitized formatted organism names. Distinct organisms
/// whose names sanitize to the same label get a numeric suffix
/// (`EcoliK12`, `EcoliK122`) so their flags never merge.
pub fn set_membership(hits: &[HitRecord]) -> MembershipTable {
    // organism key -> column index
    let mut organisms: Vec<(&str, usize)> = Vec::new();
    let mut columns: Vec<String> = Vec::new();
    for hit in hits {
        let key = organism_key(hit);
        if organisms.iter().any(|(k, _)| *k == key) {
            continue;
        }
        let base = sanitize_column_name(hit.organism_formatted.as_deref().unwrap_or(key));
        let mut column = base.clone();
        let mut n = 2;
        while columns.contains(&column) {
            column = format!("{}{}", base, n);
            n += 1;
        }
        if column != base {
            warn!(
                "Organism '{}' sanitizes to the existing column '{}'; using '{}'",
                key, base, column
            );
        }
        organisms.push((key, columns.len()));
        columns.push(column);
    }

    let mut rows: Vec<MembershipRow> = Vec::new();
    for hit in hits {
        let idx = match rows
            .iter()
            .position(|r| r.dataset == hit.dataset && r.internal_id == hit.internal_id)
        {
            Some(idx) => idx,
            None => {
                rows.push(MembershipRow {
                    dataset: hit.dataset.clone(),
                    internal_id: hit.internal_id.clone(),
                    members: vec![false; columns.len()],
                });
                rows.len() - 1
            }
        };
        let key = organism_key(hit);
        if let Some(&(_, c)) = organisms.iter().find(|(k, _)| *k == key) {
            rows[idx].members[c] = true;
        }
    }

    MembershipTable { columns, rows }
}
