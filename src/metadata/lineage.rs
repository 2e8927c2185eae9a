//! Plate-lineage mapping files.
//!
//! Barcode readers write one line per parent plate followed by one line of
//! semicolon-separated child barcodes:
//!
//! ```text
//! 001MP01001
//! 001AsT01001;001AsT01002;001AsT01003
//! 001MP01001
//! 001AsT01004;001AsT01005;001AsT01006
//! ```
//!
//! A parent that recurs starts another replicate. The position of a child in
//! its line is its rack index.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::MetadataError;

/// One parent → child edge of a lineage mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageRow {
    /// Parent plate barcode
    pub parent: String,
    /// Child plate barcode
    pub child: String,
    /// 1-based replicate (occurrence of the parent line)
    pub replicate: u32,
    /// 1-based rack index (position within the child line)
    pub rack: u32,
}

/// Parent barcode → replicate child lists, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlateMapping {
    /// Name of the mapping (file name) for messages
    pub name: String,
    entries: Vec<(String, Vec<Vec<String>>)>,
    origin_counts: BTreeMap<String, usize>,
}

impl PlateMapping {
    /// Create an empty mapping
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            origin_counts: BTreeMap::new(),
        }
    }

    /// Build a mapping from `(parent, [children])` pairs; each pair is one replicate
    pub fn from_pairs<P, C>(name: &str, pairs: impl IntoIterator<Item = (P, Vec<C>)>) -> Self
    where
        P: Into<String>,
        C: Into<String>,
    {
        let mut mapping = Self::new(name);
        for (parent, children) in pairs {
            mapping.push_replicate(parent.into(), children.into_iter().map(Into::into).collect());
        }
        mapping
    }

    fn entry_mut(&mut self, parent: &str) -> &mut Vec<Vec<String>> {
        let idx = match self.entries.iter().position(|(p, _)| p == parent) {
            Some(idx) => idx,
            None => {
                self.entries.push((parent.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    fn note_origin(&mut self, parent: &str) {
        self.entry_mut(parent);
        *self.origin_counts.entry(parent.to_string()).or_insert(0) += 1;
    }

    fn push_replicate(&mut self, parent: String, children: Vec<String>) {
        self.note_origin(&parent);
        self.entry_mut(&parent).push(children);
    }

    /// Replicate child lists of a parent
    pub fn get(&self, parent: &str) -> Option<&[Vec<String>]> {
        self.entries
            .iter()
            .find(|(p, _)| p == parent)
            .map(|(_, reps)| reps.as_slice())
    }

    /// Whether the parent barcode is a key of this mapping
    pub fn contains(&self, parent: &str) -> bool {
        self.get(parent).is_some()
    }

    /// Parent barcodes in file order
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    /// Every child barcode, in file order
    pub fn children(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|(_, reps)| reps.iter().flatten().map(String::as_str))
    }

    /// How often each parent barcode line occurs
    pub fn replicate_counts(&self) -> &BTreeMap<String, usize> {
        &self.origin_counts
    }

    /// Flatten to edges with replicate and rack indices
    pub fn rows(&self) -> Vec<LineageRow> {
        let mut rows = Vec::new();
        for (parent, replicates) in &self.entries {
            for (rep, children) in replicates.iter().enumerate() {
                for (rack, child) in children.iter().enumerate() {
                    rows.push(LineageRow {
                        parent: parent.clone(),
                        child: child.clone(),
                        replicate: rep as u32 + 1,
                        rack: rack as u32 + 1,
                    });
                }
            }
        }
        rows
    }
}

/// Split a child line; a single trailing separator does not create an empty barcode
fn split_children(line: &str) -> Vec<String> {
    let line = line.strip_suffix(';').unwrap_or(line);
    line.split(';').map(|s| s.trim().to_string()).collect()
}

/// Parse a mapping whose parent lines are recognised by an expected barcode set.
///
/// A line holding a single barcode from `expected` selects that parent and
/// counts one replicate for it; every other line is appended as a child list
/// of the selected parent. A single barcode outside `expected` at the start
/// of the file or right after a child line is read as an unexpected parent.
/// The parents found must be exactly the `expected` set.
pub fn read_platemapping(
    name: &str,
    text: &str,
    expected: &[String],
) -> Result<PlateMapping, MetadataError> {
    let expected_set: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
    let mut mapping = PlateMapping::new(name);
    let mut current: Option<String> = None;
    // true at the start and after a child line
    let mut origin_slot = true;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields = split_children(line);
        let single = fields.len() == 1 && !fields[0].is_empty();
        if single && (origin_slot || expected_set.contains(fields[0].as_str())) {
            mapping.note_origin(&fields[0]);
            current = fields.into_iter().next();
            origin_slot = false;
            continue;
        }
        origin_slot = true;
        let Some(parent) = current.as_deref() else {
            return Err(MetadataError::Mapping {
                mapping: name.to_string(),
                line: line_no + 1,
                message: format!("child barcodes {:?} appear before any origin barcode", line),
            });
        };
        mapping.entry_mut(parent).push(fields);
    }

    let found: BTreeSet<&str> = mapping.parents().collect();
    if found != expected_set {
        return Err(MetadataError::BarcodeMismatch {
            mapping: name.to_string(),
            missing: expected_set.difference(&found).map(|s| s.to_string()).collect(),
            unexpected: found.difference(&expected_set).map(|s| s.to_string()).collect(),
        });
    }

    debug!(
        "Mapping '{}': {} origin plates, {} child plates",
        name,
        mapping.entries.len(),
        mapping.children().count()
    );
    Ok(mapping)
}

/// Parse a mapping with strictly alternating parent and child lines
pub fn parse_mappingfile(name: &str, text: &str) -> Result<PlateMapping, MetadataError> {
    let mut mapping = PlateMapping::new(name);
    let mut parent: Option<String> = None;

    let lines = text
        .lines()
        .map(str::trim)
        .enumerate()
        .filter(|(_, l)| !l.is_empty());
    for (i, (line_no, line)) in lines.enumerate() {
        if i % 2 == 0 {
            let fields = split_children(line);
            if fields.len() != 1 || fields[0].is_empty() {
                return Err(MetadataError::Mapping {
                    mapping: name.to_string(),
                    line: line_no + 1,
                    message: format!("expected a single parent barcode, found {:?}", line),
                });
            }
            parent = fields.into_iter().next();
        } else if let Some(p) = parent.take() {
            mapping.push_replicate(p, split_children(line));
        }
    }

    if let Some(p) = parent {
        return Err(MetadataError::Mapping {
            mapping: name.to_string(),
            line: 0,
            message: format!("parent barcode {:?} has no child line", p),
        });
    }
    Ok(mapping)
}

/// Read a mapping file from disk, see [`read_platemapping`]
pub fn read_platemapping_file<P: AsRef<Path>>(
    path: P,
    expected: &[String],
) -> Result<PlateMapping, MetadataError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    read_platemapping(&file_name(path), &text, expected)
}

/// Read an alternating mapping file from disk, see [`parse_mappingfile`]
pub fn parse_mappingfile_path<P: AsRef<Path>>(path: P) -> Result<PlateMapping, MetadataError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    parse_mappingfile(&file_name(path), &text)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Check that mother → transfer and transfer → detection mappings agree.
///
/// Every transfer barcode referenced by the first level must be a parent of
/// the second level, and no level may contain empty barcodes. All problems
/// are collected into one [`MetadataError::Lineage`].
pub fn validate_lineage(
    mp_ast: &PlateMapping,
    ast_acd: &PlateMapping,
) -> Result<(), MetadataError> {
    let mut issues = Vec::new();

    let missing: Vec<&str> = mp_ast
        .children()
        .filter(|ast| !ast.is_empty() && !ast_acd.contains(ast))
        .fold(Vec::new(), |mut acc, ast| {
            if !acc.contains(&ast) {
                acc.push(ast);
            }
            acc
        });
    if !missing.is_empty() {
        issues.push(format!(
            "AsT barcodes missing in AsT -> AcD mapping: {}",
            missing.join(", ")
        ));
    }

    let empty_ast: Vec<&str> = mp_ast
        .entries
        .iter()
        .filter(|(_, reps)| reps.iter().flatten().any(String::is_empty))
        .map(|(mp, _)| mp.as_str())
        .collect();
    if !empty_ast.is_empty() {
        issues.push(format!(
            "Invalid AsT barcodes in MP -> AsT mapping: empty barcode listed for MP plate(s) {}",
            empty_ast.join(", ")
        ));
    }

    if ast_acd.parents().any(str::is_empty) {
        issues.push(
            "Invalid AsT barcodes in AsT -> AcD mapping: empty origin barcode".to_string(),
        );
    }

    let empty_acd: Vec<&str> = ast_acd
        .entries
        .iter()
        .filter(|(_, reps)| reps.iter().flatten().any(String::is_empty))
        .map(|(ast, _)| ast.as_str())
        .collect();
    if !empty_acd.is_empty() {
        issues.push(format!(
            "Invalid AcD barcodes in AsT -> AcD mapping: empty barcode listed for AsT plate(s) {}",
            empty_acd
                .iter()
                .map(|b| if b.is_empty() { "<empty>" } else { b })
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(MetadataError::Lineage(issues))
    }
}
