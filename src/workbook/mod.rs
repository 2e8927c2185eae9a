//! # Input Workbook
//!
//! Experiment metadata arrives as a workbook of named sheets. On disk a
//! workbook is a directory with one delimited text file per sheet; the file
//! stem is the sheet name:
//!
//! ```text
//! experiment_input/
//! ├── Substances.csv
//! ├── Organisms.csv
//! ├── Dilutions.csv
//! └── Controls.tsv
//! ```
//!
//! Cells are kept as trimmed strings. Typing happens in
//! [`crate::metadata`], after the workbook has passed validation.

mod error;
mod sheet;


use std::fs;
use std::io::Read;
use std::path::Path;

use log::debug;

pub use error::WorkbookError;
pub use sheet::Sheet;

/// Names of the sheets an experiment workbook must provide
pub const REQUIRED_SHEETS: [&str; 4] = ["Substances", "Organisms", "Dilutions", "Controls"];

/// A collection of named sheets
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    /// Where the workbook was loaded from (for messages)
    pub source: String,
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            sheets: Vec::new(),
        }
    }

    /// Add a sheet, replacing any sheet of the same name
    pub fn insert(&mut self, sheet: Sheet) {
        self.sheets.retain(|s| s.name != sheet.name);
        self.sheets.push(sheet);
    }

    /// Builder-style [`Workbook::insert`]
    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.insert(sheet);
        self
    }

    /// Look up a sheet by name
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Sheet names in insertion order
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    /// Load every `.csv`, `.tsv` and `.txt` file of a directory as a sheet
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, WorkbookError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(WorkbookError::NotFound(dir.display().to_string()));
        }

        let io_error = |path: &Path, source| WorkbookError::Io {
            path: path.display().to_string(),
            source,
        };

        let mut paths: Vec<_> = fs::read_dir(dir)
            .map_err(|e| io_error(dir, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && delimiter_for(p).is_some())
            .collect();
        paths.sort();

        let mut workbook = Workbook::new(dir.display().to_string());
        for path in paths {
            let (Some(name), Some(delimiter)) = (
                path.file_stem().and_then(|s| s.to_str()),
                delimiter_for(&path),
            ) else {
                continue;
            };
            let file = fs::File::open(&path).map_err(|e| io_error(&path, e))?;
            let sheet = Sheet::from_reader(name.trim(), file, delimiter)?;
            debug!(
                "Loaded sheet '{}' ({} columns, {} rows)",
                sheet.name,
                sheet.headers.len(),
                sheet.len()
            );
            workbook.insert(sheet);
        }
        Ok(workbook)
    }
}

/// Field delimiter implied by a sheet file extension
fn delimiter_for(path: &Path) -> Option<u8> {
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "csv" => Some(b','),
        "tsv" | "txt" => Some(b'\t'),
        _ => None,
    }
}

impl Sheet {
    /// Parse a delimited sheet from any reader
    pub fn from_reader<R: Read>(
        name: &str,
        reader: R,
        delimiter: u8,
    ) -> Result<Self, WorkbookError> {
        let csv_error = |source| WorkbookError::Csv {
            sheet: name.to_string(),
            source,
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(csv_error)?;
            let mut row: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
            row.resize(headers.len(), String::new());
            if row.iter().all(String::is_empty) {
                continue;
            }
            rows.push(row);
        }

        Ok(Sheet::new(name, headers, rows))
    }
}
