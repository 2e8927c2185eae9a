//! # Input Workbook Validation
//!
//! Checks an experiment workbook before any sheet is typed or joined. Every
//! check is run, and every problem is recorded, so a user sees the complete
//! list of issues in one pass.
//!
//! ## Validation Checklist
//!
//! 1. **Structure**: the Substances, Organisms, Dilutions and Controls sheets exist
//! 2. **Substances**: identity and `Dataset` columns, unique IDs per dataset, resolvable well positions
//! 3. **Layout sheets**: organisms listed, concentrations numeric with a unit,
//!    control positions shaped like `A1`
//!
//! ## Usage
//!
//! ```rust
//! use platescreen::validator::validate_workbook;
//! use platescreen::workbook::{Sheet, Workbook};
//!
//! let workbook = Workbook::new("input").with_sheet(Sheet::from_rows(
//!     "Organisms",
//!     &["Organism"],
//!     &[&["Escherichia coli"]],
//! ));
//! let report = validate_workbook(&workbook, "Internal ID");
//! assert!(report.has_failures());
//! println!("{}", report);
//! ```

use crate::workbook::Workbook;

pub use report::{CheckStatus, ValidationCheck, ValidationReport};

mod layout;
mod report;
mod structure;
mod substances;


/// Number of offending values quoted in a failure message
pub(crate) const SAMPLE_SIZE: usize = 5;

/// Run every workbook check and collect the outcome
pub fn validate_workbook(workbook: &Workbook, substance_id: &str) -> ValidationReport {
    let mut report = ValidationReport::new(workbook.source.clone());

    // 1. Structure
    structure::check_required_sheets(workbook, &mut report);

    // 2. Substances
    if let Some(sheet) = workbook.sheet("Substances") {
        substances::check_substances(sheet, substance_id, &mut report);
    }

    // 3. Layout sheets
    if let Some(sheet) = workbook.sheet("Organisms") {
        layout::check_organisms(sheet, &mut report);
    }
    if let Some(sheet) = workbook.sheet("Dilutions") {
        layout::check_dilutions(sheet, &mut report);
    }
    if let Some(sheet) = workbook.sheet("Controls") {
        layout::check_controls(sheet, substance_id, &mut report);
    }

    report
}

/// Render up to [`SAMPLE_SIZE`] `(row, value)` pairs as `3:'Z1', 5:'A'`
pub(crate) fn sample_entries(entries: &[(usize, String)]) -> String {
    entries
        .iter()
        .take(SAMPLE_SIZE)
        .map(|(row, value)| format!("{}:'{}'", row, value))
        .collect::<Vec<_>>()
        .join(", ")
}
