use crate::workbook::{Workbook, REQUIRED_SHEETS};

use super::{ValidationCheck, ValidationReport};

/// Step 1: every required sheet is present
pub(crate) fn check_required_sheets(workbook: &Workbook, report: &mut ValidationReport) {
    let missing: Vec<&str> = REQUIRED_SHEETS
        .iter()
        .copied()
        .filter(|name| workbook.sheet(name).is_none())
        .collect();

    if missing.is_empty() {
        report.add_check(ValidationCheck::ok("Required sheets present"));
    } else {
        report.add_check(ValidationCheck::failed(
            "Required sheets present",
            format!(
                "Missing sheets: {}. Expected sheets are: {}.",
                missing.join(", "),
                REQUIRED_SHEETS.join(", ")
            ),
        ));
    }

    let extra: Vec<&str> = workbook
        .sheet_names()
        .filter(|name| !REQUIRED_SHEETS.contains(name))
        .collect();
    if !extra.is_empty() {
        report.add_check(ValidationCheck::warning(
            "Additional sheets",
            format!("ignored: {}", extra.join(", ")),
        ));
    }
}
