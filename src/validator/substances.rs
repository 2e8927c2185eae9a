use std::collections::{BTreeSet, HashMap};

use crate::metadata::substances::{PositionColumns, DATASET_COLUMN, MP_BARCODE_COLUMN};
use crate::workbook::Sheet;

use super::{sample_entries, ValidationCheck, ValidationReport, SAMPLE_SIZE};

/// Step 2: substance identity, datasets and positions
pub(crate) fn check_substances(sheet: &Sheet, substance_id: &str, report: &mut ValidationReport) {
    match sheet.column(substance_id) {
        None => report.add_check(ValidationCheck::failed(
            "Substances identity column",
            format!(
                "Substances sheet does not contain the required column '{}'. \
                 This column identifies each substance (e.g. an internal ID).",
                substance_id
            ),
        )),
        Some(id_idx) => {
            report.add_check(ValidationCheck::ok(format!(
                "Substances identity column '{}'",
                substance_id
            )));
            check_identifiers(sheet, substance_id, id_idx, report);
        }
    }

    if sheet.has_column(DATASET_COLUMN) {
        report.add_check(ValidationCheck::ok("Substances dataset column"));
    } else {
        report.add_check(ValidationCheck::failed(
            "Substances dataset column",
            format!(
                "Substances sheet does not contain the required column '{}'.",
                DATASET_COLUMN
            ),
        ));
    }

    if !sheet.has_column(MP_BARCODE_COLUMN) {
        report.add_check(ValidationCheck::warning(
            "Substances mother-plate barcodes",
            format!(
                "no '{}' column; substances cannot be matched to mother plates",
                MP_BARCODE_COLUMN
            ),
        ));
    }

    check_positions(sheet, report);
}

fn check_identifiers(sheet: &Sheet, substance_id: &str, id_idx: usize, report: &mut ValidationReport) {
    let empty_rows = (0..sheet.len())
        .filter(|&row| sheet.cell(row, id_idx).is_none())
        .count();
    if empty_rows > 0 {
        report.add_check(ValidationCheck::failed(
            "Substances identifiers present",
            format!(
                "Substances.{} contains empty values. Every substance must have an ID.",
                substance_id
            ),
        ));
    }

    let dataset_idx = sheet.column(DATASET_COLUMN);
    let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
    for row in 0..sheet.len() {
        if let Some(id) = sheet.cell(row, id_idx) {
            let dataset = dataset_idx.and_then(|i| sheet.cell(row, i)).unwrap_or("");
            *seen.entry((dataset, id)).or_insert(0) += 1;
        }
    }
    let duplicates: BTreeSet<&str> = seen
        .iter()
        .filter(|(_, &count)| count > 1)
        .map(|((_, id), _)| *id)
        .collect();

    if duplicates.is_empty() {
        report.add_check(ValidationCheck::ok("Substances identifiers unique per dataset"));
    } else {
        let sample: Vec<&str> = duplicates.into_iter().take(SAMPLE_SIZE).collect();
        report.add_check(ValidationCheck::failed(
            "Substances identifiers unique per dataset",
            format!(
                "Substances.{} contains duplicate IDs. Example duplicates: {}.",
                substance_id,
                sample.join(", ")
            ),
        ));
    }
}

fn check_positions(sheet: &Sheet, report: &mut ValidationReport) {
    let Some(columns) = PositionColumns::detect(sheet) else {
        report.add_check(ValidationCheck::failed(
            "Substances well positions",
            "Substances sheet has no well position columns. Expected 'Position 96' or \
             'Row 96' + 'Col 96' together with 'Quadrant', or 'Position 384'."
                .to_string(),
        ));
        return;
    };

    let mut invalid = Vec::new();
    let mut first_reason = None;
    for row in 0..sheet.len() {
        if let Err(reason) = columns.resolve(sheet, row) {
            invalid.push((row + 1, row_label(sheet, row, columns)));
            first_reason.get_or_insert(reason);
        }
    }

    match first_reason {
        None => report.add_check(ValidationCheck::ok("Substances well positions")),
        Some(reason) => report.add_check(ValidationCheck::failed(
            "Substances well positions",
            format!(
                "Substances contains {} row(s) whose well position cannot be mapped to the \
                 384-well plate ({}). Sample invalid entries (row:value): {}.",
                invalid.len(),
                reason,
                sample_entries(&invalid)
            ),
        )),
    }
}

fn row_label(sheet: &Sheet, row: usize, columns: PositionColumns) -> String {
    columns
        .indices()
        .into_iter()
        .map(|i| sheet.cell(row, i).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("/")
}
