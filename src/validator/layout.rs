use crate::geometry::PlateFormat;
use crate::metadata::controls::{identity_column, position_column};
use crate::metadata::dilutions::{concentration_column, has_unit};
use crate::metadata::organisms::{ORGANISM_COLUMN, RACK_COLUMN};
use crate::position::parse_position;
use crate::workbook::Sheet;

use super::{sample_entries, ValidationCheck, ValidationReport};

/// Step 3a: organisms are listed
pub(crate) fn check_organisms(sheet: &Sheet, report: &mut ValidationReport) {
    let Some(idx) = sheet.column(ORGANISM_COLUMN) else {
        report.add_check(ValidationCheck::failed(
            "Organisms column",
            format!(
                "Organisms sheet does not contain the required column '{}'.",
                ORGANISM_COLUMN
            ),
        ));
        return;
    };

    if sheet.values(idx).all(str::is_empty) {
        report.add_check(ValidationCheck::failed(
            "Organisms listed",
            "Organisms sheet appears to be empty. At least one Organism entry is required."
                .to_string(),
        ));
    } else {
        report.add_check(ValidationCheck::ok("Organisms listed"));
    }

    if let Some(rack) = sheet.column(RACK_COLUMN) {
        let bad: Vec<(usize, String)> = (0..sheet.len())
            .filter_map(|row| {
                sheet
                    .cell(row, rack)
                    .filter(|v| v.parse::<u32>().is_err())
                    .map(|v| (row + 1, v.to_string()))
            })
            .collect();
        if !bad.is_empty() {
            report.add_check(ValidationCheck::failed(
                "Organisms rack indices",
                format!(
                    "Organisms.{} must hold positive whole numbers. Sample invalid entries (row:value): {}.",
                    RACK_COLUMN,
                    sample_entries(&bad)
                ),
            ));
        }
    }
}

/// Step 3b: one numeric concentration column with a resolvable unit
pub(crate) fn check_dilutions(sheet: &Sheet, report: &mut ValidationReport) {
    let Some(conc) = concentration_column(sheet) else {
        report.add_check(ValidationCheck::failed(
            "Dilutions concentration column",
            "Dilutions sheet does not appear to contain any concentration/dilution columns. \
             Expected a column with concentration/dilution values (name containing \
             'conc'/'dilut'/'dose' or numeric values)."
                .to_string(),
        ));
        return;
    };
    let header = &sheet.headers[conc];
    report.add_check(ValidationCheck::ok(format!(
        "Dilutions concentration column '{}'",
        header
    )));

    let non_numeric: Vec<(usize, String)> = (0..sheet.len())
        .filter_map(|row| {
            sheet
                .cell(row, conc)
                .filter(|v| v.parse::<f64>().is_err())
                .map(|v| (row + 1, v.to_string()))
        })
        .collect();
    if !non_numeric.is_empty() {
        report.add_check(ValidationCheck::failed(
            "Dilutions concentrations numeric",
            format!(
                "Dilutions.{} contains values that are not numbers. Sample invalid entries (row:value): {}.",
                header,
                sample_entries(&non_numeric)
            ),
        ));
    }

    if has_unit(sheet, conc) {
        report.add_check(ValidationCheck::ok("Dilutions concentration unit"));
    } else {
        report.add_check(ValidationCheck::failed(
            "Dilutions concentration unit",
            "Dilutions sheet: no concentration unit detected for the concentration column. \
             Please include units (e.g. 'mg/mL' or 'mM') either in the column header \
             (e.g. 'Concentration (mg/mL)') or add a 'Unit' column with values."
                .to_string(),
        ));
    }
}

/// Step 3c: control positions look like `A1` and lie on a 384-well plate
pub(crate) fn check_controls(sheet: &Sheet, substance_id: &str, report: &mut ValidationReport) {
    match identity_column(sheet, substance_id) {
        Some(_) => report.add_check(ValidationCheck::ok("Controls identity column")),
        None => report.add_check(ValidationCheck::failed(
            "Controls identity column",
            format!(
                "Controls sheet must contain a column naming each control ('{}', 'Internal ID' or 'ID').",
                substance_id
            ),
        )),
    }

    let Some(pos) = position_column(sheet) else {
        report.add_check(ValidationCheck::failed(
            "Controls position column",
            "Controls sheet must contain a column that starts with 'Position' \
             (e.g. 'Position 96' or 'Position 384')."
                .to_string(),
        ));
        return;
    };
    let header = &sheet.headers[pos];

    let mut malformed = Vec::new();
    let mut off_plate = Vec::new();
    for row in 0..sheet.len() {
        let Some(value) = sheet.cell(row, pos) else {
            continue;
        };
        match parse_position(value) {
            Err(_) => malformed.push((row + 1, value.to_string())),
            Ok((r, c)) if !PlateFormat::Wells384.contains(r, c) => {
                off_plate.push((row + 1, value.to_string()))
            }
            Ok(_) => {}
        }
    }

    if !malformed.is_empty() {
        report.add_check(ValidationCheck::failed(
            "Controls position format",
            format!(
                "Controls.{} contains entries that are not in the expected format (letter + digits). \
                 Sample invalid entries (row:value): {}. Positions should look like 'A1' or 'P24'.",
                header,
                sample_entries(&malformed)
            ),
        ));
    } else {
        report.add_check(ValidationCheck::ok("Controls position format"));
    }

    if !off_plate.is_empty() {
        report.add_check(ValidationCheck::failed(
            "Controls positions on plate",
            format!(
                "Controls.{} contains positions outside a 384-well plate (rows A-P, columns 1-24). \
                 Sample invalid entries (row:value): {}.",
                header,
                sample_entries(&off_plate)
            ),
        ));
    }
}
