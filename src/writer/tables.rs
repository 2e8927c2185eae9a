use std::collections::BTreeSet;
use std::fmt::Display;
use std::io::Write;

use crate::config::MeasurementLabel;
use crate::geometry::PlateFormat;
use crate::metadata::TemplateRow;
use crate::process::{PrecipitationResult, ProcessedRecord};
use crate::threshold::{HitRecord, MembershipTable, MicRecord};

use super::WriterError;

/// Empty cell for `NaN`
fn number(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Empty cell for `None`
fn optional<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn optional_number(value: Option<f64>) -> String {
    value.map(number).unwrap_or_default()
}

/// Write the processed table; returns the number of data rows.
///
/// Substance attributes become extra columns (union over all rows, sorted)
/// between the lineage columns and the measurement columns.
pub fn write_processed<W: Write>(
    writer: W,
    records: &[ProcessedRecord],
    id_column: &str,
    measurement: &MeasurementLabel,
) -> Result<usize, WriterError> {
    let attributes: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.record.attributes.keys().map(String::as_str))
        .collect();

    let mut out = csv::Writer::from_writer(writer);
    let mut header: Vec<String> = [
        id_column,
        "Dataset",
        "Control Role",
        "MP Barcode 96",
        "AsT Barcode 384",
        "AcD Barcode 384",
        "Replicate",
        "Rack",
        "Organism",
        "Organism formatted",
        "Position 96",
        "Quadrant",
        "Position 384",
        "Concentration",
        "Concentration Unit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend(attributes.iter().map(|s| s.to_string()));
    header.extend([
        measurement.raw(),
        measurement.denoised(),
        measurement.relative(),
        "Z-Factor".to_string(),
        "Robust Z-Factor".to_string(),
    ]);
    out.write_record(&header)?;

    for p in records {
        let r = &p.record;
        let mut row = vec![
            r.internal_id.clone(),
            optional(r.dataset.as_deref()),
            optional(r.role),
            r.mp_barcode.clone(),
            r.ast_barcode.clone(),
            r.acd_barcode.clone(),
            r.replicate.to_string(),
            r.rack.to_string(),
            optional(r.organism.as_deref()),
            optional(r.organism_formatted.as_deref()),
            optional(r.position_96),
            optional(r.quadrant.map(|q| q.get())),
            r.position_384.to_string(),
            optional_number(r.concentration),
            optional(r.unit.as_deref()),
        ];
        row.extend(
            attributes
                .iter()
                .map(|a| r.attributes.get(*a).cloned().unwrap_or_default()),
        );
        row.extend([
            number(r.raw),
            number(p.denoised),
            number(p.relative),
            number(p.z_factor),
            number(p.robust_z_factor),
        ]);
        out.write_record(&row)?;
    }
    out.flush()?;
    Ok(records.len())
}

/// Write an aggregated hit table
pub fn write_hits<W: Write>(
    writer: W,
    hits: &[HitRecord],
    id_column: &str,
    measurement: &MeasurementLabel,
) -> Result<usize, WriterError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record([
        id_column.to_string(),
        "Dataset".to_string(),
        "Organism".to_string(),
        "Organism formatted".to_string(),
        format!("{} mean", measurement.relative()),
        format!("{} std", measurement.relative()),
        "Replicates".to_string(),
    ])?;
    for hit in hits {
        out.write_record([
            hit.internal_id.clone(),
            optional(hit.dataset.as_deref()),
            optional(hit.organism.as_deref()),
            optional(hit.organism_formatted.as_deref()),
            number(hit.relative_mean),
            number(hit.relative_std),
            hit.replicates.to_string(),
        ])?;
    }
    out.flush()?;
    Ok(hits.len())
}

/// Write a set-membership table with `1`/`0` flags, one row per dataset and substance
pub fn write_membership<W: Write>(
    writer: W,
    table: &MembershipTable,
    id_column: &str,
) -> Result<usize, WriterError> {
    let mut out = csv::Writer::from_writer(writer);
    let mut header = vec![id_column.to_string(), "Dataset".to_string()];
    header.extend(table.columns.iter().cloned());
    out.write_record(&header)?;
    for row in &table.rows {
        let mut record = vec![row.internal_id.clone(), optional(row.dataset.as_deref())];
        record.extend(row.members.iter().map(|m| if *m { "1" } else { "0" }.to_string()));
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(table.rows.len())
}

/// Write the MIC table
pub fn write_mic<W: Write>(
    writer: W,
    mics: &[MicRecord],
    id_column: &str,
) -> Result<usize, WriterError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record([
        id_column,
        "Dataset",
        "Organism",
        "Organism formatted",
        "Replicate",
        "MIC",
        "Concentration Unit",
        "Concentrations tested",
    ])?;
    for mic in mics {
        out.write_record([
            mic.internal_id.clone(),
            optional(mic.dataset.as_deref()),
            optional(mic.organism.as_deref()),
            optional(mic.organism_formatted.as_deref()),
            mic.replicate.to_string(),
            optional_number(mic.mic),
            optional(mic.unit.as_deref()),
            mic.concentrations.to_string(),
        ])?;
    }
    out.flush()?;
    Ok(mics.len())
}

/// Write precipitation-test wells with the shared limit of quantification
pub fn write_precipitation<W: Write>(
    writer: W,
    result: &PrecipitationResult,
    measurement: &MeasurementLabel,
) -> Result<usize, WriterError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record([
        "Barcode".to_string(),
        "Position".to_string(),
        measurement.raw(),
        "Layout".to_string(),
        "Limit of Quantification".to_string(),
        "Precipitated".to_string(),
    ])?;
    let loq = number(result.limit_of_quantification);
    for well in &result.wells {
        out.write_record([
            well.barcode.clone(),
            well.position.to_string(),
            number(well.raw),
            if well.background { "Background" } else { "Substance" }.to_string(),
            loq.clone(),
            well.precipitated.to_string(),
        ])?;
    }
    out.flush()?;
    Ok(result.wells.len())
}

/// Write a generated input table
pub fn write_template<W: Write>(
    writer: W,
    rows: &[TemplateRow],
    format: PlateFormat,
) -> Result<usize, WriterError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record([
        "Barcode".to_string(),
        "Replicate".to_string(),
        "Organism".to_string(),
        "ID".to_string(),
        format!("Row {}", format.wells()),
        format!("Col {}", format.wells()),
        "Concentration in mg/mL".to_string(),
    ])?;
    for row in rows {
        out.write_record([
            row.barcode.clone(),
            row.replicate.to_string(),
            row.organism.clone(),
            row.substance.clone(),
            row.position.row.to_string(),
            row.position.column.to_string(),
            row.concentration.to_string(),
        ])?;
    }
    out.flush()?;
    Ok(rows.len())
}
