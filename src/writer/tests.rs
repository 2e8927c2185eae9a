use std::collections::BTreeMap;

use super::*;
use crate::config::{MeasurementLabel, PipelineConfig};
use crate::geometry::PlateFormat;
use crate::metadata::{generate_input_table, read_inputs, PlateMapping};
use crate::position::WellPosition;
use crate::process::{precipitation_test, ProcessedRecord};
use crate::reader::RawMeasurement;
use crate::reconcile::MergedRecord;
use crate::threshold::{set_membership, HitRecord, MicRecord};
use crate::workbook::{Sheet, Workbook};
use tempfile::tempdir;

fn label() -> MeasurementLabel {
    MeasurementLabel::from_raw_label("Raw Optical Density").unwrap()
}

fn to_string(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

fn processed_record() -> ProcessedRecord {
    let mut attributes = BTreeMap::new();
    attributes.insert("Smiles".to_string(), "CCO".to_string());
    ProcessedRecord {
        record: MergedRecord {
            internal_id: "S1".to_string(),
            dataset: Some("Lib".to_string()),
            role: None,
            mp_barcode: "MP1".to_string(),
            ast_barcode: "AsT1".to_string(),
            acd_barcode: "AcD1".to_string(),
            replicate: 1,
            rack: 2,
            organism: Some("Escherichia coli".to_string()),
            organism_formatted: Some("E. coli".to_string()),
            position_96: Some(WellPosition::new('A', 1)),
            quadrant: Some(crate::position::Quadrant::new(2).unwrap()),
            position_384: WellPosition::new('A', 2),
            concentration: Some(25.0),
            unit: Some("µM".to_string()),
            raw: 0.25,
            attributes,
        },
        denoised: 0.15,
        relative: 16.67,
        z_factor: f64::NAN,
        robust_z_factor: 0.5,
    }
}

#[test]
fn test_write_processed() {
    let mut buf = Vec::new();
    let rows = write_processed(&mut buf, &[processed_record()], "Internal ID", &label()).unwrap();
    assert_eq!(rows, 1);

    let text = to_string(buf);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "Internal ID,Dataset,Control Role,MP Barcode 96,AsT Barcode 384,AcD Barcode 384,\
         Replicate,Rack,Organism,Organism formatted,Position 96,Quadrant,Position 384,\
         Concentration,Concentration Unit,Smiles,Raw Optical Density,Denoised Optical Density,\
         Relative Optical Density,Z-Factor,Robust Z-Factor"
    );
    assert_eq!(
        lines[1],
        "S1,Lib,,MP1,AsT1,AcD1,1,2,Escherichia coli,E. coli,A1,2,A2,25,µM,CCO,0.25,0.15,16.67,,0.5"
    );
}

#[test]
fn test_write_hits_and_membership() {
    let hits = vec![HitRecord {
        internal_id: "S1".to_string(),
        dataset: Some("Lib".to_string()),
        organism: Some("Staphylococcus aureus".to_string()),
        organism_formatted: Some("S. aureus".to_string()),
        relative_mean: 12.5,
        relative_std: f64::NAN,
        replicates: 1,
    }];
    let mut buf = Vec::new();
    write_hits(&mut buf, &hits, "ID", &label()).unwrap();
    let text = to_string(buf);
    assert!(text.starts_with(
        "ID,Dataset,Organism,Organism formatted,Relative Optical Density mean,Relative Optical Density std,Replicates\n"
    ));
    assert!(text.ends_with("S1,Lib,Staphylococcus aureus,S. aureus,12.5,,1\n"));

    let mut buf = Vec::new();
    write_membership(&mut buf, &set_membership(&hits), "ID").unwrap();
    assert_eq!(to_string(buf), "ID,Dataset,Saureus\nS1,Lib,1\n");
}

#[test]
fn test_write_mic() {
    let mics = vec![
        MicRecord {
            internal_id: "S1".to_string(),
            dataset: None,
            organism: Some("Escherichia coli".to_string()),
            organism_formatted: Some("E. coli".to_string()),
            replicate: 2,
            mic: Some(6.25),
            unit: Some("µg/mL".to_string()),
            concentrations: 4,
        },
        MicRecord {
            internal_id: "S2".to_string(),
            mic: None,
            ..mics_template()
        },
    ];
    let mut buf = Vec::new();
    assert_eq!(write_mic(&mut buf, &mics, "Internal ID").unwrap(), 2);
    let text = to_string(buf);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[1], "S1,,Escherichia coli,E. coli,2,6.25,µg/mL,4");
    assert_eq!(lines[2], "S2,,,,1,,,0");
}

fn mics_template() -> MicRecord {
    MicRecord {
        internal_id: String::new(),
        dataset: None,
        organism: None,
        organism_formatted: None,
        replicate: 1,
        mic: None,
        unit: None,
        concentrations: 0,
    }
}

#[test]
fn test_write_precipitation_and_template() {
    let measurements: Vec<RawMeasurement> = [(1, 0.1), (12, 0.05), (1, 0.06)]
        .iter()
        .enumerate()
        .map(|(i, (column, value))| RawMeasurement {
            barcode: "P1".to_string(),
            position: WellPosition::new(if i == 2 { 'B' } else { 'A' }, *column),
            value: *value,
            plate_format: PlateFormat::Wells96,
        })
        .collect();
    let result = precipitation_test(&measurements, None).unwrap();
    let mut buf = Vec::new();
    write_precipitation(&mut buf, &result, &label()).unwrap();
    let text = to_string(buf);
    assert!(text.starts_with("Barcode,Position,Raw Optical Density,Layout,Limit of Quantification,Precipitated\n"));
    // one background reading: the limit is undefined and nothing precipitates
    assert!(text.contains("P1,A12,0.05,Background,,false\n"));

    let mut buf = Vec::new();
    let rows = generate_input_table(&[], PlateFormat::Wells384);
    write_template(&mut buf, &rows, PlateFormat::Wells384).unwrap();
    let text = to_string(buf);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 385);
    assert_eq!(lines[0], "Barcode,Replicate,Organism,ID,Row 384,Col 384,Concentration in mg/mL");
    assert_eq!(lines[2], "001PrS01001,1,Placeholder Organism A,Substance 2,B,1,1");
}

#[test]
fn test_threshold_label() {
    assert_eq!(threshold_label(50.0), "50");
    assert_eq!(threshold_label(12.5), "12.5");
}

fn experiment() -> Experiment {
    let config = PipelineConfig {
        thresholds: vec![50.0, 90.0],
        ..Default::default()
    };
    let workbook = Workbook::new("fixture")
        .with_sheet(Sheet::from_rows(
            "Substances",
            &["Internal ID", "Dataset", "MP Barcode 96", "Position 96", "Quadrant"],
            &[&["S1", "Lib", "MP1", "A1", "1"], &["T1", "Lib", "MP1", "A2", "1"]],
        ))
        .with_sheet(Sheet::from_rows("Organisms", &["Organism"], &[&["Escherichia coli"]]))
        .with_sheet(Sheet::from_rows("Dilutions", &["Concentration (µM)"], &[&["50"], &["25"]]))
        .with_sheet(Sheet::from_rows(
            "Controls",
            &["Internal ID", "Position 384"],
            &[&["Blank", "P24"], &["Negative Control", "P23"]],
        ));
    let inputs = read_inputs(&workbook, &config).unwrap();
    let mp_ast = PlateMapping::from_pairs("mp_ast.txt", [("MP1", vec!["AsT1", "AsT2"])]);
    let ast_acd = PlateMapping::from_pairs(
        "ast_acd.txt",
        [("AsT1", vec!["AcD1"]), ("AsT2", vec!["AcD2"])],
    );
    let mut measurements = Vec::new();
    for acd in ["AcD1", "AcD2"] {
        for (well, value) in [("A1", 0.2), ("A3", 0.9), ("P24", 0.1), ("P23", 1.0)] {
            measurements.push(RawMeasurement {
                barcode: acd.to_string(),
                position: well.parse().unwrap(),
                value,
                plate_format: PlateFormat::Wells384,
            });
        }
    }
    Experiment::new(config, inputs, mp_ast, ast_acd, measurements).unwrap()
}

#[test]
fn test_write_experiment() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("results");
    let mut experiment = experiment();
    let summary = write_experiment(&mut experiment, &out).unwrap();

    assert_eq!(
        summary.files,
        vec![
            "processed.csv",
            "hits_50.csv",
            "set_membership_50.csv",
            "hits_90.csv",
            "set_membership_90.csv",
            "mic.csv",
            "summary.json",
        ]
    );
    for file in &summary.files {
        assert!(out.join(file).is_file(), "{file} missing");
    }
    assert_eq!(summary.records, 8);
    assert_eq!(summary.plates.len(), 2);
    assert_eq!(summary.hits.get("50"), Some(&1));
    assert_eq!(summary.hits.get("90"), Some(&2));
    assert_eq!(summary.mic_determined, 1);
    assert!(summary.poor_plates(0.5).is_empty());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
    assert_eq!(json["config"]["plate_grouping"], "AcD Barcode 384");
    assert_eq!(json["row_counts"][0]["rows"], 8);

    let processed = std::fs::read_to_string(out.join("processed.csv")).unwrap();
    assert_eq!(processed.lines().count(), 9);
}

#[test]
fn test_output_path_must_be_directory() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("taken");
    std::fs::write(&file, "x").unwrap();
    let err = write_experiment(&mut experiment(), &file).unwrap_err();
    assert!(matches!(err, WriterError::NotADirectory(_)));
}
