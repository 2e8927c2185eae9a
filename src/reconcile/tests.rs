use super::*;
use crate::geometry::PlateFormat;
use crate::metadata::{read_inputs, PlateMapping};
use crate::workbook::{Sheet, Workbook};
use crate::PipelineConfig;

fn inputs(mother_plates: &[&str]) -> ExperimentInputs {
    let substance_rows: Vec<Vec<String>> = mother_plates
        .iter()
        .enumerate()
        .flat_map(|(i, mp)| {
            [("A1", "S"), ("A2", "T")].map(|(pos, prefix)| {
                vec![
                    format!("{}{}", prefix, i + 1),
                    "Lib".to_string(),
                    mp.to_string(),
                    pos.to_string(),
                    "1".to_string(),
                ]
            })
        })
        .collect();
    let substance_refs: Vec<Vec<&str>> = substance_rows
        .iter()
        .map(|r| r.iter().map(String::as_str).collect())
        .collect();
    let substance_slices: Vec<&[&str]> = substance_refs.iter().map(Vec::as_slice).collect();

    let workbook = Workbook::new("fixture")
        .with_sheet(Sheet::from_rows(
            "Substances",
            &["Internal ID", "Dataset", "MP Barcode 96", "Position 96", "Quadrant"],
            &substance_slices,
        ))
        .with_sheet(Sheet::from_rows(
            "Organisms",
            &["Organism"],
            &[&["Escherichia coli"], &["Staphylococcus aureus"]],
        ))
        .with_sheet(Sheet::from_rows(
            "Dilutions",
            &["Concentration (µM)"],
            &[&["50"], &["25"]],
        ))
        .with_sheet(Sheet::from_rows(
            "Controls",
            &["Internal ID", "Position 384"],
            &[&["Blank", "P24"], &["Negative Control", "P23"]],
        ));
    read_inputs(&workbook, &PipelineConfig::default()).unwrap()
}

fn lineage() -> (PlateMapping, PlateMapping) {
    let mp_ast = PlateMapping::from_pairs("mp_ast.txt", [("MP1", vec!["AsT1", "AsT2"])]);
    let ast_acd = PlateMapping::from_pairs(
        "ast_acd.txt",
        [("AsT1", vec!["AcD1", "AcD2"]), ("AsT2", vec!["AcD3", "AcD4"])],
    );
    (mp_ast, ast_acd)
}

fn reading(barcode: &str, well: &str, value: f64) -> RawMeasurement {
    RawMeasurement {
        barcode: barcode.to_string(),
        position: well.parse().unwrap(),
        value,
        plate_format: PlateFormat::Wells384,
    }
}

fn measurements() -> Vec<RawMeasurement> {
    let mut out = Vec::new();
    for (p, acd) in ["AcD1", "AcD2", "AcD3", "AcD4"].iter().enumerate() {
        for (w, well) in ["A1", "A3", "P24", "P23", "B1"].iter().enumerate() {
            out.push(reading(acd, well, p as f64 + w as f64 / 10.0));
        }
    }
    out.push(reading("Stray", "A1", 9.0));
    out
}

#[test]
fn test_join_chain() {
    let (mp_ast, ast_acd) = lineage();
    let table = reconcile(&inputs(&["MP1"]), &mp_ast, &ast_acd, &measurements()).unwrap();

    // 4 detection plates × (2 substances + 2 controls)
    assert_eq!(table.records.len(), 16);

    let s1_acd3 = table
        .records
        .iter()
        .find(|r| r.internal_id == "S1" && r.acd_barcode == "AcD3")
        .unwrap();
    assert_eq!(s1_acd3.ast_barcode, "AsT2");
    assert_eq!(s1_acd3.rack, 2);
    assert_eq!(s1_acd3.concentration, Some(25.0));
    assert_eq!(s1_acd3.unit.as_deref(), Some("µM"));
    assert_eq!(s1_acd3.organism.as_deref(), Some("Escherichia coli"));
    assert_eq!(s1_acd3.organism_formatted.as_deref(), Some("E. coli"));
    assert_eq!(s1_acd3.raw, 2.0);
    assert_eq!(s1_acd3.replicate, 1);

    let t1_acd2 = table
        .records
        .iter()
        .find(|r| r.internal_id == "T1" && r.acd_barcode == "AcD2")
        .unwrap();
    assert_eq!(t1_acd2.position_384, WellPosition::new('A', 3));
    assert_eq!(t1_acd2.organism.as_deref(), Some("Staphylococcus aureus"));
    assert_eq!(t1_acd2.raw, 1.1);

    let blanks: Vec<&MergedRecord> = table
        .records
        .iter()
        .filter(|r| r.role == Some(ControlRole::Blank))
        .collect();
    assert_eq!(blanks.len(), 4);
    assert!(blanks.iter().all(|r| r.dataset.as_deref() == Some("Lib")));

    assert_eq!(
        table.diagnostics,
        vec![PlateRowCount {
            mp_barcode: "MP1".into(),
            rows: 16,
            detection_plates: 4,
            rows_per_plate: 4.0,
        }]
    );
}

#[test]
fn test_controls_repeat_per_mother_plate() {
    let mp_ast = PlateMapping::from_pairs(
        "mp_ast.txt",
        [("MP1", vec!["AsT1", "AsT2"]), ("MP2", vec!["AsT5", "AsT6"])],
    );
    let ast_acd = PlateMapping::from_pairs(
        "ast_acd.txt",
        [
            ("AsT1", vec!["AcD1", "AcD2"]),
            ("AsT2", vec!["AcD3", "AcD4"]),
            ("AsT5", vec!["AcD5"]),
            ("AsT6", vec!["AcD6"]),
        ],
    );
    let mut readings = measurements();
    for acd in ["AcD5", "AcD6"] {
        for well in ["A1", "A3", "P24", "P23"] {
            readings.push(reading(acd, well, 0.5));
        }
    }

    let table = reconcile(&inputs(&["MP1", "MP2"]), &mp_ast, &ast_acd, &readings).unwrap();
    let mp2_controls = table
        .records
        .iter()
        .filter(|r| r.mp_barcode == "MP2" && r.role.is_some())
        .count();
    assert_eq!(mp2_controls, 4);
    assert_eq!(table.diagnostics.len(), 2);
    assert_eq!(table.diagnostics[1].rows, 8);
    assert_eq!(table.diagnostics[1].detection_plates, 2);
}

#[test]
fn test_replicates_follow_mother_plate_lines() {
    let mp_ast = PlateMapping::from_pairs(
        "mp_ast.txt",
        [("MP1", vec!["AsT1", "AsT2"]), ("MP1", vec!["AsT3", "AsT4"])],
    );
    let ast_acd = PlateMapping::from_pairs(
        "ast_acd.txt",
        [
            ("AsT1", vec!["AcD1"]),
            ("AsT2", vec!["AcD3"]),
            ("AsT3", vec!["AcD2"]),
            ("AsT4", vec!["AcD4"]),
        ],
    );
    let table = reconcile(&inputs(&["MP1"]), &mp_ast, &ast_acd, &measurements()).unwrap();
    let replicate_of = |acd: &str| {
        table
            .records
            .iter()
            .find(|r| r.acd_barcode == acd)
            .map(|r| (r.replicate, r.rack))
    };
    assert_eq!(replicate_of("AcD1"), Some((1, 1)));
    assert_eq!(replicate_of("AcD2"), Some((2, 1)));
    assert_eq!(replicate_of("AcD4"), Some((2, 2)));
}

#[test]
fn test_unmapped_mother_plate() {
    let (mp_ast, ast_acd) = lineage();
    let err = reconcile(&inputs(&["MP1", "MP9"]), &mp_ast, &ast_acd, &measurements()).unwrap_err();
    match err {
        ReconcileError::UnmappedMotherPlates { barcodes, .. } => assert_eq!(barcodes, vec!["MP9"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_inconsistent_lineage() {
    let mp_ast = PlateMapping::from_pairs("mp_ast.txt", [("MP1", vec!["AsT1", "AsT7"])]);
    let (_, ast_acd) = lineage();
    let err = reconcile(&inputs(&["MP1"]), &mp_ast, &ast_acd, &measurements()).unwrap_err();
    assert!(err.to_string().contains("AsT barcodes missing in AsT -> AcD mapping: AsT7"));
}

#[test]
fn test_no_matching_measurements() {
    let (mp_ast, ast_acd) = lineage();
    let readings = vec![reading("Other", "A1", 1.0)];
    let err = reconcile(&inputs(&["MP1"]), &mp_ast, &ast_acd, &readings).unwrap_err();
    assert!(matches!(err, ReconcileError::NoMatches { measurements: 1, .. }));
}

#[test]
fn test_plate_barcode_grouping() {
    let (mp_ast, ast_acd) = lineage();
    let table = reconcile(&inputs(&["MP1"]), &mp_ast, &ast_acd, &measurements()).unwrap();
    let record = &table.records[0];
    assert_eq!(record.plate_barcode(PlateGrouping::MotherPlate), "MP1");
    assert_eq!(record.plate_barcode(PlateGrouping::AssayTransfer), record.ast_barcode);
    assert_eq!(record.plate_barcode(PlateGrouping::AssayDetection), record.acd_barcode);
}
