//! Integration tests for platescreen
//!
//! These tests drive the full pipeline from files on disk to result tables.

use platescreen::geometry::PlateFormat;
use platescreen::pipeline::{Experiment, PipelineError, StageKey};
use platescreen::process::precipitation_test;
use platescreen::reader::{collect_measurements, read_readerfiles};
use platescreen::reconcile::ReconcileError;
use platescreen::writer::write_experiment;
use platescreen::PipelineConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

const DETECTION_PLATES: [&str; 4] = ["001AcD01001", "001AcD01002", "001AcD01003", "001AcD01004"];

/// 384-well export: S1 (A1) inhibits, T1 (A3) does not, P24 blank, P23 negative control
fn export_384() -> String {
    let mut text = String::from("Plate Type;Greiner 384 flat bottom\nDate;2024-03-18\n\nResults\n;");
    let header: Vec<String> = (1..=24).map(|c| c.to_string()).collect();
    text.push_str(&header.join(";"));
    text.push('\n');
    for row in PlateFormat::Wells384.row_letters() {
        text.push(row);
        for column in 1..=24 {
            let value = match (row, column) {
                ('A', 1) => 0.2,
                ('A', 3) => 0.9,
                ('P', 24) => 0.1,
                ('P', 23) => 1.0,
                _ => 0.5,
            };
            text.push_str(&format!(";{}", value));
        }
        text.push_str(";600\n");
    }
    text
}

struct Fixture {
    _dir: TempDir,
    workbook: PathBuf,
    readouts: PathBuf,
    mp_ast: PathBuf,
    ast_acd: PathBuf,
    output: PathBuf,
}

fn write_fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let root = dir.path();

    let workbook = root.join("workbook");
    fs::create_dir(&workbook).unwrap();
    fs::write(
        workbook.join("Substances.csv"),
        "Internal ID,Dataset,MP Barcode 96,Position 96,Quadrant,Smiles\n\
         S1,Lib,MP1,A1,1,CCO\n\
         T1,Lib,MP1,A2,1,CCN\n",
    )
    .unwrap();
    fs::write(
        workbook.join("Organisms.csv"),
        "Organism\nEscherichia coli ATCC 25922\nStaphylococcus aureus\n",
    )
    .unwrap();
    fs::write(workbook.join("Dilutions.tsv"), "Concentration in µg/mL\n50\n25\n").unwrap();
    fs::write(
        workbook.join("Controls.csv"),
        "Internal ID,Position 384\nBlank,P24\nNegative Control,P23\n",
    )
    .unwrap();

    let readouts = root.join("readouts");
    fs::create_dir(&readouts).unwrap();
    for barcode in DETECTION_PLATES {
        fs::write(readouts.join(format!("20240318_{}.txt", barcode)), export_384()).unwrap();
    }

    let mp_ast = root.join("mp_ast.txt");
    fs::write(&mp_ast, "MP1\n001AsT01001;001AsT01002\n").unwrap();
    let ast_acd = root.join("ast_acd.txt");
    fs::write(
        &ast_acd,
        format!(
            "001AsT01001\n{};{}\n001AsT01002\n{};{}\n",
            DETECTION_PLATES[0], DETECTION_PLATES[1], DETECTION_PLATES[2], DETECTION_PLATES[3]
        ),
    )
    .unwrap();

    let output = root.join("results");
    Fixture {
        _dir: dir,
        workbook,
        readouts,
        mp_ast,
        ast_acd,
        output,
    }
}

fn load(fixture: &Fixture, config: PipelineConfig) -> Result<Experiment, PipelineError> {
    Experiment::from_paths(
        config,
        &fixture.workbook,
        &fixture.readouts,
        &fixture.mp_ast,
        &fixture.ast_acd,
    )
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

/// Full run from disk to result tables
#[test]
fn test_process_from_files() {
    let fixture = write_fixture();
    let config = PipelineConfig {
        thresholds: vec![50.0, 90.0],
        ..Default::default()
    };
    let mut experiment = load(&fixture, config).unwrap();
    let summary = write_experiment(&mut experiment, &fixture.output).unwrap();

    // 2 substances + 2 controls on 4 detection plates
    assert_eq!(summary.records, 16);
    assert_eq!(summary.plates.len(), 4);
    assert!(summary.plates.iter().all(|p| p.z_factor == 1.0));
    assert!(summary.poor_plates(0.5).is_empty());
    assert_eq!(summary.hits.get("50"), Some(&2));
    assert_eq!(summary.hits.get("90"), Some(&4));
    assert_eq!(summary.mic_determined, 2);
    assert_eq!(summary.row_counts.len(), 1);
    assert_eq!(summary.row_counts[0].rows_per_plate, 4.0);

    let processed = read(&fixture.output.join("processed.csv"));
    let header = processed.lines().next().unwrap();
    assert!(header.starts_with("Internal ID,Dataset,Control Role"));
    assert!(header.contains(",Smiles,Raw Optical Density,Denoised Optical Density,Relative Optical Density,"));
    let s1 = processed
        .lines()
        .find(|l| l.starts_with("S1,") && l.contains("001AcD01001"))
        .unwrap();
    assert!(s1.contains(",E. coli ATCC 25922,"), "{s1}");
    assert!(s1.ends_with(",CCO,0.2,0.1,11.11,1,1"), "{s1}");

    let hits = read(&fixture.output.join("hits_50.csv"));
    assert_eq!(hits.lines().count(), 3);
    assert!(hits.lines().skip(1).all(|l| l.starts_with("S1,Lib,")));

    let membership = read(&fixture.output.join("set_membership_90.csv"));
    assert_eq!(membership, "Internal ID,Dataset,EcoliATCC25922,Saureus\nS1,Lib,1,1\nT1,Lib,1,1\n");

    let mic = read(&fixture.output.join("mic.csv"));
    assert!(mic.contains("S1,Lib,Escherichia coli ATCC 25922,E. coli ATCC 25922,1,25,µg/mL,2"));
    assert!(mic.contains("T1,Lib,Staphylococcus aureus,S. aureus,1,,µg/mL,2"));

    let json: serde_json::Value = serde_json::from_str(&read(&fixture.output.join("summary.json"))).unwrap();
    assert_eq!(json["records"], 16);
    assert_eq!(json["config"]["thresholds"][1], 90.0);
    assert_eq!(json["files"].as_array().unwrap().len(), 7);

    assert!(experiment.cached_stages().contains(&StageKey::Mic));
}

/// Grouping plates by mother plate pools controls of all detection plates
#[test]
fn test_mother_plate_grouping() {
    let fixture = write_fixture();
    let config: PipelineConfig = toml::from_str("plate_grouping = \"MP Barcode 96\"").unwrap();
    let mut experiment = load(&fixture, config).unwrap();
    let processed = experiment.processed().unwrap();
    assert_eq!(processed.quality.len(), 1);
    assert_eq!(processed.quality[0].plate, "MP1");
    assert_eq!(processed.quality[0].blank_count, 4);
    assert_eq!(processed.quality[0].negative_count, 4);
}

#[test]
fn test_mapping_must_list_mother_plates() {
    let fixture = write_fixture();
    fs::write(&fixture.mp_ast, "MP2\n001AsT01001;001AsT01002\n").unwrap();
    let err = load(&fixture, PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Metadata(_)), "{err}");
    assert!(err.to_string().contains("MP2"), "{err}");
}

#[test]
fn test_readouts_without_lineage() {
    let fixture = write_fixture();
    for barcode in DETECTION_PLATES {
        fs::remove_file(fixture.readouts.join(format!("20240318_{}.txt", barcode))).unwrap();
    }
    fs::write(fixture.readouts.join("20240318_009AcD09009.txt"), export_384()).unwrap();

    let mut experiment = load(&fixture, PipelineConfig::default()).unwrap();
    let err = experiment.merged().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Reconcile(ReconcileError::NoMatches { measurements: 384, .. })
    ));
}

#[test]
fn test_precipitation_over_exports() {
    let fixture = write_fixture();
    let files = read_readerfiles(&fixture.readouts).unwrap();
    assert_eq!(files.len(), 4);
    assert!(files.iter().all(|f| f.metadata.get("Date").map(String::as_str) == Some("2024-03-18")));

    let measurements = collect_measurements(&files).unwrap();
    let result = precipitation_test(&measurements, None).unwrap();
    assert_eq!(result.wells.len(), 4 * 384);
    assert_eq!(result.wells.iter().filter(|w| w.background).count(), 4 * 16);
    assert!(result.limit_of_quantification > 1.0);
    assert_eq!(result.precipitated().count(), 0);
}

fn platescreen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_platescreen"))
}

#[test]
fn test_cli_map_position() {
    let output = platescreen().args(["map-position", "B3", "2"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "C6");

    let output = platescreen().args(["map-position", "I1", "1"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_cli_validate_exit_code() {
    let fixture = write_fixture();
    let ok = platescreen()
        .args(["validate", "--input"])
        .arg(&fixture.workbook)
        .output()
        .unwrap();
    assert!(ok.status.success(), "{}", String::from_utf8_lossy(&ok.stdout));

    fs::remove_file(fixture.workbook.join("Organisms.csv")).unwrap();
    let failed = platescreen()
        .args(["validate", "--input"])
        .arg(&fixture.workbook)
        .output()
        .unwrap();
    assert!(!failed.status.success());
}

#[test]
fn test_cli_process_and_template() {
    let fixture = write_fixture();
    let status = platescreen()
        .arg("process")
        .arg("--input")
        .arg(&fixture.workbook)
        .arg("--readouts")
        .arg(&fixture.readouts)
        .arg("--mp-ast")
        .arg(&fixture.mp_ast)
        .arg("--ast-acd")
        .arg(&fixture.ast_acd)
        .arg("--output")
        .arg(&fixture.output)
        .args(["-t", "50", "-t", "90"])
        .status()
        .unwrap();
    assert!(status.success());
    assert!(fixture.output.join("hits_90.csv").is_file());

    let template = fixture.output.join("template.csv");
    let status = platescreen()
        .arg("template")
        .arg("--readouts")
        .arg(&fixture.readouts)
        .arg("--output")
        .arg(&template)
        .status()
        .unwrap();
    assert!(status.success());
    let text = read(&template);
    assert_eq!(text.lines().count(), 1 + 4 * 384);
    assert!(text.contains("001AcD01004,1,Placeholder Organism D,Substance 384,P,24,1"));
}
