use super::*;
use crate::config::ConfigError;
use crate::geometry::PlateFormat;
use crate::metadata::read_inputs;
use crate::workbook::{Sheet, Workbook};

fn inputs() -> ExperimentInputs {
    let workbook = Workbook::new("fixture")
        .with_sheet(Sheet::from_rows(
            "Substances",
            &["Internal ID", "Dataset", "MP Barcode 96", "Position 96", "Quadrant"],
            &[&["S1", "Lib", "MP1", "A1", "1"], &["T1", "Lib", "MP1", "A2", "1"]],
        ))
        .with_sheet(Sheet::from_rows(
            "Organisms",
            &["Organism"],
            &[&["Escherichia coli"], &["Staphylococcus aureus"]],
        ))
        .with_sheet(Sheet::from_rows("Dilutions", &["Concentration in µg/mL"], &[&["50"], &["25"]]))
        .with_sheet(Sheet::from_rows(
            "Controls",
            &["Internal ID", "Position 384"],
            &[&["Blank", "P24"], &["Negative Control", "P23"]],
        ));
    read_inputs(&workbook, &PipelineConfig::default()).unwrap()
}

fn experiment(config: PipelineConfig) -> Result<Experiment, PipelineError> {
    let mp_ast = PlateMapping::from_pairs("mp_ast.txt", [("MP1", vec!["AsT1", "AsT2"])]);
    let ast_acd = PlateMapping::from_pairs(
        "ast_acd.txt",
        [("AsT1", vec!["AcD1", "AcD2"]), ("AsT2", vec!["AcD3", "AcD4"])],
    );
    let mut measurements = Vec::new();
    for acd in ["AcD1", "AcD2", "AcD3", "AcD4"] {
        for (well, value) in [("A1", 0.2), ("A3", 0.9), ("P24", 0.1), ("P23", 1.0)] {
            measurements.push(RawMeasurement {
                barcode: acd.to_string(),
                position: well.parse().unwrap(),
                value,
                plate_format: PlateFormat::Wells384,
            });
        }
    }
    Experiment::new(config, inputs(), mp_ast, ast_acd, measurements)
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = PipelineConfig {
        measurement_label: "Optical Density".to_string(),
        ..Default::default()
    };
    let err = experiment(config).unwrap_err();
    assert!(matches!(err, PipelineError::Config(ConfigError::Invalid(_))));
}

#[test]
fn test_stages_are_computed_lazily() {
    let mut experiment = experiment(PipelineConfig::default()).unwrap();
    assert!(experiment.cached_stages().is_empty());
    assert_eq!(experiment.measurement().relative(), "Relative Optical Density");

    assert_eq!(experiment.merged().unwrap().records.len(), 16);
    assert_eq!(experiment.cached_stages(), vec![StageKey::Merged]);

    let hits = experiment.hits(50.0).unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.internal_id == "S1"));
    assert_eq!(hits[0].relative_mean, 11.11);
    assert_eq!(
        experiment.cached_stages(),
        vec![StageKey::Merged, StageKey::Processed, StageKey::hits(50.0)]
    );
}

#[test]
fn test_cached_results_are_reused() {
    let mut experiment = experiment(PipelineConfig::default()).unwrap();
    let first = experiment.processed().unwrap().clone();
    let second = experiment.processed().unwrap();
    assert_eq!(&first, second);
    assert_eq!(second.quality.len(), 4);
    assert!(second.quality.iter().all(|q| q.has_controls()));

    experiment.set_membership(90.0).unwrap();
    experiment.set_membership(90.0).unwrap();
    assert_eq!(
        experiment.cached_stages(),
        vec![
            StageKey::Merged,
            StageKey::Processed,
            StageKey::hits(90.0),
            StageKey::membership(90.0),
        ]
    );
    let table = experiment.set_membership(90.0).unwrap();
    assert_eq!(table.columns, vec!["Ecoli", "Saureus"]);
    assert_eq!(table.rows.len(), 2);
}

#[test]
fn test_mic_stage() {
    let mut experiment = experiment(PipelineConfig::default()).unwrap();
    let mic = experiment.mic().unwrap();
    let s1: Vec<&MicRecord> = mic.iter().filter(|m| m.internal_id == "S1").collect();
    assert_eq!(s1.len(), 2);
    assert!(s1.iter().all(|m| m.mic == Some(25.0)));
    assert!(s1.iter().all(|m| m.unit.as_deref() == Some("µg/mL")));
    let t1: Vec<&MicRecord> = mic.iter().filter(|m| m.internal_id == "T1").collect();
    assert!(t1.iter().all(|m| m.mic.is_none()));
    assert!(experiment.cached_stages().contains(&StageKey::Mic));
}

#[test]
fn test_stage_key_display() {
    assert_eq!(StageKey::hits(50.0).to_string(), "hits(50)");
    assert_eq!(StageKey::Processed.to_string(), "processed");
}
