use std::collections::HashSet;

use super::*;
use crate::geometry::PlateFormat;

#[test]
fn test_parse_position() {
    assert_eq!(parse_position("A1").unwrap(), ('A', 1));
    assert_eq!(parse_position("P24").unwrap(), ('P', 24));
    assert_eq!(parse_position("h07").unwrap(), ('H', 7));
}

#[test]
fn test_parse_position_rejects_malformed() {
    for text in ["", "A", "1A", "X", "A1B", "AA1", " A1", "A-1", "Ä1"] {
        let err = parse_position(text).unwrap_err();
        assert!(
            matches!(err, PositionError::Format { .. }),
            "expected format error for {:?}, got {:?}",
            text,
            err
        );
    }
}

#[test]
fn test_format_position() {
    assert_eq!(format_position('A', 1), "A1");
    assert_eq!(format_position('p', 24), "P24");
    assert_eq!(WellPosition::new('c', 7).to_string(), "C7");
}

#[test]
fn test_round_trip_all_384_wells() {
    let format = PlateFormat::Wells384;
    for row in format.row_letters() {
        for col in 1..=format.columns() {
            let label = format_position(row, col);
            assert_eq!(parse_position(&label).unwrap(), (row, col));
            let well: WellPosition = label.parse().unwrap();
            assert_eq!(well.to_string(), label);
        }
    }
}

#[test]
fn test_quadrant_corners() {
    assert_eq!(map_96_to_384('A', 1, 1).unwrap(), ('A', 1));
    assert_eq!(map_96_to_384('A', 1, 2).unwrap(), ('A', 2));
    assert_eq!(map_96_to_384('A', 1, 3).unwrap(), ('B', 1));
    assert_eq!(map_96_to_384('A', 1, 4).unwrap(), ('B', 2));
    assert_eq!(map_96_to_384('B', 2, 1).unwrap(), ('C', 3));
    assert_eq!(map_96_to_384('H', 12, 1).unwrap(), ('O', 23));
    assert_eq!(map_96_to_384('H', 12, 4).unwrap(), ('P', 24));
}

#[test]
fn test_quadrant_mapping_is_bijective() {
    let mut seen = HashSet::new();
    for quadrant in 1..=4u8 {
        for row in PlateFormat::Wells96.row_letters() {
            for col in 1..=12 {
                let mapped = map_96_to_384(row, col, quadrant).unwrap();
                assert!(PlateFormat::Wells384.contains(mapped.0, mapped.1));
                assert!(seen.insert(mapped), "{:?} mapped twice", mapped);
            }
        }
    }
    assert_eq!(seen.len(), 384);
}

#[test]
fn test_quadrant_parity() {
    for quadrant in Quadrant::ALL {
        for row in PlateFormat::Wells96.row_letters() {
            for col in 1..=12 {
                let (r, c) = map_96_to_384(row, col, quadrant.get()).unwrap();
                let even_row = (r as u32 - 'A' as u32) % 2 == 1;
                let even_col = c % 2 == 0;
                assert_eq!(even_row, quadrant.get() >= 3);
                assert_eq!(even_col, quadrant.get() % 2 == 0);
            }
        }
    }
}

#[test]
fn test_quadrant_mapping_domain_errors() {
    assert!(matches!(
        map_96_to_384('I', 1, 1),
        Err(PositionError::Domain(_))
    ));
    assert!(matches!(
        map_96_to_384('A', 13, 1),
        Err(PositionError::Domain(_))
    ));
    assert!(matches!(
        map_96_to_384('A', 0, 1),
        Err(PositionError::Domain(_))
    ));
    assert!(matches!(
        map_96_to_384('A', 1, 0),
        Err(PositionError::Domain(_))
    ));
    assert!(matches!(
        map_96_to_384('A', 1, 5),
        Err(PositionError::Domain(_))
    ));
}

#[test]
fn test_check_format() {
    let well = WellPosition::new('M', 20);
    assert!(well.check_format(PlateFormat::Wells384).is_ok());
    assert!(well.check_format(PlateFormat::Wells96).is_err());
}
