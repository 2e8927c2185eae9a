//! Property tests for the well-position codec and quality scores

use platescreen::geometry::PlateFormat;
use platescreen::position::{format_position, map_96_to_384, parse_position, WellPosition};
use platescreen::process::{robust_zfactor, zfactor};
use proptest::prelude::*;
use std::collections::HashSet;

fn row_96() -> impl Strategy<Value = char> {
    (0u8..8).prop_map(|i| (b'A' + i) as char)
}

/// Every 96-well position in every quadrant lands on a distinct 384-well position
#[test]
fn test_quadrant_mapping_is_bijective() {
    let mut seen = HashSet::new();
    for row in PlateFormat::Wells96.row_letters() {
        for column in 1..=12 {
            for quadrant in 1..=4 {
                let (r, c) = map_96_to_384(row, column, quadrant).unwrap();
                assert!(PlateFormat::Wells384.contains(r, c));
                assert!(seen.insert((r, c)), "{row}{column} Q{quadrant} collides");
            }
        }
    }
    assert_eq!(seen.len(), 384);
}

proptest! {
    /// Formatting then parsing returns the original row and column
    #[test]
    fn test_position_roundtrip(row in (0u8..26).prop_map(|i| (b'A' + i) as char), column in 1u32..1000) {
        let label = format_position(row, column);
        prop_assert_eq!(parse_position(&label).unwrap(), (row, column));
        let well: WellPosition = label.parse().unwrap();
        prop_assert_eq!(well.to_string(), label);
    }

    /// Parsing arbitrary text never panics
    #[test]
    fn test_parse_arbitrary_text(text in "\\PC{0,8}") {
        let _ = parse_position(&text);
    }

    /// The quadrant decides the parity of the mapped row and column
    #[test]
    fn test_quadrant_parity(row in row_96(), column in 1u32..=12, quadrant in 1u8..=4) {
        let (r, c) = map_96_to_384(row, column, quadrant).unwrap();
        let row_index = (r as u8 - b'A') as u32;
        prop_assert_eq!(row_index % 2 == 1, quadrant >= 3);
        prop_assert_eq!(c % 2 == 0, quadrant % 2 == 0);
        prop_assert_eq!(row_index / 2, (row as u8 - b'A') as u32);
        prop_assert_eq!((c + 1) / 2, column);
    }

    /// Quadrants outside 1-4 are rejected
    #[test]
    fn test_invalid_quadrant(row in row_96(), column in 1u32..=12, quadrant in 5u8..) {
        prop_assert!(map_96_to_384(row, column, quadrant).is_err());
        prop_assert!(map_96_to_384(row, column, 0).is_err());
    }

    /// Z-factors do not depend on which control group is called positive
    #[test]
    fn test_zfactor_symmetry(
        a in prop::collection::vec(-1e3f64..1e3, 2..20),
        b in prop::collection::vec(-1e3f64..1e3, 2..20),
    ) {
        let forward = zfactor(&a, &b);
        let backward = zfactor(&b, &a);
        prop_assert!(forward == backward || (forward.is_nan() && backward.is_nan()));
        let forward = robust_zfactor(&a, &b);
        let backward = robust_zfactor(&b, &a);
        prop_assert!(forward == backward || (forward.is_nan() && backward.is_nan()));
    }

    /// Z-factor never exceeds one
    #[test]
    fn test_zfactor_upper_bound(
        a in prop::collection::vec(0f64..1.0, 1..20),
        b in prop::collection::vec(2f64..3.0, 1..20),
    ) {
        prop_assert!(zfactor(&a, &b) <= 1.0);
    }
}
