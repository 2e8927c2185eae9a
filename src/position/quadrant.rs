use std::fmt;

use serde::{Deserialize, Serialize};

use super::{PositionError, WellPosition};
use crate::geometry::PlateFormat;

/// One of the four 96-well source plates of a 384-well plate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quadrant(u8);

impl Quadrant {
    /// All four quadrants in order
    pub const ALL: [Quadrant; 4] = [Quadrant(1), Quadrant(2), Quadrant(3), Quadrant(4)];

    /// Create a quadrant, rejecting anything outside 1-4
    pub fn new(value: u8) -> Result<Self, PositionError> {
        if (1..=4).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PositionError::Domain(format!(
                "quadrant {} is outside 1-4",
                value
            )))
        }
    }

    /// Numeric value (1-4)
    pub fn get(self) -> u8 {
        self.0
    }

    /// Quadrants 3 and 4 take the second (even) row of a row pair
    fn row_offset(self) -> u32 {
        u32::from(self.0 >= 3)
    }

    /// Quadrants 2 and 4 take the second (even) column of a column pair
    fn column_offset(self) -> u32 {
        u32::from(self.0 % 2 == 0)
    }
}

impl TryFrom<u8> for Quadrant {
    type Error = PositionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quadrant> for u8 {
    fn from(q: Quadrant) -> Self {
        q.0
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

/// Map a 96-well position of the given quadrant onto the 384-well plate.
///
/// Rows `A..P` are split into eight pairs (`AB`, `CD`, ..., `OP`) selected by
/// the 96-well row; columns `1..24` into twelve pairs selected by the
/// 96-well column. The quadrant picks the member of each pair.
///
/// ```
/// use platescreen::position::map_96_to_384;
///
/// assert_eq!(map_96_to_384('A', 1, 1).unwrap(), ('A', 1));
/// assert_eq!(map_96_to_384('A', 1, 4).unwrap(), ('B', 2));
/// assert_eq!(map_96_to_384('H', 12, 4).unwrap(), ('P', 24));
/// assert!(map_96_to_384('I', 1, 1).is_err());
/// ```
pub fn map_96_to_384(row96: char, col96: u32, quadrant: u8) -> Result<(char, u32), PositionError> {
    let quadrant = Quadrant::new(quadrant)?;
    let mapped = map_well_to_384(WellPosition::new(row96, col96), quadrant)?;
    Ok((mapped.row, mapped.column))
}

/// Typed variant of [`map_96_to_384`]
pub(crate) fn map_well_to_384(
    well: WellPosition,
    quadrant: Quadrant,
) -> Result<WellPosition, PositionError> {
    if !PlateFormat::Wells96.contains(well.row, well.column) {
        return Err(PositionError::Domain(format!(
            "{} is not a 96-well position (rows A-H, columns 1-12)",
            well
        )));
    }

    let row_index = 2 * well.row_index() + quadrant.row_offset();
    let column = 2 * (well.column - 1) + 1 + quadrant.column_offset();

    Ok(WellPosition {
        row: (b'A' + row_index as u8) as char,
        column,
    })
}
