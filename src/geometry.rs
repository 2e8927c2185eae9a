//! Plate geometry registry.
//!
//! Maps a plate-format identifier (number of wells) to its row and column
//! dimensions. Only the 96-well (8 × 12) and 384-well (16 × 24) formats are
//! supported; everything else is rejected with
//! [`GeometryError::UnsupportedFormat`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors raised by the geometry registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// The plate format is not one of the supported well counts
    #[error("Unsupported plate format: {0} wells (supported: 96, 384)")]
    UnsupportedFormat(u32),
}

/// Supported microtiter plate formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PlateFormat {
    /// 96-well plate, 8 rows (A-H) × 12 columns
    Wells96,
    /// 384-well plate, 16 rows (A-P) × 24 columns
    Wells384,
}

impl PlateFormat {
    /// All supported formats, smallest first
    pub const ALL: [PlateFormat; 2] = [PlateFormat::Wells96, PlateFormat::Wells384];

    /// Number of wells on the plate
    pub const fn wells(self) -> u32 {
        match self {
            PlateFormat::Wells96 => 96,
            PlateFormat::Wells384 => 384,
        }
    }

    /// Number of rows on the plate
    pub const fn rows(self) -> u32 {
        match self {
            PlateFormat::Wells96 => 8,
            PlateFormat::Wells384 => 16,
        }
    }

    /// Number of columns on the plate
    pub const fn columns(self) -> u32 {
        match self {
            PlateFormat::Wells96 => 12,
            PlateFormat::Wells384 => 24,
        }
    }

    /// `(rows, columns)` pair
    pub const fn dimensions(self) -> (u32, u32) {
        (self.rows(), self.columns())
    }

    /// Row letters in plate order (`A..H` or `A..P`)
    pub fn row_letters(self) -> impl Iterator<Item = char> {
        (0..self.rows()).map(|i| (b'A' + i as u8) as char)
    }

    /// Whether `row`/`column` lies on this plate
    pub fn contains(self, row: char, column: u32) -> bool {
        let row = row.to_ascii_uppercase();
        row.is_ascii_uppercase()
            && (row as u32 - 'A' as u32) < self.rows()
            && (1..=self.columns()).contains(&column)
    }
}

impl TryFrom<u32> for PlateFormat {
    type Error = GeometryError;

    fn try_from(wells: u32) -> Result<Self, Self::Error> {
        match wells {
            96 => Ok(PlateFormat::Wells96),
            384 => Ok(PlateFormat::Wells384),
            other => Err(GeometryError::UnsupportedFormat(other)),
        }
    }
}

impl From<PlateFormat> for u32 {
    fn from(format: PlateFormat) -> Self {
        format.wells()
    }
}

impl fmt::Display for PlateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-well", self.wells())
    }
}

/// Row and column count for a plate format given as a well count.
///
/// ```
/// use platescreen::geometry::dimensions;
///
/// assert_eq!(dimensions(96).unwrap(), (8, 12));
/// assert_eq!(dimensions(384).unwrap(), (16, 24));
/// assert!(dimensions(1536).is_err());
/// ```
pub fn dimensions(format: u32) -> Result<(u32, u32), GeometryError> {
    PlateFormat::try_from(format).map(PlateFormat::dimensions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_dimensions() {
        assert_eq!(dimensions(96).unwrap(), (8, 12));
        assert_eq!(dimensions(384).unwrap(), (16, 24));
        for format in PlateFormat::ALL {
            let (rows, cols) = format.dimensions();
            assert_eq!(rows * cols, format.wells());
        }
    }

    #[test]
    fn test_unsupported_formats() {
        for wells in [0, 6, 24, 48, 95, 1536] {
            assert_eq!(
                dimensions(wells),
                Err(GeometryError::UnsupportedFormat(wells))
            );
        }
    }

    #[test]
    fn test_row_letters() {
        let rows: String = PlateFormat::Wells96.row_letters().collect();
        assert_eq!(rows, "ABCDEFGH");
        assert_eq!(PlateFormat::Wells384.row_letters().last(), Some('P'));
    }

    #[test]
    fn test_contains() {
        assert!(PlateFormat::Wells96.contains('H', 12));
        assert!(!PlateFormat::Wells96.contains('I', 1));
        assert!(!PlateFormat::Wells96.contains('A', 13));
        assert!(!PlateFormat::Wells384.contains('A', 0));
        assert!(PlateFormat::Wells384.contains('p', 24));
    }

    #[test]
    fn test_serde_as_well_count() {
        let json = serde_json::to_string(&PlateFormat::Wells384).unwrap();
        assert_eq!(json, "384");
        let parsed: PlateFormat = serde_json::from_str("96").unwrap();
        assert_eq!(parsed, PlateFormat::Wells96);
        assert!(serde_json::from_str::<PlateFormat>("1536").is_err());
    }
}
