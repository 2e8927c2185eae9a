//! # Well Position Codec
//!
//! Converts between alphanumeric well labels (`"A1"`, `"P24"`), typed
//! [`WellPosition`] values and plate-format specific coordinates, and maps
//! the wells of four 96-well plates onto one 384-well plate.
//!
//! ## Label format
//!
//! A label is a single row letter followed by the 1-based column number
//! without leading zeros. Parsing accepts leading zeros and lower-case row
//! letters; formatting always produces the canonical form, so
//! `parse → format` is lossless for canonical labels.
//!
//! ## Quadrant mapping
//!
//! A 384-well plate is filled from four 96-well plates in interleaved
//! (Z-order) fashion:
//!
//! ```text
//!            col 2c-1   col 2c
//! row 2r-1   Q1         Q2
//! row 2r     Q3         Q4
//! ```
//!
//! where `(r, c)` is the 96-well row index and column.

mod error;
mod quadrant;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::PlateFormat;

pub use error::PositionError;
pub use quadrant::{map_96_to_384, Quadrant};
pub(crate) use quadrant::map_well_to_384;

/// A well on a microtiter plate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WellPosition {
    /// Upper-case row letter
    pub row: char,
    /// 1-based column number
    pub column: u32,
}

impl WellPosition {
    /// Create a position, upper-casing the row letter
    pub fn new(row: char, column: u32) -> Self {
        Self {
            row: row.to_ascii_uppercase(),
            column,
        }
    }

    /// Zero-based row index (`A` = 0)
    pub fn row_index(&self) -> u32 {
        (self.row as u32).wrapping_sub('A' as u32)
    }

    /// Check that the position exists on a plate of the given format
    pub fn check_format(&self, format: PlateFormat) -> Result<(), PositionError> {
        if format.contains(self.row, self.column) {
            Ok(())
        } else {
            Err(PositionError::Domain(format!(
                "{} is not a well of a {} plate",
                self, format
            )))
        }
    }
}

impl fmt::Display for WellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.column)
    }
}

impl FromStr for WellPosition {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, column) = parse_position(s)?;
        Ok(Self { row, column })
    }
}

/// Split a well label into `(row_letter, column)`.
///
/// Fails with [`PositionError::Format`] if the text is shorter than two
/// characters, does not start with an ASCII letter, or continues with
/// anything but digits.
pub fn parse_position(text: &str) -> Result<(char, u32), PositionError> {
    let format_error = |reason| PositionError::Format {
        text: text.to_string(),
        reason,
    };

    let mut chars = text.chars();
    let row = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
        Some(_) => return Err(format_error("first character must be a row letter")),
        None => return Err(format_error("position is empty")),
    };

    let digits = chars.as_str();
    if digits.is_empty() {
        return Err(format_error("position must have at least two characters"));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format_error("column must consist of digits only"));
    }
    let column = digits
        .parse::<u32>()
        .map_err(|_| format_error("column number is too large"))?;

    Ok((row, column))
}

/// Canonical well label for a row letter and column (`('A', 1)` → `"A1"`)
pub fn format_position(row: char, column: u32) -> String {
    format!("{}{}", row.to_ascii_uppercase(), column)
}

/// Whether `text` looks like a well label (letter followed by digits)
pub fn is_position_label(text: &str) -> bool {
    parse_position(text).is_ok()
}
