use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::PlateFormat;
use crate::position::{map_well_to_384, parse_position, Quadrant, WellPosition};
use crate::workbook::Sheet;

use super::MetadataError;

/// Column holding the dataset tag
pub const DATASET_COLUMN: &str = "Dataset";
/// Column holding the 96-well mother-plate barcode
pub const MP_BARCODE_COLUMN: &str = "MP Barcode 96";
/// Column holding the 96-well position label
pub const POSITION_96_COLUMN: &str = "Position 96";
/// Column holding the 96-well row letter
pub const ROW_96_COLUMN: &str = "Row 96";
/// Column holding the 96-well column number
pub const COL_96_COLUMN: &str = "Col 96";
/// Column holding the 384-well position label
pub const POSITION_384_COLUMN: &str = "Position 384";
/// Column holding the 384-well row letter
pub const ROW_384_COLUMN: &str = "Row 384";
/// Column holding the 384-well column number
pub const COL_384_COLUMN: &str = "Col 384";
/// Column holding the 96 → 384 quadrant
pub const QUADRANT_COLUMN: &str = "Quadrant";

/// A tested substance placed on a mother plate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substance {
    /// Identifier, unique within its dataset
    pub internal_id: String,
    /// Dataset (library) tag
    pub dataset: String,
    /// Mother-plate barcode
    pub mp_barcode: String,
    /// Well on the 96-well mother plate, if given
    pub position_96: Option<WellPosition>,
    /// Quadrant of the mother plate on the 384-well plate, if given
    pub quadrant: Option<Quadrant>,
    /// Well on the 384-well assay plates
    pub position_384: WellPosition,
    /// Remaining sheet columns
    pub attributes: BTreeMap<String, String>,
}

/// Where a substances sheet keeps its well locations
#[derive(Debug, Clone, Copy)]
pub(crate) enum PositionColumns {
    /// `Position 384` label
    Label384(usize),
    /// `Row 384` + `Col 384`
    Split384(usize, usize),
    /// `Position 96` label + `Quadrant`
    Label96(usize, usize),
    /// `Row 96` + `Col 96` + `Quadrant`
    Split96(usize, usize, usize),
}

impl PositionColumns {
    /// Detect the position layout of a substances sheet
    pub(crate) fn detect(sheet: &Sheet) -> Option<Self> {
        let col = |name| sheet.column(name);
        if let Some(p) = col(POSITION_384_COLUMN) {
            return Some(Self::Label384(p));
        }
        if let (Some(r), Some(c)) = (col(ROW_384_COLUMN), col(COL_384_COLUMN)) {
            return Some(Self::Split384(r, c));
        }
        let q = col(QUADRANT_COLUMN)?;
        if let Some(p) = col(POSITION_96_COLUMN) {
            return Some(Self::Label96(p, q));
        }
        match (col(ROW_96_COLUMN), col(COL_96_COLUMN)) {
            (Some(r), Some(c)) => Some(Self::Split96(r, c, q)),
            _ => None,
        }
    }

    pub(crate) fn indices(self) -> Vec<usize> {
        match self {
            Self::Label384(p) => vec![p],
            Self::Split384(r, c) | Self::Label96(r, c) => vec![r, c],
            Self::Split96(r, c, q) => vec![r, c, q],
        }
    }

    /// Resolve one sheet row to `(96-well position, quadrant, 384-well position)`
    pub(crate) fn resolve(
        self,
        sheet: &Sheet,
        row: usize,
    ) -> Result<(Option<WellPosition>, Option<Quadrant>, WellPosition), String> {
        let cell = |i: usize| sheet.cell(row, i).unwrap_or("");
        match self {
            Self::Label384(p) => {
                let well = parse_well(cell(p))?;
                check_on(well, PlateFormat::Wells384)?;
                Ok((None, None, well))
            }
            Self::Split384(r, c) => {
                let well = split_well(cell(r), cell(c))?;
                check_on(well, PlateFormat::Wells384)?;
                Ok((None, None, well))
            }
            Self::Label96(p, q) => {
                let well = parse_well(cell(p))?;
                let quadrant = parse_quadrant(cell(q))?;
                let mapped = map_well_to_384(well, quadrant).map_err(|e| e.to_string())?;
                Ok((Some(well), Some(quadrant), mapped))
            }
            Self::Split96(r, c, q) => {
                let well = split_well(cell(r), cell(c))?;
                let quadrant = parse_quadrant(cell(q))?;
                let mapped = map_well_to_384(well, quadrant).map_err(|e| e.to_string())?;
                Ok((Some(well), Some(quadrant), mapped))
            }
        }
    }
}

fn parse_well(text: &str) -> Result<WellPosition, String> {
    parse_position(text)
        .map(|(row, column)| WellPosition::new(row, column))
        .map_err(|e| e.to_string())
}

fn split_well(row: &str, column: &str) -> Result<WellPosition, String> {
    parse_well(&format!("{}{}", row, column))
}

fn parse_quadrant(text: &str) -> Result<Quadrant, String> {
    let value: u8 = text
        .parse()
        .map_err(|_| format!("quadrant {:?} is not a number", text))?;
    Quadrant::new(value).map_err(|e| e.to_string())
}

fn check_on(well: WellPosition, format: PlateFormat) -> Result<(), String> {
    well.check_format(format).map_err(|e| e.to_string())
}

/// Type the substances sheet.
///
/// Expects a sheet that passed [`crate::validator::validate_workbook`];
/// any remaining problem is reported as [`MetadataError::InvalidValue`].
pub fn read_substances(sheet: &Sheet, id_column: &str) -> Result<Vec<Substance>, MetadataError> {
    let invalid = |row: usize, column: &str, message: String| MetadataError::InvalidValue {
        sheet: sheet.name.clone(),
        row: row + 1,
        column: column.to_string(),
        message,
    };

    let id_idx = sheet
        .column(id_column)
        .ok_or_else(|| invalid(0, id_column, "column is missing".to_string()))?;
    let dataset_idx = sheet
        .column(DATASET_COLUMN)
        .ok_or_else(|| invalid(0, DATASET_COLUMN, "column is missing".to_string()))?;
    let mp_idx = sheet.column(MP_BARCODE_COLUMN);
    let positions = PositionColumns::detect(sheet)
        .ok_or_else(|| invalid(0, "Position", "no well position columns".to_string()))?;

    let mut consumed = vec![id_idx, dataset_idx];
    consumed.extend(mp_idx);
    consumed.extend(positions.indices());

    let mut substances = Vec::with_capacity(sheet.len());
    for row in 0..sheet.len() {
        let internal_id = sheet
            .cell(row, id_idx)
            .ok_or_else(|| invalid(row, id_column, "empty identifier".to_string()))?
            .to_string();
        let (position_96, quadrant, position_384) = positions
            .resolve(sheet, row)
            .map_err(|msg| invalid(row, "Position", msg))?;

        let attributes = sheet
            .headers
            .iter()
            .enumerate()
            .filter(|(i, h)| !consumed.contains(i) && !h.is_empty())
            .filter_map(|(i, h)| sheet.cell(row, i).map(|v| (h.clone(), v.to_string())))
            .collect();

        substances.push(Substance {
            internal_id,
            dataset: sheet.cell(row, dataset_idx).unwrap_or_default().to_string(),
            mp_barcode: mp_idx
                .and_then(|i| sheet.cell(row, i))
                .unwrap_or_default()
                .to_string(),
            position_96,
            quadrant,
            position_384,
            attributes,
        });
    }
    Ok(substances)
}
