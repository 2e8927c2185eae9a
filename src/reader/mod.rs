//! # Plate-Reader Exports
//!
//! Parses the semicolon-separated text files written by the plate reader and
//! flattens them into [`RawMeasurement`] records.
//!
//! ## File layout
//!
//! ```text
//! Plate Type;Greiner 384 flat bottom
//! Date;2024-03-18
//! Results
//! ;1;2;...;24
//! A;0.043;0.051;...;0.046;600
//! ...
//! P;0.044;0.047;...;0.049;600
//! ```
//!
//! The trailing field of every table row (wavelength) is dropped. The plate
//! barcode is taken from the file name.
//!
//! ## Example
//!
//! ```rust
//! use platescreen::reader::parse_readerfile;
//!
//! let text = "Results\n;1;2;3;4;5;6;7;8;9;10;11;12\n\
//!     A;1;1;1;1;1;1;1;1;1;1;1;1;600\nB;1;1;1;1;1;1;1;1;1;1;1;1;600\n\
//!     C;1;1;1;1;1;1;1;1;1;1;1;1;600\nD;1;1;1;1;1;1;1;1;1;1;1;1;600\n\
//!     E;1;1;1;1;1;1;1;1;1;1;1;1;600\nF;1;1;1;1;1;1;1;1;1;1;1;1;600\n\
//!     G;1;1;1;1;1;1;1;1;1;1;1;1;600\nH;1;1;1;1;1;1;1;1;1;1;1;1;600\n";
//! let file = parse_readerfile("run_001AcD01001.txt", text)?;
//! assert_eq!(file.barcode, "001AcD01001");
//! assert_eq!(file.measurements().len(), 96);
//! # Ok::<(), platescreen::reader::ReaderError>(())
//! ```

mod error;
mod parse;


use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::geometry::PlateFormat;
use crate::position::WellPosition;

pub use error::ReaderError;
pub use parse::{barcode_from_filename, parse_readerfile, LAYOUT_HEADER, RESULTS_HEADER};

/// One raw well reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMeasurement {
    /// Barcode of the measured (assay-detection) plate
    pub barcode: String,
    /// Measured well
    pub position: WellPosition,
    /// Raw reading
    pub value: f64,
    /// Format of the measured plate
    pub plate_format: PlateFormat,
}

/// A row-major table of per-well values
#[derive(Debug, Clone, PartialEq)]
pub struct PlateGrid<T> {
    /// Column numbers from the table header
    pub columns: Vec<u32>,
    /// Row letters in table order
    pub rows: Vec<char>,
    /// `values[row][column]`
    pub values: Vec<Vec<T>>,
}

impl<T> PlateGrid<T> {
    /// Empty grid with the given column header
    pub fn new(columns: Vec<u32>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            values: Vec::new(),
        }
    }

    fn push_row(&mut self, row: char, values: Vec<T>) {
        self.rows.push(row);
        self.values.push(values);
    }

    /// Wells with their values, row by row
    pub fn iter(&self) -> impl Iterator<Item = (WellPosition, &T)> {
        self.rows.iter().zip(&self.values).flat_map(move |(&row, values)| {
            self.columns
                .iter()
                .zip(values)
                .map(move |(&column, value)| (WellPosition::new(row, column), value))
        })
    }

    /// Value at a well
    pub fn get(&self, position: WellPosition) -> Option<&T> {
        let r = self.rows.iter().position(|&row| row == position.row)?;
        let c = self.columns.iter().position(|&col| col == position.column)?;
        self.values.get(r)?.get(c)
    }
}

/// A parsed plate-reader export
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderFile {
    /// File name the export was read from
    pub filename: String,
    /// Plate barcode (from the file name)
    pub barcode: String,
    /// Declared plate format
    pub plate_format: PlateFormat,
    /// Raw readings of the `Results` section
    pub results: Option<PlateGrid<f64>>,
    /// Well labels of the `Layout` section
    pub layout: Option<PlateGrid<String>>,
    /// Concentrations of the `Layout` section
    pub concentrations: Option<PlateGrid<Option<f64>>>,
    /// Key/value pairs found outside the tables
    pub metadata: BTreeMap<String, String>,
}

impl ReaderFile {
    /// Flatten the results table into raw measurements
    pub fn measurements(&self) -> Vec<RawMeasurement> {
        self.results
            .iter()
            .flat_map(|grid| grid.iter())
            .map(|(position, &value)| RawMeasurement {
                barcode: self.barcode.clone(),
                position,
                value,
                plate_format: self.plate_format,
            })
            .collect()
    }
}

/// Read and parse one export file
pub fn read_readerfile<P: AsRef<Path>>(path: P) -> Result<ReaderFile, ReaderError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| ReaderError::IoError {
        path: path.display().to_string(),
        source,
    })?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_readerfile(&filename, &String::from_utf8_lossy(&bytes))
}

/// Read every regular file of a directory as an export, in file-name order
pub fn read_readerfiles<P: AsRef<Path>>(dir: P) -> Result<Vec<ReaderFile>, ReaderError> {
    let dir = dir.as_ref();
    let io_error = |source| ReaderError::IoError {
        path: dir.display().to_string(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let files = paths
        .iter()
        .map(read_readerfile)
        .collect::<Result<Vec<_>, _>>()?;
    info!("Read {} reader files from {}", files.len(), dir.display());
    Ok(files)
}

/// Plate format shared by all exports of a batch
pub fn common_plate_format(files: &[ReaderFile]) -> Result<Option<PlateFormat>, ReaderError> {
    let mut formats: Vec<u32> = files.iter().map(|f| u32::from(f.plate_format)).collect();
    formats.sort_unstable();
    formats.dedup();
    match formats.as_slice() {
        [] => Ok(None),
        [single] => Ok(PlateFormat::try_from(*single).ok()),
        _ => Err(ReaderError::MixedPlateTypes(formats)),
    }
}

/// Flatten a batch of exports into raw measurements.
///
/// All exports must declare the same plate format.
pub fn collect_measurements(files: &[ReaderFile]) -> Result<Vec<RawMeasurement>, ReaderError> {
    common_plate_format(files)?;
    let mut measurements = Vec::new();
    for file in files {
        if file.results.is_none() {
            warn!("Reader file '{}' has no {} section", file.filename, RESULTS_HEADER);
        }
        measurements.extend(file.measurements());
    }
    Ok(measurements)
}

/// Metadata of every export keyed by barcode
pub fn collect_metadata(files: &[ReaderFile]) -> BTreeMap<String, BTreeMap<String, String>> {
    files
        .iter()
        .map(|f| (f.barcode.clone(), f.metadata.clone()))
        .collect()
}
