use std::collections::BTreeMap;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::geometry::PlateFormat;

use super::{PlateGrid, ReaderError, ReaderFile};

/// Line introducing the measurement table
pub const RESULTS_HEADER: &str = "Results";
/// Line introducing the layout / concentration table
pub const LAYOUT_HEADER: &str = "Layout";

fn plate_type_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Plate Type;[A-Za-z ]*([0-9]+)").expect("valid regex"))
}

fn barcode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{3}[A-Z][a-z]?[a-zA-Z]\d{5}").expect("valid regex"))
}

fn metadata_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r";?([a-zA-Z0-9 /]*)[;:]+([a-zA-Z0-9 /\\:_.-]*),?").expect("valid regex")
    })
}

/// Plate barcode embedded in an export file name, or the file name itself
pub fn barcode_from_filename(filename: &str) -> String {
    barcode_re()
        .find(filename)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| filename.to_string())
}

struct Lines<'a> {
    file: &'a str,
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Lines<'a> {
    fn next(&mut self, what: &str) -> Result<&'a str, ReaderError> {
        let line = self.lines.get(self.pos).copied().ok_or_else(|| ReaderError::InvalidFormat {
            file: self.file.to_string(),
            line: self.pos + 1,
            message: format!("unexpected end of file, expected {}", what),
        })?;
        self.pos += 1;
        Ok(line)
    }

    fn error(&self, message: String) -> ReaderError {
        ReaderError::InvalidFormat {
            file: self.file.to_string(),
            line: self.pos,
            message,
        }
    }

    fn column_header(&mut self) -> Result<Vec<u32>, ReaderError> {
        let line = self.next("a column header")?;
        line.split(';')
            .skip(1)
            .map(|c| {
                c.trim()
                    .parse::<u32>()
                    .map_err(|_| self.error(format!("column header {:?} is not a number", c)))
            })
            .collect()
    }

    /// Next table line split into its label and the cells between label and trailing field
    fn table_cells(&mut self, width: usize) -> Result<(&'a str, Vec<&'a str>), ReaderError> {
        let line = self.next("a table row")?;
        let fields: Vec<&str> = line.split(';').collect();
        if fields.len() < 2 || fields.len() - 2 != width {
            return Err(self.error(format!(
                "row {:?} has {} values, expected {}",
                fields[0],
                fields.len().saturating_sub(2),
                width
            )));
        }
        Ok((fields[0], fields[1..fields.len() - 1].to_vec()))
    }

    fn row_letter(&self, label: &str) -> Result<char, ReaderError> {
        let mut chars = label.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Ok(c.to_ascii_uppercase()),
            _ => Err(self.error(format!("{:?} is not a row letter", label))),
        }
    }
}

/// Parse one plate-reader text export.
///
/// Blank lines are ignored. The plate type comes from a `Plate Type;...`
/// line (96 when absent), the barcode from the file name. Lines that belong
/// to neither the `Results` nor the `Layout` section are scanned for
/// `key;value` / `key: value` metadata pairs.
pub fn parse_readerfile(filename: &str, text: &str) -> Result<ReaderFile, ReaderError> {
    let lines: Vec<&str> = text
        .lines()
        .map(|l| l.trim_end_matches(['\r', '\n']))
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return Err(ReaderError::Empty(filename.to_string()));
    }

    let plate_type = plate_type_re()
        .captures(&lines.concat())
        .and_then(|c| c[1].parse::<u32>().ok())
        .unwrap_or(96);
    let plate_format = PlateFormat::try_from(plate_type).map_err(|source| ReaderError::Geometry {
        file: filename.to_string(),
        source,
    })?;
    let rows = plate_format.rows() as usize;

    let mut file = ReaderFile {
        filename: filename.to_string(),
        barcode: barcode_from_filename(filename),
        plate_format,
        results: None,
        layout: None,
        concentrations: None,
        metadata: BTreeMap::new(),
    };

    let mut cursor = Lines {
        file: filename,
        lines,
        pos: 0,
    };
    while cursor.pos < cursor.lines.len() {
        let line = cursor.next("a line")?;
        if line == RESULTS_HEADER {
            let columns = cursor.column_header()?;
            let mut grid = PlateGrid::new(columns.clone());
            for _ in 0..rows {
                let (label, cells) = cursor.table_cells(columns.len())?;
                let row = cursor.row_letter(label)?;
                let values = cells
                    .iter()
                    .map(|v| {
                        v.trim()
                            .parse::<f64>()
                            .map_err(|_| cursor.error(format!("measurement {:?} is not a number", v)))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                grid.push_row(row, values);
            }
            file.results = Some(grid);
        } else if line == LAYOUT_HEADER {
            let columns = cursor.column_header()?;
            let mut layout = PlateGrid::new(columns.clone());
            let mut concentrations = PlateGrid::new(columns.clone());
            for _ in 0..rows {
                let (label, cells) = cursor.table_cells(columns.len())?;
                let row = cursor.row_letter(label)?;
                layout.push_row(row, cells.iter().map(|c| c.trim().to_string()).collect());
                let (_, conc_cells) = cursor.table_cells(columns.len())?;
                let values = conc_cells
                    .iter()
                    .map(|v| match v.trim() {
                        "" => Ok(None),
                        v => v.parse::<f64>().map(Some).map_err(|_| {
                            cursor.error(format!("concentration {:?} is not a number", v))
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                concentrations.push_row(row, values);
            }
            file.layout = Some(layout);
            file.concentrations = Some(concentrations);
        } else {
            for caps in metadata_re().captures_iter(line) {
                let key = caps[1].trim_matches([' ', ':']);
                let value = caps[2].trim_matches(' ');
                if !key.is_empty() && !value.is_empty() {
                    file.metadata.insert(key.to_string(), value.to_string());
                }
            }
        }
    }

    debug!(
        "Parsed reader file '{}': barcode {}, {}, {} metadata entries",
        file.filename,
        file.barcode,
        file.plate_format,
        file.metadata.len()
    );
    Ok(file)
}
