/// A named table of string cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    /// Sheet name
    pub name: String,
    /// Column headers (trimmed)
    pub headers: Vec<String>,
    /// Rows, each exactly `headers.len()` cells long
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Create a sheet, padding or truncating rows to the header width
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Convenience constructor for literal tables
    pub fn from_rows(name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            name,
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the sheet has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column with exactly this header
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Index of the first column whose header satisfies `pred`
    pub fn find_column(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.headers.iter().position(|h| pred(h))
    }

    /// Whether a column with this header exists
    pub fn has_column(&self, header: &str) -> bool {
        self.column(header).is_some()
    }

    /// Cells of one column, top to bottom
    pub fn values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| row[index].as_str())
    }

    /// Cell at `(row, column)`, `None` when empty
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// A column is numeric when every non-empty cell parses as a float
    /// and at least one cell is non-empty
    pub fn is_numeric_column(&self, index: usize) -> bool {
        let mut any = false;
        for value in self.values(index).filter(|v| !v.is_empty()) {
            if value.parse::<f64>().is_err() {
                return false;
            }
            any = true;
        }
        any
    }
}
