use calamine::Data;
use chrono::NaiveDateTime;

/// A single untyped cell as it came out of the source sheet
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    /// Cell the spreadsheet already typed as a date, time or datetime
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Blank cells and whitespace-only text both count as empty
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Textual rendering of the cell, `None` for empty cells
    ///
    /// Text is returned verbatim (no trimming). Whole numbers render
    /// without a trailing `.0` so that `5.0` read from a sheet shows as `5`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) if s.trim().is_empty() => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{n:.0}"))
            }
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::DateTime(dt) => Some(dt.to_string()),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Text(b.to_string()),
            // calamine provides direct conversion; fall back to the raw serial
            Data::DateTime(excel_date) => match excel_date.as_datetime() {
                Some(dt) => CellValue::DateTime(dt),
                None => CellValue::Number(excel_date.as_f64()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(_) | Data::Empty => CellValue::Empty,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// One input row: column name (trimmed) to cell, in sheet column order
///
/// Lookups are by exact name. When a sheet repeats a header the first
/// column with that name wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    cells: Vec<(String, CellValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair a header row with a row of cells
    ///
    /// Short rows are padded with empty cells; cells beyond the last
    /// header are ignored.
    pub fn from_row<I>(headers: &[String], cells: I) -> Self
    where
        I: IntoIterator<Item = CellValue>,
    {
        let mut values = cells.into_iter();
        let cells = headers
            .iter()
            .map(|header| (header.clone(), values.next().unwrap_or(CellValue::Empty)))
            .collect();
        Self { cells }
    }

    /// Builder-style insert, mostly handy for tests and fixtures
    pub fn with(mut self, column: &str, value: impl Into<CellValue>) -> Self {
        self.cells.push((column.trim().to_string(), value.into()));
        self
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.is_empty())
    }
}
