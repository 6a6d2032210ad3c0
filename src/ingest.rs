//! Source readers turning report sheets into raw records

pub mod csv_reader;
pub mod error;
pub mod raw_record;
pub mod workbook_reader;

use std::path::{Path, PathBuf};

pub use csv_reader::CsvReader;
pub use error::LoadError;
pub use raw_record::{CellValue, RawRecord};
pub use workbook_reader::WorkbookReader;

const WORKBOOK_EXTENSIONS: [&str; 7] = ["xlsx", "xlsm", "xlam", "xlsb", "xls", "xla", "ods"];

/// Where a dataset is loaded from
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    pub path: PathBuf,
    /// Sheet to read from a workbook; ignored for CSV
    pub sheet_name: Option<String>,
}

impl DataSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheet_name: None,
        }
    }

    pub fn with_sheet(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = Some(sheet_name.into());
        self
    }

    /// Read the whole source into a header row plus raw records
    pub fn read(&self) -> Result<SourceTable, LoadError> {
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if extension == "csv" {
            CsvReader::new(&self.path).read()
        } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
            WorkbookReader::new(&self.path, self.sheet_name.clone()).read()
        } else {
            Err(LoadError::UnsupportedSource(self.path.display().to_string()))
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.sheet_name {
            Some(sheet) => write!(f, "{} [{}]", self.path.display(), sheet),
            None => write!(f, "{}", self.path.display()),
        }
    }
}

/// Header row plus the non-blank data rows of one sheet
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
    /// Rows the reader could not decode at all (CSV only)
    pub unreadable_rows: usize,
}

impl SourceTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            records: Vec::new(),
            unreadable_rows: 0,
        }
    }
}
