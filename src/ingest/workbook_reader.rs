use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::ingest::error::LoadError;
use crate::ingest::raw_record::{CellValue, RawRecord};
use crate::ingest::SourceTable;

/// Reader for METAR report workbooks (xlsx, xlsm, xls, xlsb, ods)
pub struct WorkbookReader {
    workbook_path: PathBuf,
    sheet_name: Option<String>,
}

impl WorkbookReader {
    /// # Arguments
    /// * `workbook_path` - Path to the report workbook (e.g., "Aden_METAR_Final_Report.xlsx")
    /// * `sheet_name` - Sheet to read; the first sheet when `None`
    pub fn new(workbook_path: impl AsRef<Path>, sheet_name: Option<String>) -> Self {
        Self {
            workbook_path: workbook_path.as_ref().to_path_buf(),
            sheet_name,
        }
    }

    /// Read the header row and every data row of the sheet
    ///
    /// This is synchronous; async callers should use spawn_blocking.
    pub fn read(&self) -> Result<SourceTable, LoadError> {
        info!("Reading workbook: {}", self.workbook_path.display());

        let mut workbook = match open_workbook_auto(&self.workbook_path) {
            Ok(wb) => wb,
            Err(e) => return Err(LoadError::WorkbookOpen(e.to_string())),
        };

        let sheet_name = match &self.sheet_name {
            Some(name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or(LoadError::NoSheets)?,
        };
        debug!("Using sheet '{}'", sheet_name);

        let range = match workbook.worksheet_range(&sheet_name) {
            Ok(range) => range,
            Err(_) => return Err(LoadError::SheetNotFound(sheet_name)),
        };

        table_from_range(&range, &sheet_name)
    }
}

/// Split a worksheet range into a trimmed header row and raw records
///
/// Leading blank rows are skipped; the first row with any content is the
/// header. Fully blank data rows are padding and are not returned.
pub fn table_from_range(range: &Range<Data>, sheet_name: &str) -> Result<SourceTable, LoadError> {
    let mut rows = range
        .rows()
        .skip_while(|row| row.iter().all(|cell| cell.is_empty()));

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
        None => return Err(LoadError::MissingHeader(sheet_name.to_string())),
    };
    debug!("Header row has {} columns: {:?}", headers.len(), headers);

    let mut table = SourceTable::new(headers);
    for row in rows {
        let record = RawRecord::from_row(&table.headers, row.iter().map(CellValue::from));
        if record.is_blank() {
            continue;
        }
        table.records.push(record);
    }

    info!(
        "Read {} data rows from sheet {}",
        table.records.len(),
        sheet_name
    );
    Ok(table)
}
