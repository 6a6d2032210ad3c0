use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::ingest::error::LoadError;
use crate::ingest::raw_record::{CellValue, RawRecord};
use crate::ingest::SourceTable;

/// Reader for CSV exports of the report sheet
///
/// Every cell arrives as text; numeric and timestamp interpretation
/// happens during normalization exactly as for workbook cells.
pub struct CsvReader {
    path: PathBuf,
}

impl CsvReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn read(&self) -> Result<SourceTable, LoadError> {
        info!("Reading CSV: {}", self.path.display());

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;

        let headers: Vec<String> = rdr
            .byte_headers()?
            .iter()
            .map(|h| {
                String::from_utf8_lossy(h)
                    .trim_start_matches('\u{feff}')
                    .trim()
                    .to_string()
            })
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(LoadError::MissingHeader(self.path.display().to_string()));
        }

        let mut table = SourceTable::new(headers);
        // Decoded per field; invalid UTF-8 is replaced, never fatal to the row
        for (idx, result) in rdr.byte_records().enumerate() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    warn!("Unreadable CSV row {}: {}", idx + 1, e);
                    table.unreadable_rows += 1;
                    continue;
                }
            };

            let cells = row
                .iter()
                .map(|field| CellValue::from(String::from_utf8_lossy(field).as_ref()));
            let record = RawRecord::from_row(&table.headers, cells);
            if !record.is_blank() {
                table.records.push(record);
            }
        }

        info!("Read {} data rows from CSV", table.records.len());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_headers_and_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "\u{feff}Date, UTC ,Temp C").unwrap();
        writeln!(file, "2024-01-05,0600,30").unwrap();
        writeln!(file, ",,").unwrap();
        writeln!(file, "2024-01-05,0630").unwrap();

        let table = CsvReader::new(file.path()).read().unwrap();

        assert_eq!(table.headers, vec!["Date", "UTC", "Temp C"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(
            table.records[0].get("Temp C"),
            Some(&CellValue::Text("30".into()))
        );
        assert_eq!(table.records[1].get("Temp C"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_non_utf8_field_keeps_the_row() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Date,UTC,Temp C,METAR\n").unwrap();
        file.write_all(b"2024-01-05,0600,30,OYAA 050600Z 30\xb0C\n").unwrap();
        file.write_all(b"2024-01-05,0700,31,OK\n").unwrap();

        let table = CsvReader::new(file.path()).read().unwrap();

        assert_eq!(table.unreadable_rows, 0);
        assert_eq!(table.records.len(), 2);
        assert_eq!(
            table.records[0].get("Temp C"),
            Some(&CellValue::Text("30".into()))
        );
        let metar = table.records[0].get("METAR").unwrap().to_text().unwrap();
        assert!(metar.starts_with("OYAA 050600Z 30"));
        assert!(metar.contains('\u{fffd}'));
    }

    #[test]
    fn test_missing_file_is_csv_error() {
        let result = CsvReader::new("/nonexistent/report.csv").read();
        assert!(matches!(result, Err(LoadError::Csv(_))));
    }
}
