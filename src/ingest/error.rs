use thiserror::Error;

/// Reasons a source could not be read at all
///
/// These never escape `load`; they become the diagnostic reason of a
/// failed load.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Workbook contains no sheets")]
    NoSheets,

    #[error("No header row found in {0}")]
    MissingHeader(String),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported source format: {0}")]
    UnsupportedSource(String),
}
