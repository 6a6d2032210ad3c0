//! The load operation: source file to `ObservationStore`
//!
//! Loading never fails outright. A source that cannot be read at all
//! comes back as [`LoadOutcome::Failed`] with a reason the presentation
//! layer can show; row and field problems are absorbed and counted.
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use crate::config::NormalizationConfig;
use crate::ingest::DataSource;
use crate::store::ObservationStore;

/// Diagnostics for a successful load
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LoadReport {
    pub source: String,
    /// Trimmed header names found in the source, in column order
    pub columns_found: Vec<String>,
    /// Configured columns the source does not have (always missing)
    pub columns_missing: Vec<String>,
    /// Non-blank data rows read from the source
    pub total_rows: usize,
    pub rows_loaded: usize,
    /// Rows without a resolvable timestamp
    pub rows_dropped: usize,
    /// Rows the reader could not decode
    pub rows_unreadable: usize,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded {
        store: ObservationStore,
        report: LoadReport,
    },
    Failed {
        reason: String,
    },
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            LoadOutcome::Failed { reason } => Some(reason),
            LoadOutcome::Loaded { .. } => None,
        }
    }

    pub fn report(&self) -> Option<&LoadReport> {
        match self {
            LoadOutcome::Loaded { report, .. } => Some(report),
            LoadOutcome::Failed { .. } => None,
        }
    }

    /// The loaded store, or an empty one when the load failed
    pub fn into_store(self) -> ObservationStore {
        match self {
            LoadOutcome::Loaded { store, .. } => store,
            LoadOutcome::Failed { .. } => ObservationStore::empty(),
        }
    }
}

/// Read, normalize and sort every row of `source`
#[instrument(skip(source, config), fields(source = %source))]
pub fn load(source: &DataSource, config: &NormalizationConfig) -> LoadOutcome {
    let table = match source.read() {
        Ok(table) => table,
        Err(e) => {
            error!("Failed to load {}: {}", source, e);
            return LoadOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };

    let columns_missing: Vec<String> = config
        .columns
        .names()
        .into_iter()
        .filter(|name| !table.headers.iter().any(|h| h.as_str() == *name))
        .map(|name| name.to_string())
        .collect();
    if !columns_missing.is_empty() {
        warn!("Columns not present in source: {:?}", columns_missing);
    }

    let total_rows = table.records.len();
    let (store, rows_dropped) = ObservationStore::from_records(table.records, config);

    if rows_dropped > 0 {
        warn!(
            "Dropped {} of {} rows with unresolvable timestamps",
            rows_dropped, total_rows
        );
    }
    info!(
        "Loaded {} observations from {} ({} rows dropped)",
        store.len(),
        source,
        rows_dropped
    );

    let report = LoadReport {
        source: source.to_string(),
        columns_found: table.headers,
        columns_missing,
        total_rows,
        rows_loaded: store.len(),
        rows_dropped,
        rows_unreadable: table.unreadable_rows,
        loaded_at: Utc::now(),
    };

    LoadOutcome::Loaded { store, report }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_fails_with_reason() {
        let outcome = load(
            &DataSource::new("/nonexistent/Aden_METAR_Final_Report.xlsx"),
            &NormalizationConfig::default(),
        );

        assert!(!outcome.is_loaded());
        assert!(outcome.failure_reason().unwrap().contains("Failed to open workbook"));
        assert!(outcome.into_store().is_empty());
    }

    #[test]
    fn test_unsupported_source_fails() {
        let outcome = load(&DataSource::new("report.pdf"), &NormalizationConfig::default());
        assert!(outcome
            .failure_reason()
            .unwrap()
            .contains("Unsupported source format"));
    }
}
