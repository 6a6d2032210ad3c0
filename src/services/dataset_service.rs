use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use crate::config::NormalizationConfig;
use crate::ingest::DataSource;
use crate::loader::{load, LoadOutcome, LoadReport};
use crate::normalize::{NumericField, Observation};
use crate::query::{
    query_with, Aggregates, Aggregator, HourSet, LogEntry, QueryError, QueryFilter, QueryResult,
    SeriesPoint,
};
use crate::store::ObservationStore;

const NOT_LOADED_REASON: &str = "Dataset has not been loaded yet";

/// Query string accepted by the query endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    /// Inclusive; defaults to the first date in the store
    pub start: Option<NaiveDate>,
    /// Inclusive; defaults to the last date in the store
    pub end: Option<NaiveDate>,
    /// Comma separated UTC hours, e.g. "0,6,12,18"
    pub hours: Option<String>,
    /// Comma separated numeric fields to summarize; all when absent
    pub fields: Option<String>,
    /// Field for series projections; temperature when absent
    pub field: Option<String>,
}

impl QueryParams {
    pub fn hour_set(&self) -> Result<Option<HourSet>, QueryError> {
        match &self.hours {
            Some(list) => HourSet::parse_list(list),
            None => Ok(None),
        }
    }

    pub fn aggregator(&self) -> Result<Aggregator, QueryError> {
        let Some(list) = self.fields.as_deref().filter(|l| !l.trim().is_empty()) else {
            return Ok(Aggregator::default());
        };

        let numeric_fields = list
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(|part| part.parse::<NumericField>().map_err(QueryError::UnknownField))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Aggregator::new(
            numeric_fields,
            crate::normalize::CategoricalField::ALL.to_vec(),
        ))
    }

    pub fn series_field(&self) -> Result<NumericField, QueryError> {
        match &self.field {
            Some(name) => name.parse().map_err(QueryError::UnknownField),
            None => Ok(NumericField::Temperature),
        }
    }

    /// Resolve against a store's bounds
    ///
    /// Only a range the caller supplied in full can be inverted. `Ok(None)`
    /// means nothing can match: the store is empty and a bound was left
    /// open, or the single given bound lies beyond the data.
    pub fn filter(&self, store: &ObservationStore) -> Result<Option<QueryFilter>, QueryError> {
        let hours = self.hour_set()?;
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(QueryError::InvertedRange { start, end });
            }
        }

        let (Some(start), Some(end)) = (
            self.start.or(store.min_date()),
            self.end.or(store.max_date()),
        ) else {
            return Ok(None);
        };
        if start > end {
            debug!("Open range {} to {} lies outside the data", start, end);
            return Ok(None);
        }
        Ok(Some(QueryFilter::new(start, end)?.with_hours(hours)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DatasetStatus {
    Loaded,
    Failed,
}

/// What the presentation layer needs to know about the current dataset
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DatasetInfo {
    pub status: DatasetStatus,
    pub source: String,
    pub failure_reason: Option<String>,
    pub total_observations: usize,
    /// Lower bound for date pickers
    pub min_date: Option<NaiveDate>,
    /// Upper bound for date pickers
    pub max_date: Option<NaiveDate>,
    pub report: Option<LoadReport>,
    pub published_at: DateTime<Utc>,
}

/// One fully built, immutable load result
#[derive(Debug)]
pub struct DatasetSnapshot {
    pub source: DataSource,
    pub store: ObservationStore,
    pub report: Option<LoadReport>,
    pub failure_reason: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl DatasetSnapshot {
    pub fn from_outcome(source: DataSource, outcome: LoadOutcome) -> Self {
        let (store, report, failure_reason) = match outcome {
            LoadOutcome::Loaded { store, report } => (store, Some(report), None),
            LoadOutcome::Failed { reason } => (ObservationStore::empty(), None, Some(reason)),
        };
        Self {
            source,
            store,
            report,
            failure_reason,
            published_at: Utc::now(),
        }
    }

    fn not_loaded(source: DataSource) -> Self {
        Self::from_outcome(
            source,
            LoadOutcome::Failed {
                reason: NOT_LOADED_REASON.to_string(),
            },
        )
    }

    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            status: if self.failure_reason.is_some() {
                DatasetStatus::Failed
            } else {
                DatasetStatus::Loaded
            },
            source: self.source.to_string(),
            failure_reason: self.failure_reason.clone(),
            total_observations: self.store.len(),
            min_date: self.store.min_date(),
            max_date: self.store.max_date(),
            report: self.report.clone(),
            published_at: self.published_at,
        }
    }
}

/// Owns the dataset for the process and answers queries against it
///
/// Readers take the current snapshot (an `Arc`) and keep using it even
/// if a reload publishes a newer one meanwhile. A reload builds the new
/// snapshot completely before swapping it in.
#[derive(Clone)]
pub struct DatasetService {
    source: DataSource,
    config: Arc<NormalizationConfig>,
    current: Arc<RwLock<Arc<DatasetSnapshot>>>,
    reload_guard: Arc<Mutex<()>>,
}

impl DatasetService {
    /// Service with nothing loaded yet; see [`DatasetService::initialize`]
    pub fn new(source: DataSource, config: NormalizationConfig) -> Self {
        let initial = Arc::new(DatasetSnapshot::not_loaded(source.clone()));
        Self {
            source,
            config: Arc::new(config),
            current: Arc::new(RwLock::new(initial)),
            reload_guard: Arc::new(Mutex::new(())),
        }
    }

    /// Create the service and perform the startup load
    pub async fn initialize(source: DataSource, config: NormalizationConfig) -> Self {
        let service = Self::new(source, config);
        service.reload().await;
        service
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn snapshot(&self) -> Arc<DatasetSnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Load the source again and publish the result
    ///
    /// A failed load is published too (empty store plus reason), so the
    /// presentation layer can show why there is no data. Concurrent
    /// reloads run one after another.
    #[instrument(skip(self), fields(source = %self.source))]
    pub async fn reload(&self) -> Arc<DatasetSnapshot> {
        let _reload = self.reload_guard.lock().await;
        debug!("Reloading dataset");

        let source = self.source.clone();
        let config = Arc::clone(&self.config);
        let built = tokio::task::spawn_blocking(move || {
            let outcome = load(&source, &config);
            DatasetSnapshot::from_outcome(source, outcome)
        })
        .await;

        let snapshot = Arc::new(match built {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Load task failed: {}", e);
                DatasetSnapshot::from_outcome(
                    self.source.clone(),
                    LoadOutcome::Failed {
                        reason: format!("Load task failed: {e}"),
                    },
                )
            }
        });

        match &snapshot.failure_reason {
            Some(reason) => warn!("Published empty dataset: {}", reason),
            None => info!("Published dataset with {} observations", snapshot.store.len()),
        }

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&snapshot);
        snapshot
    }

    pub fn info(&self) -> DatasetInfo {
        self.snapshot().info()
    }

    /// Filtered observations plus aggregates
    #[instrument(skip(self))]
    pub fn query(&self, params: &QueryParams) -> Result<QueryResult, QueryError> {
        let snapshot = self.snapshot();
        let aggregator = params.aggregator()?;

        let result = match params.filter(&snapshot.store)? {
            Some(filter) => query_with(&snapshot.store, &filter, &aggregator),
            None => QueryResult::empty(&aggregator),
        };
        debug!("Query selected {} observations", result.observations.len());
        Ok(result)
    }

    /// Aggregates only, without copying the selected observations
    #[instrument(skip(self))]
    pub fn summary(&self, params: &QueryParams) -> Result<Aggregates, QueryError> {
        let snapshot = self.snapshot();
        let aggregator = params.aggregator()?;
        let selection = match params.filter(&snapshot.store)? {
            Some(filter) => filter.apply(&snapshot.store),
            None => Vec::new(),
        };
        Ok(aggregator.summarize(&selection))
    }

    /// Report log rows for the selection, oldest first
    #[instrument(skip(self))]
    pub fn reports(&self, params: &QueryParams) -> Result<Vec<LogEntry>, QueryError> {
        let snapshot = self.snapshot();
        let selection = match params.filter(&snapshot.store)? {
            Some(filter) => filter.apply(&snapshot.store),
            None => Vec::new(),
        };
        Ok(Aggregator::log_entries(&selection))
    }

    /// Chart points for one numeric field over the selection
    #[instrument(skip(self))]
    pub fn series(&self, params: &QueryParams) -> Result<Vec<SeriesPoint>, QueryError> {
        let field = params.series_field()?;
        let snapshot = self.snapshot();
        let selection = match params.filter(&snapshot.store)? {
            Some(filter) => filter.apply(&snapshot.store),
            None => Vec::new(),
        };
        Ok(Aggregator::series(&selection, field))
    }

    pub fn latest(&self, limit: usize) -> Vec<Observation> {
        self.snapshot().store.latest(limit).to_vec()
    }
}
