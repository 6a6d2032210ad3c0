//! Date/hour selection and aggregation over an `ObservationStore`

pub mod aggregator;
pub mod error;
pub mod filter;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

pub use aggregator::{
    Aggregates, Aggregator, CategoryCount, CategoryDistribution, FieldSummary, LogEntry,
    SeriesPoint, WindRoseSector,
};
pub use error::QueryError;
pub use filter::{HourSet, QueryFilter};

use crate::normalize::Observation;
use crate::store::ObservationStore;

/// Filtered observations plus their aggregates
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QueryResult {
    pub observations: Vec<Observation>,
    pub aggregates: Aggregates,
}

impl QueryResult {
    /// "No data": nothing selected, every statistic missing
    pub fn empty(aggregator: &Aggregator) -> Self {
        Self {
            observations: Vec::new(),
            aggregates: aggregator.summarize(&[]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Select by inclusive date range and optional hours, then summarize
/// every field
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use metar_explorer::query::query;
/// use metar_explorer::store::ObservationStore;
///
/// let store = ObservationStore::empty();
/// let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// let result = query(&store, day, day, None).unwrap();
/// assert!(result.is_empty());
/// ```
pub fn query(
    store: &ObservationStore,
    start_date: NaiveDate,
    end_date: NaiveDate,
    hours: Option<HourSet>,
) -> Result<QueryResult, QueryError> {
    let filter = QueryFilter::new(start_date, end_date)?.with_hours(hours);
    Ok(query_with(store, &filter, &Aggregator::default()))
}

pub fn query_with(
    store: &ObservationStore,
    filter: &QueryFilter,
    aggregator: &Aggregator,
) -> QueryResult {
    let selection = filter.apply(store);
    QueryResult {
        aggregates: aggregator.summarize(&selection),
        observations: selection.into_iter().cloned().collect(),
    }
}
