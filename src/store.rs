use chrono::NaiveDate;
use tracing::debug;

use crate::config::NormalizationConfig;
use crate::ingest::RawRecord;
use crate::normalize::Observation;

/// All observations of one load cycle, ordered by timestamp
///
/// Built once and then only read. An empty store is a normal state.
#[derive(Debug, Clone, Default)]
pub struct ObservationStore {
    observations: Vec<Observation>,
}

impl ObservationStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalize raw rows, drop unresolvable ones and sort the rest
    ///
    /// Returns the store and the number of rows dropped for lack of a
    /// usable timestamp.
    pub fn from_records<I>(records: I, config: &NormalizationConfig) -> (Self, usize)
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut dropped = 0;
        let mut observations = Vec::new();

        for (idx, record) in records.into_iter().enumerate() {
            match Observation::from_record(&record, config) {
                Some(obs) => observations.push(obs),
                None => {
                    debug!("Dropping row {}: unresolvable timestamp", idx + 1);
                    dropped += 1;
                }
            }
        }

        (Self::from_observations(observations), dropped)
    }

    /// Stable sort, so rows sharing a timestamp keep their input order
    pub fn from_observations(mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|obs| obs.timestamp);
        Self { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn min_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(Observation::date_only)
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(Observation::date_only)
    }

    /// `(min_date, max_date)`, the valid bounds for a date range query
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.min_date()?, self.max_date()?))
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    /// Observations whose date falls in `[start, end]` (inclusive)
    ///
    /// Uses the sort order; an inverted range yields an empty slice.
    pub fn between_dates(&self, start: NaiveDate, end: NaiveDate) -> &[Observation] {
        let lo = self
            .observations
            .partition_point(|obs| obs.date_only() < start);
        let hi = self
            .observations
            .partition_point(|obs| obs.date_only() <= end);
        if lo >= hi {
            &[]
        } else {
            &self.observations[lo..hi]
        }
    }

    /// The `n` most recent observations, oldest first
    pub fn latest(&self, n: usize) -> &[Observation] {
        let start = self.observations.len().saturating_sub(n);
        &self.observations[start..]
    }
}

impl<'a> IntoIterator for &'a ObservationStore {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}
