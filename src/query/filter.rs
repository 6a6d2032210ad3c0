use chrono::NaiveDate;

use crate::normalize::Observation;
use crate::query::error::QueryError;
use crate::store::ObservationStore;

/// Non-empty set of UTC hours of day (0-23)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourSet {
    hours: [bool; 24],
}

impl HourSet {
    pub fn new<I>(hours: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut set = [false; 24];
        for hour in hours {
            if hour > 23 {
                return Err(QueryError::InvalidHour(hour));
            }
            set[hour as usize] = true;
        }

        if !set.contains(&true) {
            return Err(QueryError::EmptyHourSet);
        }
        Ok(Self { hours: set })
    }

    /// Parse a comma separated list such as `"0,6,12,18"`
    ///
    /// A blank list means no hour filter and yields `Ok(None)`.
    pub fn parse_list(list: &str) -> Result<Option<Self>, QueryError> {
        let parts: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            return Ok(None);
        }

        let hours = parts
            .into_iter()
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| QueryError::MalformedHour(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(hours).map(Some)
    }

    pub fn contains(&self, hour: u32) -> bool {
        self.hours.get(hour as usize).copied().unwrap_or(false)
    }

    /// Member hours in ascending order
    pub fn hours(&self) -> Vec<u32> {
        (0..24).filter(|&h| self.hours[h as usize]).collect()
    }
}

/// Inclusive date range plus an optional hour-of-day restriction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    start_date: NaiveDate,
    end_date: NaiveDate,
    hours: Option<HourSet>,
}

impl QueryFilter {
    /// The range is never swapped; callers correct inverted input first
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, QueryError> {
        if start_date > end_date {
            return Err(QueryError::InvertedRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            start_date,
            end_date,
            hours: None,
        })
    }

    pub fn with_hours(mut self, hours: Option<HourSet>) -> Self {
        self.hours = hours;
        self
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn hours(&self) -> Option<&HourSet> {
        self.hours.as_ref()
    }

    pub fn matches(&self, obs: &Observation) -> bool {
        let date = obs.date_only();
        date >= self.start_date && date <= self.end_date && self.hour_matches(obs)
    }

    fn hour_matches(&self, obs: &Observation) -> bool {
        self.hours
            .as_ref()
            .is_none_or(|hours| hours.contains(obs.hour_of_day()))
    }

    /// Matching observations in timestamp order
    pub fn apply<'a>(&self, store: &'a ObservationStore) -> Vec<&'a Observation> {
        store
            .between_dates(self.start_date, self.end_date)
            .iter()
            .filter(|obs| self.hour_matches(obs))
            .collect()
    }
}
