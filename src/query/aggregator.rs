use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::normalize::{CategoricalField, NumericField, Observation};

/// Timestamp format handed to the presentation layer for log tables
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];
const SECTOR_WIDTH_DEG: f64 = 22.5;

/// Mean/min/max of one numeric field, ignoring missing values
///
/// All three are `None` when the field has no values in the selection.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldSummary {
    pub field: NumericField,
    /// Number of observations with a value for this field
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

/// Frequency table for one categorical field, most frequent first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoryDistribution {
    pub field: CategoricalField,
    pub counts: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WindRoseSector {
    pub sector: String,
    pub center_deg: f64,
    pub count: usize,
    pub mean_speed_kt: Option<f64>,
}

/// One row of the report log: formatted time plus the verbatim report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LogEntry {
    pub display_timestamp: String,
    pub raw_report_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Aggregates {
    pub observation_count: usize,
    pub fields: Vec<FieldSummary>,
    pub categories: Vec<CategoryDistribution>,
    pub wind_rose: Vec<WindRoseSector>,
}

impl Aggregates {
    pub fn field(&self, field: NumericField) -> Option<&FieldSummary> {
        self.fields.iter().find(|summary| summary.field == field)
    }

    pub fn category(&self, field: CategoricalField) -> Option<&CategoryDistribution> {
        self.categories.iter().find(|dist| dist.field == field)
    }
}

/// Reduces a filtered selection into statistics and display projections
///
/// Pure: the same selection always gives the same result.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregator {
    numeric_fields: Vec<NumericField>,
    categorical_fields: Vec<CategoricalField>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(NumericField::ALL.to_vec(), CategoricalField::ALL.to_vec())
    }
}

impl Aggregator {
    pub fn new(numeric_fields: Vec<NumericField>, categorical_fields: Vec<CategoricalField>) -> Self {
        Self {
            numeric_fields,
            categorical_fields,
        }
    }

    pub fn numeric_fields(&self) -> &[NumericField] {
        &self.numeric_fields
    }

    pub fn summarize(&self, observations: &[&Observation]) -> Aggregates {
        Aggregates {
            observation_count: observations.len(),
            fields: self
                .numeric_fields
                .iter()
                .map(|&field| Self::field_summary(observations, field))
                .collect(),
            categories: self
                .categorical_fields
                .iter()
                .map(|&field| Self::category_counts(observations, field))
                .collect(),
            wind_rose: Self::wind_rose(observations),
        }
    }

    pub fn field_summary(observations: &[&Observation], field: NumericField) -> FieldSummary {
        let mut count = 0;
        let mut sum = 0.0;
        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;

        for value in observations.iter().filter_map(|obs| obs.numeric(field)) {
            count += 1;
            sum += value;
            min = Some(min.map_or(value, |m| m.min(value)));
            max = Some(max.map_or(value, |m| m.max(value)));
        }

        let mean = (count > 0).then(|| normalize_zero(sum / count as f64));

        FieldSummary {
            field,
            count,
            mean,
            min,
            max,
        }
    }

    pub fn category_counts(
        observations: &[&Observation],
        field: CategoricalField,
    ) -> CategoryDistribution {
        let mut tally: HashMap<&str, usize> = HashMap::new();
        for obs in observations {
            *tally.entry(obs.categorical(field)).or_insert(0) += 1;
        }

        let mut counts: Vec<CategoryCount> = tally
            .into_iter()
            .map(|(value, count)| CategoryCount {
                value: value.to_string(),
                count,
            })
            .collect();
        // Ties broken by name so the order never depends on hashing
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

        CategoryDistribution { field, counts }
    }

    /// Sixteen compass sectors, always in N..NNW order
    ///
    /// Observations without a direction, or calm (0 kt), are not counted.
    pub fn wind_rose(observations: &[&Observation]) -> Vec<WindRoseSector> {
        let mut counts = [0usize; 16];
        let mut speed_sums = [0.0f64; 16];
        let mut speed_counts = [0usize; 16];

        for obs in observations {
            let Some(direction) = obs.wind_dir_deg else {
                continue;
            };
            if obs.wind_speed_kt == Some(0.0) {
                continue;
            }

            let sector = sector_index(direction);
            counts[sector] += 1;
            if let Some(speed) = obs.wind_speed_kt {
                speed_sums[sector] += speed;
                speed_counts[sector] += 1;
            }
        }

        COMPASS_POINTS
            .iter()
            .enumerate()
            .map(|(idx, name)| WindRoseSector {
                sector: name.to_string(),
                center_deg: idx as f64 * SECTOR_WIDTH_DEG,
                count: counts[idx],
                mean_speed_kt: (speed_counts[idx] > 0)
                    .then(|| speed_sums[idx] / speed_counts[idx] as f64),
            })
            .collect()
    }

    pub fn log_entries(observations: &[&Observation]) -> Vec<LogEntry> {
        observations
            .iter()
            .map(|obs| LogEntry {
                display_timestamp: obs.timestamp.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
                raw_report_text: obs.raw_report_text.clone(),
            })
            .collect()
    }

    /// `(timestamp, value)` pairs for charting, skipping missing values
    pub fn series(observations: &[&Observation], field: NumericField) -> Vec<SeriesPoint> {
        observations
            .iter()
            .filter_map(|obs| {
                obs.numeric(field).map(|value| SeriesPoint {
                    timestamp: obs.timestamp,
                    value,
                })
            })
            .collect()
    }
}

fn sector_index(direction_deg: f64) -> usize {
    let normalized = direction_deg.rem_euclid(360.0);
    ((normalized + SECTOR_WIDTH_DEG / 2.0) / SECTOR_WIDTH_DEG).floor() as usize % 16
}

/// Normalize -0.0 to 0.0 for cleaner API responses
fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}
