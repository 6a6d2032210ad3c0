use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::config::NormalizationConfig;
use crate::ingest::{CellValue, RawRecord};
use crate::normalize::derived::dew_point_c;
use crate::normalize::field_coercer::{coerce_numeric, coerce_text};
use crate::normalize::timestamp_resolver::resolve_timestamp;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One normalized, timestamped weather record
///
/// Built once from a raw row and never changed afterwards. Timestamps are
/// UTC (METAR convention) and carried as naive datetimes.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Observation {
    pub timestamp: NaiveDateTime,

    // Measurements (None = missing, never 0)
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub visibility_m: Option<f64>,
    pub wind_dir_deg: Option<f64>,
    pub wind_speed_kt: Option<f64>,
    pub cloud_base_ft: Option<f64>,

    // Categories, defaulted when absent
    pub sky_conditions: String,
    pub present_weather: String,

    /// Derived from temperature and humidity at normalization time
    pub dew_point_c: Option<f64>,

    /// Original report text, verbatim
    pub raw_report_text: String,
}

impl Observation {
    /// Normalize one raw row; `None` when the timestamp is unresolvable
    pub fn from_record(record: &RawRecord, config: &NormalizationConfig) -> Option<Self> {
        let columns = &config.columns;
        let cell = |column: &str| record.get(column).unwrap_or(&EMPTY_CELL);
        let number = |column: &str| coerce_numeric(cell(column));

        let timestamp = resolve_timestamp(cell(&columns.date), cell(&columns.time))?;

        let temperature_c = number(&columns.temperature);
        let humidity_pct = number(&columns.humidity);

        let defaults = &config.categorical_defaults;
        let sky_conditions = coerce_text(cell(&columns.sky_conditions))
            .unwrap_or_else(|| defaults.sky_conditions.clone());
        let present_weather = coerce_text(cell(&columns.present_weather))
            .unwrap_or_else(|| defaults.present_weather.clone());

        Some(Self {
            timestamp,
            temperature_c,
            humidity_pct,
            pressure_hpa: number(&columns.pressure),
            visibility_m: number(&columns.visibility),
            wind_dir_deg: number(&columns.wind_direction),
            wind_speed_kt: number(&columns.wind_speed),
            cloud_base_ft: number(&columns.cloud_base),
            sky_conditions,
            present_weather,
            dew_point_c: dew_point_c(temperature_c, humidity_pct),
            raw_report_text: cell(&columns.raw_report).to_text().unwrap_or_default(),
        })
    }

    pub fn date_only(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn hour_of_day(&self) -> u32 {
        self.timestamp.hour()
    }

    pub fn numeric(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::Temperature => self.temperature_c,
            NumericField::Humidity => self.humidity_pct,
            NumericField::Pressure => self.pressure_hpa,
            NumericField::Visibility => self.visibility_m,
            NumericField::WindDirection => self.wind_dir_deg,
            NumericField::WindSpeed => self.wind_speed_kt,
            NumericField::CloudBase => self.cloud_base_ft,
            NumericField::DewPoint => self.dew_point_c,
        }
    }

    pub fn categorical(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::SkyConditions => &self.sky_conditions,
            CategoricalField::PresentWeather => &self.present_weather,
        }
    }
}

/// Numeric fields that can be summarized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum NumericField {
    #[serde(rename = "temperature_c")]
    Temperature,
    #[serde(rename = "humidity_pct")]
    Humidity,
    #[serde(rename = "pressure_hpa")]
    Pressure,
    #[serde(rename = "visibility_m")]
    Visibility,
    #[serde(rename = "wind_dir_deg")]
    WindDirection,
    #[serde(rename = "wind_speed_kt")]
    WindSpeed,
    #[serde(rename = "cloud_base_ft")]
    CloudBase,
    #[serde(rename = "dew_point_c")]
    DewPoint,
}

impl NumericField {
    pub const ALL: [NumericField; 8] = [
        NumericField::Temperature,
        NumericField::Humidity,
        NumericField::Pressure,
        NumericField::Visibility,
        NumericField::WindDirection,
        NumericField::WindSpeed,
        NumericField::CloudBase,
        NumericField::DewPoint,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NumericField::Temperature => "temperature_c",
            NumericField::Humidity => "humidity_pct",
            NumericField::Pressure => "pressure_hpa",
            NumericField::Visibility => "visibility_m",
            NumericField::WindDirection => "wind_dir_deg",
            NumericField::WindSpeed => "wind_speed_kt",
            NumericField::CloudBase => "cloud_base_ft",
            NumericField::DewPoint => "dew_point_c",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumericField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        NumericField::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| wanted.to_string())
    }
}

/// Categorical text fields that can be counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    SkyConditions,
    PresentWeather,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 2] =
        [CategoricalField::SkyConditions, CategoricalField::PresentWeather];
}
