use std::env;
use std::path::PathBuf;

use crate::ingest::DataSource;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub sheet_name: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub normalization: NormalizationConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            data_path: env::var("DATA_PATH")
                .map(PathBuf::from)
                .map_err(|_| ConfigError::MissingVar("DATA_PATH"))?,
            sheet_name: env::var("SHEET_NAME").ok().filter(|s| !s.trim().is_empty()),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            normalization: NormalizationConfig::from_env()?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn data_source(&self) -> DataSource {
        let source = DataSource::new(&self.data_path);
        match &self.sheet_name {
            Some(sheet) => source.with_sheet(sheet.clone()),
            None => source,
        }
    }
}

/// Everything that shapes how raw rows become observations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationConfig {
    pub columns: ColumnMap,
    pub categorical_defaults: CategoricalDefaults,
}

impl NormalizationConfig {
    /// Defaults, with `CATEGORICAL_DEFAULTS`, `DEFAULT_*` and `COLUMN_*` overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let preset = match env::var("CATEGORICAL_DEFAULTS") {
            Ok(preset) => CategoricalDefaults::preset(&preset).ok_or(ConfigError::InvalidValue {
                var: "CATEGORICAL_DEFAULTS",
                value: preset,
            })?,
            Err(_) => CategoricalDefaults::default(),
        };
        Ok(Self::from_env_with_preset(preset))
    }

    /// Start from `preset` instead of `CATEGORICAL_DEFAULTS`; the
    /// `DEFAULT_*` and `COLUMN_*` overrides still apply on top
    pub fn from_env_with_preset(preset: CategoricalDefaults) -> Self {
        let mut categorical_defaults = preset;
        if let Ok(sky) = env::var("DEFAULT_SKY_CONDITIONS") {
            categorical_defaults.sky_conditions = sky;
        }
        if let Ok(weather) = env::var("DEFAULT_PRESENT_WEATHER") {
            categorical_defaults.present_weather = weather;
        }

        let mut columns = ColumnMap::default();
        for (var, slot) in columns.slots_mut() {
            if let Ok(name) = env::var(var) {
                let name = name.trim();
                if !name.is_empty() {
                    *slot = name.to_string();
                }
            }
        }

        Self {
            columns,
            categorical_defaults,
        }
    }
}

/// Source column name for each observation field
///
/// Matching is exact against the trimmed header. A column the sheet does
/// not have simply yields missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    pub date: String,
    pub time: String,
    pub temperature: String,
    pub humidity: String,
    pub pressure: String,
    pub visibility: String,
    pub wind_direction: String,
    pub wind_speed: String,
    pub cloud_base: String,
    pub sky_conditions: String,
    pub present_weather: String,
    pub raw_report: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            time: "UTC".to_string(),
            temperature: "Temp C".to_string(),
            humidity: "Humidity %".to_string(),
            pressure: "Pressure hPa".to_string(),
            visibility: "Visibility M".to_string(),
            wind_direction: "Wind Dir".to_string(),
            wind_speed: "Wind Spd KT".to_string(),
            cloud_base: "Lowest Cloud Base FT".to_string(),
            sky_conditions: "Sky Conditions".to_string(),
            present_weather: "Present Weather".to_string(),
            raw_report: "METAR".to_string(),
        }
    }
}

impl ColumnMap {
    fn slots_mut(&mut self) -> [(&'static str, &mut String); 12] {
        [
            ("COLUMN_DATE", &mut self.date),
            ("COLUMN_TIME", &mut self.time),
            ("COLUMN_TEMPERATURE", &mut self.temperature),
            ("COLUMN_HUMIDITY", &mut self.humidity),
            ("COLUMN_PRESSURE", &mut self.pressure),
            ("COLUMN_VISIBILITY", &mut self.visibility),
            ("COLUMN_WIND_DIRECTION", &mut self.wind_direction),
            ("COLUMN_WIND_SPEED", &mut self.wind_speed),
            ("COLUMN_CLOUD_BASE", &mut self.cloud_base),
            ("COLUMN_SKY_CONDITIONS", &mut self.sky_conditions),
            ("COLUMN_PRESENT_WEATHER", &mut self.present_weather),
            ("COLUMN_RAW_REPORT", &mut self.raw_report),
        ]
    }

    /// All configured names, in field order
    pub fn names(&self) -> [&str; 12] {
        [
            &self.date,
            &self.time,
            &self.temperature,
            &self.humidity,
            &self.pressure,
            &self.visibility,
            &self.wind_direction,
            &self.wind_speed,
            &self.cloud_base,
            &self.sky_conditions,
            &self.present_weather,
            &self.raw_report,
        ]
    }
}

/// Substitutes for absent categorical values
///
/// Report sheets in circulation disagree on these ("SKC", "Unknown",
/// "NIL", ...), so the table is chosen explicitly rather than hard-coded.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalDefaults {
    pub sky_conditions: String,
    pub present_weather: String,
}

impl CategoricalDefaults {
    /// Plain-language defaults, used unless configured otherwise
    pub fn descriptive() -> Self {
        Self {
            sky_conditions: "clear skies".to_string(),
            present_weather: "no significant weather".to_string(),
        }
    }

    /// METAR code style: sky clear / nil weather
    pub fn metar_codes() -> Self {
        Self {
            sky_conditions: "SKC".to_string(),
            present_weather: "NIL".to_string(),
        }
    }

    pub fn unknown() -> Self {
        Self {
            sky_conditions: "Unknown".to_string(),
            present_weather: "Unknown".to_string(),
        }
    }

    /// Look up a preset by name: `descriptive`, `metar` or `unknown`
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "descriptive" => Some(Self::descriptive()),
            "metar" | "metar_codes" => Some(Self::metar_codes()),
            "unknown" => Some(Self::unknown()),
            _ => None,
        }
    }
}

impl Default for CategoricalDefaults {
    fn default() -> Self {
        Self::descriptive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(CategoricalDefaults::preset("METAR"), Some(CategoricalDefaults::metar_codes()));
        assert_eq!(CategoricalDefaults::preset(" unknown "), Some(CategoricalDefaults::unknown()));
        assert_eq!(CategoricalDefaults::preset("nope"), None);
        assert_eq!(CategoricalDefaults::default().sky_conditions, "clear skies");
    }

    #[test]
    fn test_default_column_names() {
        let columns = ColumnMap::default();
        assert_eq!(columns.date, "Date");
        assert_eq!(columns.time, "UTC");
        assert_eq!(columns.wind_speed, "Wind Spd KT");
        assert_eq!(columns.names().len(), 12);
    }
}
