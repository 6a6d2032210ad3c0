use chrono::NaiveDate;

/// Structurally invalid query arguments
///
/// Malformed data never produces one of these; only a caller breaking
/// the query contract does.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("Hour {0} is outside 0-23")]
    InvalidHour(u32),

    #[error("Invalid hour value: {0}")]
    MalformedHour(String),

    #[error("Hour filter must contain at least one hour")]
    EmptyHourSet,

    #[error("Unknown field: {0}")]
    UnknownField(String),
}
