//! Timestamp construction from separate date and time-of-day cells
//!
//! Both cells may arrive pre-typed by the spreadsheet or as free text.
//! Anything that cannot be read as a real calendar date and a real time
//! of day resolves to `None`, and the row is dropped by the caller.
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::ingest::CellValue;

/// Day-first formats are tried after the ISO ones, so "01/05/2024" is 1 May
const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d %b %Y",
    "%d-%b-%Y", "%b %d, %Y",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const TIME_FORMATS: [&str; 3] = ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"];

/// Plausible observation years; guards serial numbers and two-digit years
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Combine a date cell and a time-of-day cell into one UTC timestamp
///
/// # Examples
///
/// ```
/// use metar_explorer::ingest::CellValue;
/// use metar_explorer::normalize::resolve_timestamp;
///
/// let ts = resolve_timestamp(&CellValue::from("2024-01-05"), &CellValue::from("0600")).unwrap();
/// assert_eq!(ts.to_string(), "2024-01-05 06:00:00");
///
/// assert!(resolve_timestamp(&CellValue::from("2024-01-05"), &CellValue::from("garbled")).is_none());
/// ```
pub fn resolve_timestamp(date: &CellValue, time: &CellValue) -> Option<NaiveDateTime> {
    let date = resolve_date(date)?;
    let time = resolve_time(time)?;
    Some(date.and_time(time))
}

/// Normalize a date cell to a calendar date
pub fn resolve_date(cell: &CellValue) -> Option<NaiveDate> {
    let date = match cell {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Number(n) => compact_date_number(*n).or_else(|| excel_serial_to_date(*n)),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Empty => None,
    }?;
    plausible(date)
}

/// Normalize a time-of-day cell to hours and minutes within a day
pub fn resolve_time(cell: &CellValue) -> Option<NaiveTime> {
    match cell {
        CellValue::DateTime(dt) => Some(dt.time()),
        CellValue::Number(n) => time_from_number(*n),
        CellValue::Text(s) => parse_time_text(s),
        CellValue::Empty => None,
    }
}

/// Convert a spreadsheet date serial to a date
///
/// Epoch is 1899-12-30 (absorbs the 1900 leap year bug); any fractional
/// time-of-day part is discarded.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::try_days(serial.trunc() as i64)?)
}

/// A yyyymmdd date typed into a numeric cell, e.g. 20240105
fn compact_date_number(n: f64) -> Option<NaiveDate> {
    if n.fract() != 0.0 || !(10_000_000.0..100_000_000.0).contains(&n) {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{}", n as u32), "%Y%m%d").ok()
}

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (MIN_YEAR..=MAX_YEAR).contains(&date.year()).then_some(date)
}

fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok().and_then(plausible))
        .or_else(|| {
            // "2024-01-05 00:00:00" as written by dataframe exports
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn parse_time_text(raw: &str) -> Option<NaiveTime> {
    let trimmed = strip_zone_suffix(raw.trim());
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.len() <= 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return hhmm(trimmed.parse().ok()?);
    }

    if trimmed.contains(':') {
        return TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok());
    }

    // "600.0" from float columns, or a day fraction such as "0.25"
    trimmed.parse::<f64>().ok().and_then(time_from_number)
}

fn strip_zone_suffix(value: &str) -> &str {
    let upper = value.to_ascii_uppercase();
    if upper.ends_with("UTC") {
        value[..value.len() - 3].trim_end()
    } else if upper.ends_with('Z') {
        value[..value.len() - 1].trim_end()
    } else {
        value
    }
}

/// Whole numbers are HHMM (leading zeros lost: 600 is 06:00); fractions
/// below one are a portion of a day, the spreadsheet time encoding.
fn time_from_number(n: f64) -> Option<NaiveTime> {
    if !n.is_finite() || n < 0.0 {
        return None;
    }

    if n.fract() == 0.0 {
        if n > 2359.0 {
            return None;
        }
        hhmm(n as u32)
    } else if n < 1.0 {
        let seconds = (n * SECONDS_PER_DAY).round() as u32;
        NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
    } else {
        None
    }
}

fn hhmm(value: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(value / 100, value % 100, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_resolve_iso_date_and_hhmm() {
        let ts = resolve_timestamp(&CellValue::from("2024-01-05"), &CellValue::from("0600"));
        assert_eq!(ts, Some(date(2024, 1, 5).and_time(time(6, 0))));
    }

    #[test]
    fn test_date_formats() {
        let expected = Some(date(2024, 1, 5));
        for text in [
            "2024-01-05",
            "2024/01/05",
            "20240105",
            "05/01/2024",
            "05-01-2024",
            "05.01.2024",
            "05 Jan 2024",
            "2024-01-05 00:00:00",
            "2024-01-05T00:00:00",
            " 2024-01-05 ",
        ] {
            assert_eq!(resolve_date(&CellValue::from(text)), expected, "{text}");
        }
    }

    #[test]
    fn test_pre_typed_date_cell() {
        let dt = date(2024, 1, 5).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(resolve_date(&CellValue::DateTime(dt)), Some(date(2024, 1, 5)));
    }

    #[test]
    fn test_excel_serial_date() {
        // 45296 = 2024-01-05
        assert_eq!(resolve_date(&CellValue::Number(45296.0)), Some(date(2024, 1, 5)));
        assert_eq!(resolve_date(&CellValue::Number(45296.75)), Some(date(2024, 1, 5)));
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(-3.0), None);
    }

    #[test]
    fn test_compact_numeric_date() {
        assert_eq!(resolve_date(&CellValue::Number(20240105.0)), Some(date(2024, 1, 5)));
        assert_eq!(
            resolve_timestamp(&CellValue::Number(20240105.0), &CellValue::Number(600.0)),
            Some(date(2024, 1, 5).and_time(time(6, 0)))
        );
        // Not a calendar date, and far too large for a serial
        assert_eq!(resolve_date(&CellValue::Number(20241305.0)), None);
    }

    #[test]
    fn test_invalid_dates() {
        assert_eq!(resolve_date(&CellValue::from("2024-02-30")), None);
        assert_eq!(resolve_date(&CellValue::from("not a date")), None);
        assert_eq!(resolve_date(&CellValue::Empty), None);
        // Two-digit year parses as year 24 and is rejected
        assert_eq!(resolve_date(&CellValue::from("05/01/24")), None);
        assert_eq!(resolve_date(&CellValue::Number(1e12)), None);
    }

    #[test]
    fn test_time_text_formats() {
        assert_eq!(resolve_time(&CellValue::from("0600")), Some(time(6, 0)));
        assert_eq!(resolve_time(&CellValue::from("06:30")), Some(time(6, 30)));
        assert_eq!(resolve_time(&CellValue::from("06:30:00")), Some(time(6, 30)));
        assert_eq!(resolve_time(&CellValue::from("0600Z")), Some(time(6, 0)));
        assert_eq!(resolve_time(&CellValue::from("0600 UTC")), Some(time(6, 0)));
        assert_eq!(resolve_time(&CellValue::from("600")), Some(time(6, 0)));
        assert_eq!(resolve_time(&CellValue::from("0")), Some(time(0, 0)));
        assert_eq!(resolve_time(&CellValue::from("600.0")), Some(time(6, 0)));
    }

    #[test]
    fn test_time_numeric_cells() {
        assert_eq!(resolve_time(&CellValue::Number(600.0)), Some(time(6, 0)));
        assert_eq!(resolve_time(&CellValue::Number(2330.0)), Some(time(23, 30)));
        assert_eq!(resolve_time(&CellValue::Number(0.25)), Some(time(6, 0)));
        assert_eq!(resolve_time(&CellValue::Number(0.0)), Some(time(0, 0)));
    }

    #[test]
    fn test_invalid_times() {
        assert_eq!(resolve_time(&CellValue::from("garbled")), None);
        assert_eq!(resolve_time(&CellValue::from("2460")), None);
        assert_eq!(resolve_time(&CellValue::from("0675")), None);
        assert_eq!(resolve_time(&CellValue::from("25:00")), None);
        assert_eq!(resolve_time(&CellValue::Number(2400.0)), None);
        assert_eq!(resolve_time(&CellValue::Number(-5.0)), None);
        assert_eq!(resolve_time(&CellValue::Number(12.5)), None);
        assert_eq!(resolve_time(&CellValue::Empty), None);
        assert_eq!(resolve_time(&CellValue::from("Z")), None);
    }

    #[test]
    fn test_unresolvable_when_either_part_fails() {
        assert!(resolve_timestamp(&CellValue::from("bad"), &CellValue::from("0600")).is_none());
        assert!(resolve_timestamp(&CellValue::from("2024-01-05"), &CellValue::Empty).is_none());
    }
}
