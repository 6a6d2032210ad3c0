//! Cell coercion into typed measurement and category values
//!
//! Nothing here fails: a cell with no usable content becomes `None`,
//! never `0` (zero is a real measurement).
use regex::Regex;
use std::sync::LazyLock;

use crate::ingest::CellValue;

/// Leading integer or decimal run, e.g. "12" in "12KT gusting"
static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)").expect("leading number pattern is valid")
});

/// Coerce a cell into a finite number
///
/// # Examples
///
/// ```
/// use metar_explorer::ingest::CellValue;
/// use metar_explorer::normalize::coerce_numeric;
///
/// assert_eq!(coerce_numeric(&CellValue::from("12KT gusting")), Some(12.0));
/// assert_eq!(coerce_numeric(&CellValue::from(" 1013.2 ")), Some(1013.2));
/// assert_eq!(coerce_numeric(&CellValue::from("VRB")), None);
/// assert_eq!(coerce_numeric(&CellValue::Number(0.0)), Some(0.0));
/// ```
pub fn coerce_numeric(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => parse_numeric_text(s),
        CellValue::Empty | CellValue::DateTime(_) => None,
    };
    // NaN/inf never count as measurements
    value.filter(|v| v.is_finite())
}

fn parse_numeric_text(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(v) = trimmed.parse::<f64>() {
        return Some(v);
    }

    LEADING_NUMBER
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Coerce a cell into trimmed category text
///
/// Blank text and the literal `nan` left behind by dataframe exports are
/// treated as absent.
pub fn coerce_text(cell: &CellValue) -> Option<String> {
    let text = cell.to_text()?;
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(coerce_numeric(&CellValue::from("30")), Some(30.0));
        assert_eq!(coerce_numeric(&CellValue::from("-2.5")), Some(-2.5));
        assert_eq!(coerce_numeric(&CellValue::Number(55.0)), Some(55.0));
    }

    #[test]
    fn test_embedded_number_extracted() {
        assert_eq!(coerce_numeric(&CellValue::from("12KT gusting")), Some(12.0));
        assert_eq!(coerce_numeric(&CellValue::from("12KT")), Some(12.0));
        assert_eq!(coerce_numeric(&CellValue::from("9999m")), Some(9999.0));
        assert_eq!(coerce_numeric(&CellValue::from("2500 FT")), Some(2500.0));
        assert_eq!(coerce_numeric(&CellValue::from("7.5 km")), Some(7.5));
    }

    #[test]
    fn test_zero_is_a_value() {
        assert_eq!(coerce_numeric(&CellValue::from("0")), Some(0.0));
        assert_eq!(coerce_numeric(&CellValue::from("00KT")), Some(0.0));
    }

    #[test]
    fn test_unparseable_is_missing() {
        assert_eq!(coerce_numeric(&CellValue::Empty), None);
        assert_eq!(coerce_numeric(&CellValue::from("   ")), None);
        assert_eq!(coerce_numeric(&CellValue::from("VRB")), None);
        assert_eq!(coerce_numeric(&CellValue::from("//")), None);
        assert_eq!(coerce_numeric(&CellValue::from("KT12")), None);
    }

    #[test]
    fn test_non_finite_is_missing() {
        assert_eq!(coerce_numeric(&CellValue::from("NaN")), None);
        assert_eq!(coerce_numeric(&CellValue::from("inf")), None);
        assert_eq!(coerce_numeric(&CellValue::Number(f64::NAN)), None);
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(coerce_text(&CellValue::from(" FEW020 ")).as_deref(), Some("FEW020"));
        assert_eq!(coerce_text(&CellValue::from("nan")), None);
        assert_eq!(coerce_text(&CellValue::Empty), None);
        assert_eq!(coerce_text(&CellValue::Number(10.0)).as_deref(), Some("10"));
    }
}
