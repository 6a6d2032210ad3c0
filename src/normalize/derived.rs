//! Physically derived quantities

/// Magnus coefficient `a` (dimensionless)
pub const MAGNUS_A: f64 = 17.67;
/// Magnus coefficient `b` (°C)
pub const MAGNUS_B: f64 = 243.5;

/// Dew point in °C from air temperature (°C) and relative humidity (%)
///
/// Magnus-form approximation:
/// `γ = a·T/(b+T) + ln(RH/100)`, `Td = b·γ/(a−γ)`.
///
/// Returns `None` without evaluating the formula when either input is
/// missing or humidity is not positive.
///
/// # Examples
///
/// ```
/// use metar_explorer::normalize::dew_point_c;
///
/// let dp = dew_point_c(Some(30.0), Some(55.0)).unwrap();
/// assert!((dp - 20.0).abs() < 0.1);
/// assert_eq!(dew_point_c(Some(30.0), Some(0.0)), None);
/// assert_eq!(dew_point_c(None, Some(55.0)), None);
/// ```
pub fn dew_point_c(temperature_c: Option<f64>, humidity_pct: Option<f64>) -> Option<f64> {
    let t = temperature_c?;
    let rh = humidity_pct?;
    if rh <= 0.0 {
        return None;
    }

    let gamma = (MAGNUS_A * t) / (MAGNUS_B + t) + (rh / 100.0).ln();
    let dew_point = (MAGNUS_B * gamma) / (MAGNUS_A - gamma);
    dew_point.is_finite().then_some(dew_point)
}
