// Load operation tests: reading report files end to end
// Covers source failures, row drops and field-level coercion

mod common;

use chrono::NaiveDate;
use metar_explorer::config::{CategoricalDefaults, NormalizationConfig};
use metar_explorer::ingest::DataSource;
use metar_explorer::loader::{load, LoadOutcome};
use metar_explorer::normalize::dew_point_c;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_load_report_counts() {
    let (_dir, path) = common::report_csv();
    let outcome = load(&DataSource::new(&path), &NormalizationConfig::default());

    let report = outcome.report().expect("Expected a successful load").clone();
    assert_eq!(report.total_rows, 7);
    assert_eq!(report.rows_loaded, 5);
    assert_eq!(report.rows_dropped, 2);
    assert_eq!(report.rows_unreadable, 0);
    assert_eq!(report.columns_found.len(), 12);
    assert!(report.columns_missing.is_empty());
    assert_eq!(report.columns_found[0], "Date");
}

#[test]
fn test_loaded_store_is_sorted_with_valid_timestamps() {
    let (_dir, path) = common::report_csv();
    let store = load(&DataSource::new(&path), &NormalizationConfig::default()).into_store();

    assert_eq!(store.len(), 5);
    assert!(store
        .as_slice()
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp));
    assert_eq!(store.min_date(), Some(date(2024, 1, 4)));
    assert_eq!(store.max_date(), Some(date(2024, 1, 6)));
}

#[test]
fn test_example_row_normalization() {
    let (_dir, path) = common::report_csv();
    let store = load(&DataSource::new(&path), &NormalizationConfig::default()).into_store();

    let obs = store
        .iter()
        .find(|o| o.timestamp == date(2024, 1, 5).and_hms_opt(6, 0, 0).unwrap())
        .expect("Expected the 0600 observation");
    assert_eq!(obs.temperature_c, Some(30.0));
    assert_eq!(obs.humidity_pct, Some(55.0));
    assert_eq!(obs.wind_speed_kt, Some(12.0));
    assert_eq!(obs.cloud_base_ft, Some(2000.0));
    assert!((obs.dew_point_c.unwrap() - 20.0).abs() < 0.1);
    assert_eq!(
        obs.raw_report_text,
        "OYAA 050600Z 18012KT 9999 FEW020 30/20 Q1008"
    );
}

#[test]
fn test_dew_point_missing_exactly_when_inputs_invalid() {
    let (_dir, path) = common::report_csv();
    let store = load(&DataSource::new(&path), &NormalizationConfig::default()).into_store();

    for obs in &store {
        let expected_missing = obs.temperature_c.is_none()
            || obs.humidity_pct.is_none()
            || obs.humidity_pct.is_some_and(|rh| rh <= 0.0);
        assert_eq!(obs.dew_point_c.is_none(), expected_missing, "{obs:?}");
        assert_eq!(obs.dew_point_c, dew_point_c(obs.temperature_c, obs.humidity_pct));
    }

    let zero_humidity = store
        .iter()
        .find(|o| o.humidity_pct == Some(0.0))
        .expect("Expected the zero humidity row");
    assert_eq!(zero_humidity.temperature_c, Some(28.0));
    assert_eq!(zero_humidity.dew_point_c, None);
    // "VRB" has no numeric content
    assert_eq!(zero_humidity.wind_dir_deg, None);
}

#[test]
fn test_categorical_defaults_applied() {
    let (_dir, path) = common::report_csv();
    let store = load(&DataSource::new(&path), &NormalizationConfig::default()).into_store();
    let midnight = store
        .iter()
        .find(|o| o.hour_of_day() == 0)
        .expect("Expected the 0000 observation");
    assert_eq!(midnight.sky_conditions, "clear skies");
    assert_eq!(midnight.present_weather, "no significant weather");

    let config = NormalizationConfig {
        categorical_defaults: CategoricalDefaults::metar_codes(),
        ..Default::default()
    };
    let store = load(&DataSource::new(&path), &config).into_store();
    let midnight = store.iter().find(|o| o.hour_of_day() == 0).unwrap();
    assert_eq!(midnight.sky_conditions, "SKC");
    assert_eq!(midnight.present_weather, "NIL");
}

#[test]
fn test_absent_columns_behave_as_missing() {
    let (_dir, path) = common::write_fixture(
        "minimal.csv",
        "Date,UTC,Temp C\n2024-01-05,0600,30\n2024-01-05,0700,\n",
    );
    let outcome = load(&DataSource::new(&path), &NormalizationConfig::default());

    let report = outcome.report().unwrap();
    assert!(report.columns_missing.contains(&"Humidity %".to_string()));
    assert!(report.columns_missing.contains(&"METAR".to_string()));

    let store = outcome.into_store();
    assert_eq!(store.len(), 2);
    assert!(store.iter().all(|o| o.humidity_pct.is_none() && o.dew_point_c.is_none()));
    assert_eq!(store.as_slice()[1].temperature_c, None);
}

#[test]
fn test_header_only_source_is_empty_not_failed() {
    let (_dir, path) = common::write_fixture("empty.csv", &format!("{}\n", common::REPORT_HEADER));
    let outcome = load(&DataSource::new(&path), &NormalizationConfig::default());

    assert!(outcome.is_loaded());
    assert!(outcome.into_store().is_empty());
}

#[test]
fn test_all_rows_dropped_is_empty_not_failed() {
    let (_dir, path) = common::write_fixture(
        "garbled.csv",
        "Date,UTC,Temp C\nyesterday,0600,30\n2024-01-05,noon,31\n",
    );
    let outcome = load(&DataSource::new(&path), &NormalizationConfig::default());

    assert_eq!(outcome.report().unwrap().rows_dropped, 2);
    assert!(outcome.into_store().is_empty());
}

#[test]
fn test_missing_file_fails_with_reason() {
    let outcome = load(
        &DataSource::new("/nonexistent/report.csv"),
        &NormalizationConfig::default(),
    );
    match outcome {
        LoadOutcome::Failed { reason } => assert!(reason.contains("CSV")),
        LoadOutcome::Loaded { .. } => panic!("Expected a failed load"),
    }
}

#[test]
fn test_corrupt_workbook_fails_with_reason() {
    let (_dir, path) = common::write_fixture("report.xlsx", "this is not a zip archive");
    let outcome = load(&DataSource::new(&path), &NormalizationConfig::default());

    assert!(!outcome.is_loaded());
    assert!(outcome
        .failure_reason()
        .unwrap()
        .contains("Failed to open workbook"));
}

#[test]
fn test_column_names_are_trimmed() {
    let (_dir, path) = common::write_fixture(
        "padded.csv",
        " Date ,  UTC , Temp C \n2024-01-05,0600,30\n",
    );
    let store = load(&DataSource::new(&path), &NormalizationConfig::default()).into_store();
    assert_eq!(store.len(), 1);
    assert_eq!(store.as_slice()[0].temperature_c, Some(30.0));
}
