//! End-to-end pipeline tests: artifacts written to disk, loaded through
//! the loader, and run through the forecast engine.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use aqi_forecast::{models, preprocessing, render, AppError, City, CityArtifacts};

struct TempDataDir {
    path: PathBuf,
}

impl TempDataDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "aqi_forecast_it_{}_{}",
            std::process::id(),
            name
        ));
        fs::create_dir_all(&path).unwrap();
        Self { path }
    }
}

impl Drop for TempDataDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Single-step echo model: predicts the newest window value.
fn write_model(dir: &TempDataDir, city_tag: &str) {
    let mut row = vec![0.0; 14];
    row[13] = 1.0;
    let artifact = serde_json::json!({
        "city": city_tag,
        "capability": "single_step",
        "window": 14,
        "weights": [row],
        "bias": [0.0],
    });
    fs::write(
        dir.path.join(format!("lstm_{city_tag}.json")),
        serde_json::to_string_pretty(&artifact).unwrap(),
    )
    .unwrap();
}

fn write_scaler(dir: &TempDataDir, file_tag: &str, city_tag: &str) {
    let artifact = serde_json::json!({
        "city": city_tag,
        "data_min": 0.0,
        "data_max": 500.0,
    });
    fs::write(
        dir.path.join(format!("scaler_{file_tag}.json")),
        serde_json::to_string(&artifact).unwrap(),
    )
    .unwrap();
}

/// 20 daily readings ending 12/31/2023 with AQI 120 on the last day.
fn write_history(dir: &TempDataDir, city_tag: &str) {
    let mut csv = String::from("date,AQI,PM2.5\n");
    let last = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    for i in (0..20).rev() {
        let date = last - chrono::Duration::days(i);
        let aqi = if i == 0 { 120.0 } else { 100.0 + i as f64 };
        csv.push_str(&format!("{},{},{}\n", date.format("%m/%d/%Y"), aqi, 55));
    }
    fs::write(dir.path.join(format!("{city_tag}_aqi.csv")), csv).unwrap();
}

#[test]
fn full_pipeline_forecasts_the_next_seven_days() {
    let dir = TempDataDir::new("full_pipeline");
    write_model(&dir, "delhi");
    write_scaler(&dir, "delhi", "delhi");
    write_history(&dir, "delhi");

    let artifacts = CityArtifacts::load(City::Delhi, &dir.path).unwrap();
    assert_eq!(artifacts.history.len(), 20);

    let rows = models::forecast(&artifacts.model, &artifacts.scaler, &artifacts.history).unwrap();
    assert_eq!(rows.len(), 7);

    let expected: Vec<NaiveDate> = (1..=7)
        .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
        .collect();
    let got: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
    assert_eq!(got, expected);

    // echo model repeats the last reading; 120 sits in the Moderate band
    for row in &rows {
        assert!((row.predicted_aqi - 120.0).abs() < 1e-9);
        assert_eq!(row.category.label(), "Moderate");
    }

    let csv = render::forecast_csv(&rows).unwrap();
    assert!(csv.starts_with("Date,Predicted AQI,Category\n"));
    assert!(csv.contains("2024-01-01,120.00,Moderate"));
}

#[test]
fn merged_column_history_is_repaired_on_load() {
    let dir = TempDataDir::new("merged_columns");
    let mut csv = String::from("date;AQI;PM2.5\n");
    let last = NaiveDate::from_ymd_opt(2023, 6, 30).unwrap();
    for i in (0..15).rev() {
        let date = last - chrono::Duration::days(i);
        csv.push_str(&format!("{};{};{}\n", date.format("%m/%d/%Y"), 90 + i, 40));
    }
    let path = dir.path.join("blr_aqi.csv");
    fs::write(&path, csv).unwrap();

    let history = preprocessing::load_history(&path).unwrap();
    assert_eq!(history.len(), 15);
    assert_eq!(history.last().unwrap().date, last);
    assert_eq!(history.last().unwrap().aqi, 90.0);
}

#[test]
fn swapped_scaler_fails_the_pairing_check() {
    let dir = TempDataDir::new("pairing");
    write_model(&dir, "delhi");
    // scaler file sits at the delhi path but was fitted for blr
    write_scaler(&dir, "delhi", "blr");
    write_history(&dir, "delhi");

    let err = CityArtifacts::load(City::Delhi, &dir.path).unwrap_err();
    assert!(matches!(err, AppError::ArtifactMismatch { .. }));
}

#[test]
fn missing_artifact_halts_the_render() {
    let dir = TempDataDir::new("missing_artifact");
    write_model(&dir, "tvm");
    // no scaler, no history
    let err = CityArtifacts::load(City::Tvm, &dir.path).unwrap_err();
    assert!(matches!(err, AppError::ArtifactMissing { .. }));
}
