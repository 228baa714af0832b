//! Full query cycle over CSV fixtures

use std::io::Write;

use chrono::NaiveDate;
use floatchat_query::{
    Column, ConfigManager, DatasetHandle, FloatChatConfig, DatasetStatus, DatasetSummary, MeasurementTable,
    Parameter, QueryCoordinator, StrategyKind,
};
use tempfile::NamedTempFile;

const MASTER_CSV: &str = "\
Float_ID,Date,Latitude,Longitude,Pressure,Temperature,Salinity
2902115,2010-02-11 04:12:00,15.2,61.8,5.0,27.3,36.1
2902115,2010-02-11 04:12:00,15.2,61.8,150.0,21.0,36.4
2902115,2012-08-01 09:00:00,16.0,63.1,300.0,14.2,35.9
2902116,2015-11-30 23:59:59,12.5,88.4,10.0,28.9,33.2
2902116,2016-01-15 00:00:00,13.0,89.0,450.0,10.1,
2902117,2011-06-01 00:00:00,-45.0,70.0,20.0,6.5,34.1
2902117,,-44.0,71.0,1000.0,nan,34.7
";

fn fixture() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(MASTER_CSV.as_bytes()).unwrap();
    file
}

fn offline_coordinator(dataset: DatasetHandle) -> QueryCoordinator {
    QueryCoordinator::from_config_with_dataset(&FloatChatConfig::default(), true, dataset).unwrap()
}

#[test]
fn test_csv_headers_are_case_insensitive() {
    let file = fixture();
    let table = MeasurementTable::load_csv(file.path()).unwrap();

    assert_eq!(table.len(), 7);
    assert!(Column::ALL.iter().all(|c| table.has_column(*c)));
    assert!(!table.is_present(Column::Salinity, 4));
    assert!(!table.is_present(Column::Temperature, 6));
    assert!(!table.is_present(Column::Date, 6));
}

#[test]
fn test_missing_csv_is_dataset_error() {
    let result = DatasetHandle::load_csv("/nonexistent/master_dataset.csv");
    assert!(result.is_err());
}

#[test]
fn test_summary_over_fixture() {
    let file = fixture();
    let table = MeasurementTable::load_csv(file.path()).unwrap();
    let summary = DatasetSummary::compute(&table);

    assert_eq!(summary.total_records, 7);
    assert_eq!(summary.float_count, 3);
    assert_eq!(summary.parameter_counts[&Parameter::Temperature], 6);
    assert_eq!(summary.parameter_counts[&Parameter::Salinity], 6);
    assert_eq!(summary.parameter_counts[&Parameter::Pressure], 7);

    let span = summary.date_range.unwrap();
    assert_eq!(span.start.date(), NaiveDate::from_ymd_opt(2010, 2, 11).unwrap());
    assert_eq!(span.end.date(), NaiveDate::from_ymd_opt(2016, 1, 15).unwrap());

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["parameter_counts"]["temperature"], 6);
}

#[tokio::test]
async fn test_arabian_sea_temperature_range_and_depth() {
    let file = fixture();
    let coordinator = offline_coordinator(DatasetHandle::load_csv(file.path()).unwrap());

    let response = coordinator
        .run("Temperature in the Arabian Sea from 2010 to 2012 between 100-500 m")
        .await;

    assert_eq!(response.interpretation.strategy, StrategyKind::Keyword);
    assert_eq!(
        response.descriptor().to_string(),
        "Looking for temperature in arabian sea from 2010-01-01 to 2012-12-31 between 100-500 m"
    );
    assert_eq!(response.result.status, DatasetStatus::Available);
    assert_eq!(response.result.rows.rows(), &[1, 2]);

    let stats = response.parameter_stats().unwrap();
    assert_eq!(stats.count, 2);
    assert!((stats.mean - 17.6).abs() < 1e-9);
}

#[tokio::test]
async fn test_southern_ocean_skips_undated_rows_for_year() {
    let file = fixture();
    let coordinator = offline_coordinator(DatasetHandle::load_csv(file.path()).unwrap());

    let response = coordinator.run("salinity in the southern ocean in 2011").await;
    assert_eq!(response.descriptor().date(), NaiveDate::from_ymd_opt(2011, 1, 1));
    // 2011-06-01 is outside the 30-day window around 2011-01-01
    assert!(response.result.is_empty());
    assert!(!response.result.is_unavailable());

    let response = coordinator.run("salinity in the southern ocean").await;
    assert_eq!(response.result.rows.rows(), &[5, 6]);
}

#[tokio::test]
async fn test_unknown_location_offline_keeps_all_rows() {
    let file = fixture();
    let coordinator = offline_coordinator(DatasetHandle::load_csv(file.path()).unwrap());

    let interpretation = coordinator.interpret("pressure readings").await;
    assert_eq!(interpretation.descriptor.parameter, Some(Parameter::Pressure));

    let response = coordinator.run("pressure readings").await;
    assert_eq!(response.result.len(), 7);
    assert!(!response.result.truncated());
}

#[test]
fn test_config_file_drives_coordinator() {
    let mut config_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    let data = fixture();
    writeln!(
        config_file,
        "[dataset]\npath = {:?}\n\n[pipeline]\nresult_cap = 3\n\n[ollama]\nenabled = false\n\n[geocoder]\nenabled = false",
        data.path().to_string_lossy()
    )
    .unwrap();

    let config = ConfigManager::with_path(config_file.path())
        .without_global()
        .with_env_prefix("FLOATCHAT_TEST_COORDINATOR")
        .load()
        .unwrap();
    assert_eq!(config.pipeline.result_cap, 3);

    let coordinator = QueryCoordinator::from_config(&config, false).unwrap();
    assert!(coordinator.dataset().is_loaded());
    assert!(!coordinator.extractor().has_primary());

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let response = runtime.block_on(coordinator.run("temperature"));
    assert_eq!(response.result.matched, 6);
    assert_eq!(response.result.len(), 3);
    assert_eq!(response.result.dropped(), 3);
    // Most recent first: 2016-01-15, 2015-11-30, 2012-08-01
    assert_eq!(response.result.rows.rows(), &[4, 3, 2]);
}
