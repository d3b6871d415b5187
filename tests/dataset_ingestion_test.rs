use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use stockfusion::application::forecasting::ForecastPipeline;
use stockfusion::application::overview::market_overview;
use stockfusion::domain::errors::{ErrorKind, ForecastError};
use stockfusion::domain::market::instrument::Instrument;
use stockfusion::domain::ml::feature_registry::FeatureLayout;
use stockfusion::domain::ports::DatasetSource;
use stockfusion::infrastructure::dataset::{CachedDatasetSource, CsvDatasetLoader, DatasetCache};
use stockfusion::infrastructure::mock::{InMemoryModelRepository, MockForecaster};

const HEADER: &str = "date,relevant_issuer,Yt,X1,X2,X3,X4,X5,X6,X7,X8,X9,X10\n";

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stockfusion-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_history(path: &PathBuf, issuer: &str, days: usize, base_price: f64) {
    let mut csv = String::from(HEADER);
    let start = chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    for i in 0..days {
        let date = start + chrono::Days::new(i as u64);
        let price = base_price + (i % 10) as f64 * 5.0;
        csv.push_str(&format!(
            "{},{},{},{},{},{},1000000,0.1,50,{},0.2,,0.1\n",
            date,
            issuer,
            price,
            price - 5.0,
            price + 5.0,
            price - 10.0,
            (i % 4) as f64 * 0.1
        ));
    }
    // an issuer outside the instrument list must be ignored
    csv.push_str("2023-01-01,TLKM,3000,3000,3000,3000,1,0,0,0,0,0,0\n");
    fs::write(path, csv).unwrap();
}

#[test]
fn test_primary_file_is_parsed_once_and_shared() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let dir = scratch_dir("primary");
    let primary = dir.join("df_fusion.csv");
    write_history(&primary, "BBCA", 75, 9000.0);

    let cache = Arc::new(DatasetCache::new());
    let source = CachedDatasetSource::new(
        CsvDatasetLoader::new(primary.clone(), dir.join("data_final.csv")),
        cache.clone(),
    );

    let first = source.load().unwrap();
    let second = source.load().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.len(), 75);
    assert_eq!(first.instruments(), vec![Instrument::Bbca]);
    assert_eq!(cache.len(), 1);

    // rewriting the file is invisible until the entry is invalidated
    write_history(&primary, "BBCA", 80, 9000.0);
    assert_eq!(source.load().unwrap().len(), 75);
    assert!(cache.invalidate(&primary));
    assert_eq!(source.load().unwrap().len(), 80);
}

#[test]
fn test_fallback_file_is_used_when_primary_is_missing() {
    let dir = scratch_dir("fallback");
    let fallback = dir.join("data_final.csv");
    write_history(&fallback, "GOTO", 10, 80.0);

    let loader = CsvDatasetLoader::new(dir.join("df_fusion.csv"), fallback.clone());

    assert_eq!(loader.resolve_path().unwrap(), fallback);
    let dataset = loader.load().unwrap();
    assert_eq!(dataset.series(Instrument::Goto).len(), 10);
    // X9 was empty in every row
    assert!(dataset.rows().iter().all(|r| r.values[9] == 0.0));
}

#[test]
fn test_missing_dataset_is_operator_error() {
    let dir = scratch_dir("missing");
    let source = Arc::new(CachedDatasetSource::new(
        CsvDatasetLoader::new(dir.join("a.csv"), dir.join("b.csv")),
        Arc::new(DatasetCache::new()),
    ));
    let pipeline = ForecastPipeline::new(
        source,
        Arc::new(InMemoryModelRepository::new()),
        FeatureLayout::default(),
    );

    let err = pipeline.forecast(Instrument::Bbca).unwrap_err();

    assert!(matches!(err, ForecastError::DatasetUnavailable { .. }));
    assert_eq!(err.kind(), ErrorKind::Operator);
}

#[test]
fn test_csv_history_flows_through_the_pipeline() {
    let dir = scratch_dir("flow");
    let primary = dir.join("df_fusion.csv");
    write_history(&primary, "BMRI", 64, 6000.0);

    let source = Arc::new(CachedDatasetSource::new(
        CsvDatasetLoader::new(primary, dir.join("none.csv")),
        Arc::new(DatasetCache::new()),
    ));
    let models = InMemoryModelRepository::new()
        .with_baseline(Instrument::Bmri, MockForecaster::echo("baseline"))
        .with_fusion(Instrument::Bmri, MockForecaster::echo("fusion"));
    let pipeline = ForecastPipeline::new(source.clone(), Arc::new(models), FeatureLayout::default());

    let outcome = pipeline.forecast(Instrument::Bmri).unwrap();

    // last row is day 63: 6000 + 3 * 5
    let next = outcome.next_day.unwrap();
    assert_eq!(next.last_close, 6015.0);
    assert!((next.baseline_price - 6015.0).abs() < 1e-2);

    let overview = market_overview(&source.load().unwrap()).unwrap();
    assert_eq!(overview.top_instrument, Instrument::Bmri);
    assert_eq!(overview.last_update, next.last_date);
}
