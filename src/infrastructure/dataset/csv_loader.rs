use crate::config::DataEnvConfig;
use crate::domain::market::instrument::Instrument;
use crate::domain::market::observation::{Dataset, ObservationRow};
use crate::domain::ml::feature_registry::FEATURE_COUNT;
use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Row layout of the merged market + sentiment table.
/// Extra columns are ignored. Sentiment columns may be absent or empty;
/// they are zero-filled.
#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    relevant_issuer: String,
    #[serde(rename = "Yt")]
    yt: f64,
    #[serde(rename = "X1")]
    x1: f64,
    #[serde(rename = "X2")]
    x2: f64,
    #[serde(rename = "X3")]
    x3: f64,
    #[serde(rename = "X4")]
    x4: f64,
    #[serde(rename = "X5")]
    x5: f64,
    #[serde(rename = "X6")]
    x6: f64,
    #[serde(rename = "X7", default)]
    x7: Option<f64>,
    #[serde(rename = "X8", default)]
    x8: Option<f64>,
    #[serde(rename = "X9", default)]
    x9: Option<f64>,
    #[serde(rename = "X10", default)]
    x10: Option<f64>,
}

impl RawObservation {
    fn values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.yt,
            self.x1,
            self.x2,
            self.x3,
            self.x4,
            self.x5,
            self.x6,
            self.x7.unwrap_or(0.0),
            self.x8.unwrap_or(0.0),
            self.x9.unwrap_or(0.0),
            self.x10.unwrap_or(0.0),
        ]
    }
}

/// Reads the historical table from CSV.
#[derive(Debug, Clone)]
pub struct CsvDatasetLoader {
    primary: PathBuf,
    fallback: PathBuf,
}

impl CsvDatasetLoader {
    pub fn new(primary: PathBuf, fallback: PathBuf) -> Self {
        Self { primary, fallback }
    }

    pub fn from_config(config: &DataEnvConfig) -> Self {
        Self::new(config.dataset_path(), config.dataset_fallback_path())
    }

    /// Primary file if present, otherwise the fallback.
    pub fn resolve_path(&self) -> Result<PathBuf> {
        if self.primary.exists() {
            return Ok(self.primary.clone());
        }
        if self.fallback.exists() {
            debug!(
                "Dataset {:?} not found, using fallback {:?}",
                self.primary, self.fallback
            );
            return Ok(self.fallback.clone());
        }
        bail!(
            "Dataset not found: neither {} nor {} exists",
            self.primary.display(),
            self.fallback.display()
        )
    }

    pub fn load(&self) -> Result<Dataset> {
        let path = self.resolve_path()?;
        self.load_from(&path)
    }

    pub fn load_from(&self, path: &Path) -> Result<Dataset> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open dataset {}", path.display()))?;
        let rows = parse_observations(file)
            .with_context(|| format!("Failed to parse dataset {}", path.display()))?;

        info!("Loaded {} observations from {:?}", rows.len(), path);
        Ok(Dataset::new(rows))
    }
}

/// Parses CSV observations. Rows whose issuer is not a known instrument
/// are skipped.
pub fn parse_observations<R: Read>(reader: R) -> Result<Vec<ObservationRow>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (line, record) in csv_reader.deserialize::<RawObservation>().enumerate() {
        // header is line 1
        let record = record.with_context(|| format!("Invalid record on line {}", line + 2))?;

        let instrument = match record.relevant_issuer.parse::<Instrument>() {
            Ok(i) => i,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        let date = parse_date(&record.date)
            .with_context(|| format!("Invalid date '{}' on line {}", record.date, line + 2))?;

        rows.push(ObservationRow::new(date, instrument, record.values()));
    }

    if skipped > 0 {
        warn!("Skipped {} rows with unknown issuers", skipped);
    }

    Ok(rows)
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component.
fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts.date());
        }
    }
    bail!("unrecognised date format")
}
