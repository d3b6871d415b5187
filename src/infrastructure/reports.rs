//! Loaders for offline evaluation and attribution tables.
//!
//! A missing file is not an error: the table is simply not shown.

use crate::domain::attribution::ShapRecord;
use crate::domain::evaluation::{DmTestRecord, HorizonRecord};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

pub fn load_dm_table(path: &Path) -> Result<Option<Vec<DmTestRecord>>> {
    read_optional(path)
}

pub fn load_horizon_table(path: &Path) -> Result<Option<Vec<HorizonRecord>>> {
    read_optional(path)
}

pub fn load_shap_values(path: &Path) -> Result<Option<Vec<ShapRecord>>> {
    read_optional(path)
}

fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    if !path.exists() {
        warn!("Report file {:?} not found", path);
        return Ok(None);
    }

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let records =
        read_records(file).with_context(|| format!("Failed to parse {}", path.display()))?;

    info!("Loaded {} records from {:?}", records.len(), path);
    Ok(Some(records))
}

pub fn read_records<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<T>()
        .enumerate()
        .map(|(line, record)| record.with_context(|| format!("Invalid record on line {}", line + 2)))
        .collect()
}
