//! Process-wide cache of parsed datasets.
//!
//! Entries are keyed by file path and are immutable once inserted; readers
//! share them through `Arc`. Invalidation is explicit (`invalidate` /
//! `clear`), there is no expiry.

use crate::domain::market::observation::Dataset;
use crate::domain::ports::DatasetSource;
use crate::infrastructure::dataset::csv_loader::CsvDatasetLoader;
use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::debug;

#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: RwLock<HashMap<PathBuf, Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<Arc<Dataset>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(path).cloned()
    }

    /// Returns the cached dataset for `path`, loading it on a miss.
    /// A failed load leaves the cache untouched.
    pub fn get_or_load<F>(&self, path: &Path, load: F) -> Result<Arc<Dataset>>
    where
        F: FnOnce(&Path) -> Result<Dataset>,
    {
        if let Some(hit) = self.get(path) {
            debug!("Dataset cache hit for {:?}", path);
            return Ok(hit);
        }

        debug!("Dataset cache miss for {:?}", path);
        let dataset = Arc::new(load(path)?);

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        // keep the first insert if another reader loaded it meanwhile
        let entry = entries
            .entry(path.to_path_buf())
            .or_insert_with(|| dataset.clone());
        Ok(entry.clone())
    }

    pub fn invalidate(&self, path: &Path) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(path).is_some()
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// CSV-backed dataset source that parses each file once.
pub struct CachedDatasetSource {
    loader: CsvDatasetLoader,
    cache: Arc<DatasetCache>,
}

impl CachedDatasetSource {
    pub fn new(loader: CsvDatasetLoader, cache: Arc<DatasetCache>) -> Self {
        Self { loader, cache }
    }

    pub fn cache(&self) -> &Arc<DatasetCache> {
        &self.cache
    }
}

impl DatasetSource for CachedDatasetSource {
    fn load(&self) -> Result<Arc<Dataset>> {
        let path = self.loader.resolve_path()?;
        self.cache.get_or_load(&path, |p| self.loader.load_from(p))
    }
}
