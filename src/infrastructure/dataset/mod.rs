pub mod cache;
pub mod csv_loader;

pub use cache::{CachedDatasetSource, DatasetCache};
pub use csv_loader::CsvDatasetLoader;
