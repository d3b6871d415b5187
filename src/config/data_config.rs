//! Data file locations parsed from environment variables.

use std::env;
use std::path::PathBuf;

/// Data environment configuration
#[derive(Debug, Clone)]
pub struct DataEnvConfig {
    pub data_dir: PathBuf,
    /// Merged market + sentiment table
    pub dataset_file: String,
    /// Used when `dataset_file` does not exist
    pub dataset_fallback_file: String,
    pub dm_test_file: String,
    pub horizon_file: String,
    pub shap_file: String,
}

impl Default for DataEnvConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            dataset_file: "df_fusion.csv".to_string(),
            dataset_fallback_file: "data_final.csv".to_string(),
            dm_test_file: "tabel_dm_test.csv".to_string(),
            horizon_file: "df_horizon.csv".to_string(),
            shap_file: "shap_values.csv".to_string(),
        }
    }
}

impl DataEnvConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            dataset_file: env::var("DATASET_FILE").unwrap_or(defaults.dataset_file),
            dataset_fallback_file: env::var("DATASET_FALLBACK_FILE")
                .unwrap_or(defaults.dataset_fallback_file),
            dm_test_file: env::var("DM_TEST_FILE").unwrap_or(defaults.dm_test_file),
            horizon_file: env::var("HORIZON_FILE").unwrap_or(defaults.horizon_file),
            shap_file: env::var("SHAP_FILE").unwrap_or(defaults.shap_file),
        }
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir.join(&self.dataset_file)
    }

    pub fn dataset_fallback_path(&self) -> PathBuf {
        self.data_dir.join(&self.dataset_fallback_file)
    }

    pub fn dm_test_path(&self) -> PathBuf {
        self.data_dir.join(&self.dm_test_file)
    }

    pub fn horizon_path(&self) -> PathBuf {
        self.data_dir.join(&self.horizon_file)
    }

    pub fn shap_path(&self) -> PathBuf {
        self.data_dir.join(&self.shap_file)
    }
}
