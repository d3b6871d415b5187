//! Configuration module for Stockfusion.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Data files, Model artifacts, and Feature layout.

mod data_config;
mod feature_config;
mod model_config;

pub use data_config::DataEnvConfig;
pub use feature_config::FeatureEnvConfig;
pub use model_config::ModelEnvConfig;

use crate::domain::ml::feature_registry::FeatureLayout;
use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub data: DataEnvConfig,
    pub models: ModelEnvConfig,
    pub features: FeatureEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a local `.env` file.
    pub fn from_env() -> Result<Self> {
        let data = DataEnvConfig::from_env();
        let models = ModelEnvConfig::from_env().context("Failed to load model config")?;
        let features = FeatureEnvConfig::from_env().context("Failed to load feature config")?;

        Ok(Self {
            data,
            models,
            features,
        })
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.features.layout
    }
}
