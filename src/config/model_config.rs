//! Model artifact configuration parsed from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Model environment configuration
#[derive(Debug, Clone)]
pub struct ModelEnvConfig {
    pub models_dir: PathBuf,
    /// Artifact extension, files are named `model_{scenario}_{SYMBOL}.{ext}`
    pub extension: String,
    pub intra_threads: usize,
    pub optimize_graph: bool,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            extension: "onnx".to_string(),
            intra_threads: 1,
            optimize_graph: true,
        }
    }
}

impl ModelEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            models_dir: env::var("MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.models_dir),
            extension: env::var("MODEL_EXTENSION")
                .map(|e| e.trim_start_matches('.').to_string())
                .unwrap_or(defaults.extension),
            intra_threads: Self::parse_usize("MODEL_INTRA_THREADS", defaults.intra_threads)?,
            optimize_graph: Self::parse_bool("MODEL_OPTIMIZE_GRAPH", defaults.optimize_graph),
        })
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_bool(key: &str, default: bool) -> bool {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<bool>()
            .unwrap_or(default)
    }
}
