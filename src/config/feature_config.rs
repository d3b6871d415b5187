//! Feature layout configuration parsed from environment variables.
//!
//! The index lists are validated here, once, into a `FeatureLayout`.

use crate::domain::ml::feature_registry::{
    FeatureLayout, QUALITATIVE_INDICES, QUANTITATIVE_INDICES,
};
use anyhow::{Context, Result};
use std::env;

/// Feature environment configuration
#[derive(Debug, Clone, Default)]
pub struct FeatureEnvConfig {
    pub layout: FeatureLayout,
}

impl FeatureEnvConfig {
    pub fn from_env() -> Result<Self> {
        let quantitative =
            Self::parse_indices("QUANT_FEATURE_INDICES", &QUANTITATIVE_INDICES)?;
        let qualitative = Self::parse_indices("QUAL_FEATURE_INDICES", &QUALITATIVE_INDICES)?;

        let layout = FeatureLayout::new(quantitative, qualitative)
            .context("Failed to validate feature layout")?;

        Ok(Self { layout })
    }

    fn parse_indices(key: &str, default: &[usize]) -> Result<Vec<usize>> {
        match env::var(key) {
            Ok(raw) => parse_index_list(&raw).context(format!("Failed to parse {}", key)),
            Err(_) => Ok(default.to_vec()),
        }
    }
}

fn parse_index_list(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().context(format!("invalid index '{}'", s)))
        .collect()
}
