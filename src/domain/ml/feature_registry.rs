use crate::domain::errors::ForecastError;
use serde::{Deserialize, Serialize};

/// Number of numeric columns per observation.
pub const FEATURE_COUNT: usize = 11;

/// Ordered feature columns.
/// This order MUST match the order the models were trained with.
/// `Yt` is the closing price, `X1..X6` are technical indicators
/// (open, high, low, volume, momentum, oscillator) and `X7..X10` are
/// news and social-media sentiment scores.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Yt", "X1", "X2", "X3", "X4", "X5", "X6", "X7", "X8", "X9", "X10",
];

/// Column holding the price the models forecast.
pub const TARGET_COLUMN: usize = 0;

/// Column averaged across instruments for the market sentiment index.
pub const MARKET_SENTIMENT_COLUMN: usize = 7;

/// Trailing rows fed to the sequence models.
pub const WINDOW_SIZE: usize = 60;

/// Steps ahead produced by each model (H+1..H+3).
pub const FORECAST_HORIZON: usize = 3;

pub const QUANTITATIVE_INDICES: [usize; 7] = [0, 1, 2, 3, 4, 5, 6];
pub const QUALITATIVE_INDICES: [usize; 4] = [7, 8, 9, 10];

/// Position of a feature name in [`FEATURE_NAMES`].
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|n| n.eq_ignore_ascii_case(name.trim()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureGroup {
    /// Price, volume and indicator columns
    Technical,
    /// Sentiment columns
    Sentiment,
}

/// Column subsets consumed by the two model branches.
///
/// Built once from configuration and validated up front so the runner
/// never has to re-check indices per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLayout {
    quantitative: Vec<usize>,
    qualitative: Vec<usize>,
}

impl FeatureLayout {
    pub fn new(quantitative: Vec<usize>, qualitative: Vec<usize>) -> Result<Self, ForecastError> {
        let invalid = |reason: String| ForecastError::InvalidFeatureLayout { reason };

        if quantitative.is_empty() {
            return Err(invalid("quantitative index set is empty".to_string()));
        }
        if qualitative.is_empty() {
            return Err(invalid("qualitative index set is empty".to_string()));
        }

        for (label, set) in [("quantitative", &quantitative), ("qualitative", &qualitative)] {
            if let Some(idx) = set.iter().find(|&&i| i >= FEATURE_COUNT) {
                return Err(invalid(format!(
                    "{} index {} is out of range (0..{})",
                    label, idx, FEATURE_COUNT
                )));
            }
            for (pos, idx) in set.iter().enumerate() {
                if set[..pos].contains(idx) {
                    return Err(invalid(format!("{} index {} is repeated", label, idx)));
                }
            }
        }

        if let Some(shared) = quantitative.iter().find(|i| qualitative.contains(i)) {
            return Err(invalid(format!(
                "index {} appears in both quantitative and qualitative sets",
                shared
            )));
        }

        if !quantitative.contains(&TARGET_COLUMN) {
            return Err(invalid(format!(
                "target column {} must be part of the quantitative set",
                TARGET_COLUMN
            )));
        }

        Ok(Self {
            quantitative,
            qualitative,
        })
    }

    pub fn quantitative(&self) -> &[usize] {
        &self.quantitative
    }

    pub fn qualitative(&self) -> &[usize] {
        &self.qualitative
    }

    /// Group a feature column belongs to, if either branch consumes it.
    pub fn group_of(&self, index: usize) -> Option<FeatureGroup> {
        if self.quantitative.contains(&index) {
            Some(FeatureGroup::Technical)
        } else if self.qualitative.contains(&index) {
            Some(FeatureGroup::Sentiment)
        } else {
            None
        }
    }
}

impl Default for FeatureLayout {
    fn default() -> Self {
        Self {
            quantitative: QUANTITATIVE_INDICES.to_vec(),
            qualitative: QUALITATIVE_INDICES.to_vec(),
        }
    }
}
