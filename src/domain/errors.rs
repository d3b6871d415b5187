use crate::domain::forecast::Scenario;
use crate::domain::market::instrument::Instrument;
use thiserror::Error;

/// Errors raised while preparing or running a forecast
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Insufficient history for {instrument}: {available} rows available, {required} required")]
    InsufficientHistory {
        instrument: Instrument,
        available: usize,
        required: usize,
    },

    #[error("No historical data available{}", for_instrument(.instrument))]
    NoHistoricalData { instrument: Option<Instrument> },

    #[error("Model unavailable for {instrument} ({scenario}): {reason}")]
    ModelUnavailable {
        instrument: Instrument,
        scenario: Scenario,
        reason: String,
    },

    #[error("{scenario} inference failed: {cause}")]
    InferenceFailed { scenario: Scenario, cause: String },

    #[error("Malformed forecast result: {baseline} baseline prices, {fusion} fusion prices, {dates} dates")]
    MalformedForecastResult {
        baseline: usize,
        fusion: usize,
        dates: usize,
    },

    #[error("Feature shape mismatch: expected {expected} columns, got {actual}")]
    FeatureShapeMismatch { expected: usize, actual: usize },

    #[error("Dataset unavailable: {reason}")]
    DatasetUnavailable { reason: String },

    #[error("Invalid feature layout: {reason}")]
    InvalidFeatureLayout { reason: String },
}

/// Who is expected to act on an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Not enough data for the selected instrument; retrying does not help
    User,
    /// Missing or broken deployment artifacts
    Operator,
    /// Unexpected failure inside a model run
    Runtime,
    /// Invariant violation, treat as a bug
    Internal,
}

impl ForecastError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::InsufficientHistory { .. } | ForecastError::NoHistoricalData { .. } => {
                ErrorKind::User
            }
            ForecastError::ModelUnavailable { .. }
            | ForecastError::DatasetUnavailable { .. }
            | ForecastError::InvalidFeatureLayout { .. } => ErrorKind::Operator,
            ForecastError::InferenceFailed { .. } => ErrorKind::Runtime,
            ForecastError::MalformedForecastResult { .. }
            | ForecastError::FeatureShapeMismatch { .. } => ErrorKind::Internal,
        }
    }
}

fn for_instrument(instrument: &Option<Instrument>) -> String {
    match instrument {
        Some(i) => format!(" for {}", i),
        None => String::new(),
    }
}
