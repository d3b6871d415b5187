use crate::domain::errors::ForecastError;
use crate::domain::market::instrument::Instrument;
use crate::domain::market::observation::{HistoricalSeries, rows_to_matrix};
use chrono::NaiveDate;
use ndarray::Array2;

/// Trailing rows of a series reduced to the model feature matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureWindow {
    instrument: Instrument,
    matrix: Array2<f64>,
    last_date: NaiveDate,
    last_close: f64,
}

impl FeatureWindow {
    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    /// Raw (unscaled) W×11 matrix, oldest row first
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.nrows() == 0
    }

    /// Date of the newest row; forecast dates are counted from here.
    pub fn last_date(&self) -> NaiveDate {
        self.last_date
    }

    pub fn last_close(&self) -> f64 {
        self.last_close
    }
}

/// Returns the last `window_size` rows of `series`.
///
/// Refuses to build a partial window: any series shorter than
/// `window_size`, an empty one included, yields `InsufficientHistory`.
pub fn extract_window(
    series: &HistoricalSeries,
    window_size: usize,
) -> Result<FeatureWindow, ForecastError> {
    let insufficient = || ForecastError::InsufficientHistory {
        instrument: series.instrument(),
        available: series.len(),
        required: window_size,
    };

    if series.len() < window_size {
        return Err(insufficient());
    }
    let last = series.last().ok_or_else(insufficient)?;

    let start = series.len() - window_size;

    Ok(FeatureWindow {
        instrument: series.instrument(),
        matrix: rows_to_matrix(&series.rows()[start..]),
        last_date: last.date,
        last_close: last.target(),
    })
}
