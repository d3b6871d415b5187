//! Per-column min-max scaling.
//!
//! The scaler is fit over an instrument's entire history on every forecast
//! and is never persisted. Each column is mapped to `[0, 1]` independently,
//! so inverting a single column only needs that column's own bounds. The
//! forecast path relies on this when it recovers prices from column 0.

use crate::domain::errors::ForecastError;
use crate::domain::ml::feature_registry::TARGET_COLUMN;
use ndarray::{Array1, Array2, Axis};

#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    data_min: Array1<f64>,
    data_max: Array1<f64>,
}

impl MinMaxScaler {
    /// Computes per-column bounds over every row of `data`.
    pub fn fit(data: &Array2<f64>) -> Result<Self, ForecastError> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(ForecastError::NoHistoricalData { instrument: None });
        }

        let data_min = data.fold_axis(Axis(0), f64::INFINITY, |acc, &v| acc.min(v));
        let data_max = data.fold_axis(Axis(0), f64::NEG_INFINITY, |acc, &v| acc.max(v));

        Ok(Self { data_min, data_max })
    }

    pub fn n_features(&self) -> usize {
        self.data_min.len()
    }

    pub fn data_min(&self) -> &Array1<f64> {
        &self.data_min
    }

    pub fn data_max(&self) -> &Array1<f64> {
        &self.data_max
    }

    /// Maps each column to `[0, 1]`. A constant column maps to `0.0`.
    pub fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, ForecastError> {
        self.check_columns(data)?;

        let mut scaled = data.clone();
        for (j, mut column) in scaled.axis_iter_mut(Axis(1)).enumerate() {
            let min = self.data_min[j];
            let range = self.data_max[j] - min;
            if range == 0.0 {
                column.fill(0.0);
            } else {
                column.mapv_inplace(|v| (v - min) / range);
            }
        }
        Ok(scaled)
    }

    /// Inverse of [`transform`](Self::transform). A constant column maps
    /// back to its single observed value.
    pub fn inverse_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, ForecastError> {
        self.check_columns(data)?;

        let mut restored = data.clone();
        for (j, mut column) in restored.axis_iter_mut(Axis(1)).enumerate() {
            let min = self.data_min[j];
            let range = self.data_max[j] - min;
            column.mapv_inplace(|v| v * range + min);
        }
        Ok(restored)
    }

    /// Restores target-column values from model output.
    ///
    /// Predictions go into column 0 of an otherwise zero matrix shaped like
    /// the fitted data; the matrix is inverse-transformed and column 0 is
    /// returned.
    pub fn inverse_transform_column0(&self, predicted: &[f32]) -> Result<Vec<f64>, ForecastError> {
        let mut placeholder = Array2::<f64>::zeros((predicted.len(), self.n_features()));
        for (row, &value) in predicted.iter().enumerate() {
            placeholder[[row, TARGET_COLUMN]] = f64::from(value);
        }

        let restored = self.inverse_transform(&placeholder)?;
        Ok(restored.column(TARGET_COLUMN).to_vec())
    }

    fn check_columns(&self, data: &Array2<f64>) -> Result<(), ForecastError> {
        if data.ncols() != self.n_features() {
            return Err(ForecastError::FeatureShapeMismatch {
                expected: self.n_features(),
                actual: data.ncols(),
            });
        }
        Ok(())
    }
}
