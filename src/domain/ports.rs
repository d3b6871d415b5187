use crate::domain::errors::ForecastError;
use crate::domain::market::instrument::Instrument;
use crate::domain::market::observation::Dataset;
use anyhow::Result;
use ndarray::ArrayView3;
use std::sync::Arc;

/// Source of the historical observation table
pub trait DatasetSource: Send + Sync {
    fn load(&self) -> Result<Arc<Dataset>>;
}

/// Model consuming quantitative features only.
/// Input shape `(1, window, quantitative)`; output is one scaled value
/// per forecast step.
pub trait BaselineForecaster: Send + Sync {
    fn forecast(&self, quantitative: ArrayView3<'_, f32>) -> Result<Vec<f32>>;

    fn name(&self) -> &str;
}

/// Model consuming quantitative and qualitative features jointly.
/// Inputs `(1, window, quantitative)` and `(1, window, qualitative)`.
pub trait FusionForecaster: Send + Sync {
    fn forecast(
        &self,
        quantitative: ArrayView3<'_, f32>,
        qualitative: ArrayView3<'_, f32>,
    ) -> Result<Vec<f32>>;

    fn name(&self) -> &str;
}

/// Locates trained models per instrument.
/// A missing or unloadable artifact is reported as `ModelUnavailable`.
pub trait ModelRepository: Send + Sync {
    fn baseline(&self, instrument: Instrument) -> Result<Arc<dyn BaselineForecaster>, ForecastError>;

    fn fusion(&self, instrument: Instrument) -> Result<Arc<dyn FusionForecaster>, ForecastError>;
}
