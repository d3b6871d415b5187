use super::formatter::format_forecast;
use super::inference::DualBranchRunner;
use crate::domain::errors::ForecastError;
use crate::domain::forecast::{ForecastOutcome, NextDaySummary, forecast_dates};
use crate::domain::market::instrument::Instrument;
use crate::domain::market::observation::HistoricalSeries;
use crate::domain::ml::feature_registry::{FORECAST_HORIZON, FeatureLayout, WINDOW_SIZE};
use crate::domain::ml::scaler::MinMaxScaler;
use crate::domain::ml::window::extract_window;
use crate::domain::ports::{DatasetSource, ModelRepository};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Extract → scale → infer → inverse → format, one instrument per call.
///
/// Holds no per-request state; the dataset source and model repository
/// own whatever caching happens.
pub struct ForecastPipeline {
    dataset: Arc<dyn DatasetSource>,
    models: Arc<dyn ModelRepository>,
    runner: DualBranchRunner,
}

impl ForecastPipeline {
    pub fn new(
        dataset: Arc<dyn DatasetSource>,
        models: Arc<dyn ModelRepository>,
        layout: FeatureLayout,
    ) -> Self {
        Self {
            dataset,
            models,
            runner: DualBranchRunner::new(layout),
        }
    }

    pub fn forecast(&self, instrument: Instrument) -> Result<ForecastOutcome, ForecastError> {
        let dataset = self.dataset.load().map_err(|e| {
            error!("Failed to load historical dataset: {:#}", e);
            ForecastError::DatasetUnavailable {
                reason: format!("{:#}", e),
            }
        })?;

        let series = dataset.series(instrument);
        info!(
            "Forecast requested for {} ({} historical rows)",
            instrument,
            series.len()
        );

        self.forecast_series(&series)
    }

    /// Runs the pipeline on an already selected series.
    pub fn forecast_series(&self, series: &HistoricalSeries) -> Result<ForecastOutcome, ForecastError> {
        let instrument = series.instrument();
        if series.is_empty() {
            return Err(ForecastError::NoHistoricalData {
                instrument: Some(instrument),
            });
        }
        let window = extract_window(series, WINDOW_SIZE)?;

        // both models must be present before anything is scaled
        let baseline = self.models.baseline(instrument)?;
        let fusion = self.models.fusion(instrument)?;

        let scaler = MinMaxScaler::fit(&series.to_matrix())?;
        let scaled = scaler.transform(window.matrix())?;
        debug!(
            "Scaled {}x{} window for {} ending {}",
            scaled.nrows(),
            scaled.ncols(),
            instrument,
            window.last_date()
        );

        let raw = self.runner.run(&scaled, baseline.as_ref(), fusion.as_ref())?;

        let baseline_prices = scaler.inverse_transform_column0(&raw.baseline)?;
        let fusion_prices = scaler.inverse_transform_column0(&raw.fusion)?;
        let dates = forecast_dates(window.last_date(), FORECAST_HORIZON);

        let table = format_forecast(&baseline_prices, &fusion_prices, &dates)?;
        let next_day = NextDaySummary::from_table(&table, window.last_date(), window.last_close());

        info!(
            "Forecast for {} complete: {} rows from {}",
            instrument,
            table.len(),
            window.last_date()
        );

        Ok(ForecastOutcome {
            instrument,
            table,
            scaled: raw,
            next_day,
        })
    }
}
