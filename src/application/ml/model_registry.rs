use super::onnx_predictor::OnnxSequenceModel;
use crate::config::ModelEnvConfig;
use crate::domain::errors::ForecastError;
use crate::domain::forecast::Scenario;
use crate::domain::market::instrument::Instrument;
use crate::domain::ports::{BaselineForecaster, FusionForecaster, ModelRepository};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{error, warn};

/// Loads `model_{scenario}_{SYMBOL}.{ext}` artifacts from a directory and
/// memoizes them per (instrument, scenario).
///
/// Failed loads are not memoized; the next request tries again.
pub struct FileModelRepository {
    settings: ModelEnvConfig,
    loaded: Mutex<HashMap<(Instrument, Scenario), Arc<OnnxSequenceModel>>>,
}

impl FileModelRepository {
    pub fn new(settings: ModelEnvConfig) -> Self {
        Self {
            settings,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    pub fn model_path(&self, instrument: Instrument, scenario: Scenario) -> PathBuf {
        self.settings.models_dir.join(format!(
            "model_{}_{}.{}",
            scenario, instrument, self.settings.extension
        ))
    }

    /// Drops every memoized session.
    pub fn clear(&self) {
        self.loaded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    fn load(
        &self,
        instrument: Instrument,
        scenario: Scenario,
    ) -> Result<Arc<OnnxSequenceModel>, ForecastError> {
        let mut loaded = self.loaded.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(model) = loaded.get(&(instrument, scenario)) {
            return Ok(model.clone());
        }

        let unavailable = |reason: String| ForecastError::ModelUnavailable {
            instrument,
            scenario,
            reason,
        };

        let path = self.model_path(instrument, scenario);
        if !path.exists() {
            warn!("Model artifact for {} ({}) not found at {:?}", instrument, scenario, path);
            return Err(unavailable(format!("artifact not found at {}", path.display())));
        }

        let model = OnnxSequenceModel::load(&path, &self.settings).map_err(|e| {
            error!("Error loading {} model for {}: {:#}", scenario, instrument, e);
            unavailable(format!("{:#}", e))
        })?;

        if model.input_count() != scenario.expected_inputs() {
            error!(
                "Model {:?} declares {} inputs, {} expects {}",
                path,
                model.input_count(),
                scenario,
                scenario.expected_inputs()
            );
            return Err(unavailable(format!(
                "artifact declares {} inputs, expected {}",
                model.input_count(),
                scenario.expected_inputs()
            )));
        }

        let model = Arc::new(model);
        loaded.insert((instrument, scenario), model.clone());
        Ok(model)
    }
}

impl ModelRepository for FileModelRepository {
    fn baseline(&self, instrument: Instrument) -> Result<Arc<dyn BaselineForecaster>, ForecastError> {
        let model: Arc<dyn BaselineForecaster> = self.load(instrument, Scenario::Baseline)?;
        Ok(model)
    }

    fn fusion(&self, instrument: Instrument) -> Result<Arc<dyn FusionForecaster>, ForecastError> {
        let model: Arc<dyn FusionForecaster> = self.load(instrument, Scenario::Fusion)?;
        Ok(model)
    }
}
