use crate::domain::errors::ForecastError;
use crate::domain::forecast::Scenario;
use crate::domain::market::instrument::Instrument;
use crate::domain::market::observation::Dataset;
use crate::domain::ml::feature_registry::FORECAST_HORIZON;
use crate::domain::ports::{BaselineForecaster, DatasetSource, FusionForecaster, ModelRepository};
use anyhow::{Result, bail};
use ndarray::ArrayView3;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockBehaviour {
    /// Always returns the same scaled values
    Fixed(Vec<f32>),
    /// Repeats the last scaled target value of the window
    EchoLastTarget,
    /// Always fails with the given message
    Fail(String),
    /// Panics with the given message, like a crashing backend
    Panic(String),
}

/// Deterministic stand-in for a trained model. Records every call's input
/// shapes so tests can check what the runner fed it.
#[derive(Debug)]
pub struct MockForecaster {
    name: String,
    behaviour: MockBehaviour,
    calls: AtomicUsize,
    shapes: Mutex<Vec<Vec<Vec<usize>>>>,
}

impl MockForecaster {
    pub fn new(name: &str, behaviour: MockBehaviour) -> Self {
        Self {
            name: name.to_string(),
            behaviour,
            calls: AtomicUsize::new(0),
            shapes: Mutex::new(Vec::new()),
        }
    }

    pub fn fixed(name: &str, values: Vec<f32>) -> Self {
        Self::new(name, MockBehaviour::Fixed(values))
    }

    pub fn echo(name: &str) -> Self {
        Self::new(name, MockBehaviour::EchoLastTarget)
    }

    pub fn failing(name: &str, message: &str) -> Self {
        Self::new(name, MockBehaviour::Fail(message.to_string()))
    }

    pub fn panicking(name: &str, message: &str) -> Self {
        Self::new(name, MockBehaviour::Panic(message.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Input shapes per call, one entry per tensor.
    pub fn seen_shapes(&self) -> Vec<Vec<Vec<usize>>> {
        self.shapes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn respond(&self, inputs: &[ArrayView3<'_, f32>]) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.shapes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(inputs.iter().map(|t| t.shape().to_vec()).collect());

        match &self.behaviour {
            MockBehaviour::Fixed(values) => Ok(values.clone()),
            MockBehaviour::EchoLastTarget => {
                let quant = inputs
                    .first()
                    .ok_or_else(|| anyhow::anyhow!("no input tensor"))?;
                let steps = quant.shape()[1];
                if steps == 0 {
                    bail!("empty window");
                }
                Ok(vec![quant[[0, steps - 1, 0]]; FORECAST_HORIZON])
            }
            MockBehaviour::Fail(message) => bail!("{}", message),
            MockBehaviour::Panic(message) => panic!("{}", message),
        }
    }
}

impl BaselineForecaster for MockForecaster {
    fn forecast(&self, quantitative: ArrayView3<'_, f32>) -> Result<Vec<f32>> {
        self.respond(&[quantitative])
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FusionForecaster for MockForecaster {
    fn forecast(
        &self,
        quantitative: ArrayView3<'_, f32>,
        qualitative: ArrayView3<'_, f32>,
    ) -> Result<Vec<f32>> {
        self.respond(&[quantitative.reborrow(), qualitative.reborrow()])
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Model repository backed by a map. Anything not registered is
/// `ModelUnavailable`, like a missing artifact on disk.
#[derive(Default)]
pub struct InMemoryModelRepository {
    baseline: HashMap<Instrument, Arc<MockForecaster>>,
    fusion: HashMap<Instrument, Arc<MockForecaster>>,
}

impl InMemoryModelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_baseline(self, instrument: Instrument, model: MockForecaster) -> Self {
        self.with_shared_baseline(instrument, Arc::new(model))
    }

    pub fn with_fusion(self, instrument: Instrument, model: MockForecaster) -> Self {
        self.with_shared_fusion(instrument, Arc::new(model))
    }

    pub fn with_shared_baseline(mut self, instrument: Instrument, model: Arc<MockForecaster>) -> Self {
        self.baseline.insert(instrument, model);
        self
    }

    pub fn with_shared_fusion(mut self, instrument: Instrument, model: Arc<MockForecaster>) -> Self {
        self.fusion.insert(instrument, model);
        self
    }

    fn missing(instrument: Instrument, scenario: Scenario) -> ForecastError {
        ForecastError::ModelUnavailable {
            instrument,
            scenario,
            reason: format!("no {} model registered for {}", scenario, instrument),
        }
    }
}

impl ModelRepository for InMemoryModelRepository {
    fn baseline(&self, instrument: Instrument) -> Result<Arc<dyn BaselineForecaster>, ForecastError> {
        let model: Arc<dyn BaselineForecaster> = self
            .baseline
            .get(&instrument)
            .cloned()
            .ok_or_else(|| Self::missing(instrument, Scenario::Baseline))?;
        Ok(model)
    }

    fn fusion(&self, instrument: Instrument) -> Result<Arc<dyn FusionForecaster>, ForecastError> {
        let model: Arc<dyn FusionForecaster> = self
            .fusion
            .get(&instrument)
            .cloned()
            .ok_or_else(|| Self::missing(instrument, Scenario::Fusion))?;
        Ok(model)
    }
}

/// Dataset source over an already built dataset.
pub struct InMemoryDataset {
    dataset: Arc<Dataset>,
    loads: AtomicUsize,
}

impl InMemoryDataset {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl DatasetSource for InMemoryDataset {
    fn load(&self) -> Result<Arc<Dataset>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.dataset.clone())
    }
}
