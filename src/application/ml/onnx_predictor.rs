use crate::config::ModelEnvConfig;
use crate::domain::ports::{BaselineForecaster, FusionForecaster};
use anyhow::{Context, Result, anyhow, bail};
use ndarray::ArrayView3;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::{Session, SessionOutputs};
use ort::value::Tensor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Sequence model exported to ONNX.
///
/// Baseline artifacts declare one input, fusion artifacts two; the
/// session is shared behind a mutex because running it needs exclusive
/// access.
pub struct OnnxSequenceModel {
    session: Mutex<Session>,
    model_path: PathBuf,
    name: String,
    input_count: usize,
}

impl OnnxSequenceModel {
    pub fn load(model_path: &Path, settings: &ModelEnvConfig) -> Result<Self> {
        if !model_path.exists() {
            bail!("ONNX model file not found at {:?}", model_path);
        }

        let session = Session::builder()?
            .with_optimization_level(if settings.optimize_graph {
                GraphOptimizationLevel::Level3
            } else {
                GraphOptimizationLevel::Level1
            })?
            .with_intra_threads(settings.intra_threads)?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load ONNX model from {:?}", model_path))?;

        let input_count = session.inputs.len();
        let name = model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "onnx-model".to_string());

        info!(
            "Successfully loaded ONNX model {} from {:?} ({} inputs)",
            name, model_path, input_count
        );

        Ok(Self {
            session: Mutex::new(session),
            model_path: model_path.to_path_buf(),
            name,
            input_count,
        })
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn check_inputs(&self, provided: usize) -> Result<()> {
        if provided != self.input_count {
            bail!(
                "model {} declares {} inputs but {} were provided",
                self.name,
                self.input_count,
                provided
            );
        }
        Ok(())
    }
}

/// Flattens a `(batch, seq_len, features)` view into an owned tensor.
fn to_tensor(view: ArrayView3<'_, f32>) -> Result<Tensor<f32>> {
    let shape: Vec<usize> = view.shape().to_vec();
    let flat_data: Vec<f32> = view.iter().copied().collect();
    Tensor::from_array((shape.as_slice(), flat_data))
        .map_err(|e| anyhow!("Input value creation failed: {}", e))
}

fn first_output(outputs: &SessionOutputs) -> Result<Vec<f32>> {
    let output_value = outputs
        .iter()
        .next()
        .map(|(_, v)| v)
        .ok_or_else(|| anyhow!("No output found"))?;
    let data = output_value.try_extract_tensor::<f32>()?;
    Ok(data.1.to_vec())
}

impl BaselineForecaster for OnnxSequenceModel {
    fn forecast(&self, quantitative: ArrayView3<'_, f32>) -> Result<Vec<f32>> {
        self.check_inputs(1)?;
        let quant = to_tensor(quantitative)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Session lock failed: {}", e))?;
        let outputs = session.run(ort::inputs![quant])?;
        let prediction = first_output(&outputs)?;

        debug!("{} produced {:?}", self.name, prediction);
        Ok(prediction)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FusionForecaster for OnnxSequenceModel {
    fn forecast(
        &self,
        quantitative: ArrayView3<'_, f32>,
        qualitative: ArrayView3<'_, f32>,
    ) -> Result<Vec<f32>> {
        self.check_inputs(2)?;
        let quant = to_tensor(quantitative)?;
        let qual = to_tensor(qualitative)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Session lock failed: {}", e))?;
        let outputs = session.run(ort::inputs![quant, qual])?;
        let prediction = first_output(&outputs)?;

        debug!("{} produced {:?}", self.name, prediction);
        Ok(prediction)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
