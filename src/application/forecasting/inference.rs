use crate::domain::errors::ForecastError;
use crate::domain::forecast::{ScaledForecast, Scenario};
use crate::domain::ml::feature_registry::{FEATURE_COUNT, FORECAST_HORIZON, FeatureLayout};
use crate::domain::ports::{BaselineForecaster, FusionForecaster};
use ndarray::{Array2, Array3, Axis};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, error};

/// Runs the baseline and fusion models against the same scaled window.
#[derive(Debug, Clone)]
pub struct DualBranchRunner {
    layout: FeatureLayout,
    horizon: usize,
}

impl DualBranchRunner {
    pub fn new(layout: FeatureLayout) -> Self {
        Self {
            layout,
            horizon: FORECAST_HORIZON,
        }
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// Quantitative and qualitative column subsets, each with a leading
    /// batch dimension of 1.
    pub fn split(&self, scaled: &Array2<f64>) -> Result<(Array3<f32>, Array3<f32>), ForecastError> {
        if scaled.ncols() != FEATURE_COUNT {
            return Err(ForecastError::FeatureShapeMismatch {
                expected: FEATURE_COUNT,
                actual: scaled.ncols(),
            });
        }

        let batch = |indices: &[usize]| {
            scaled
                .select(Axis(1), indices)
                .mapv(|v| v as f32)
                .insert_axis(Axis(0))
        };

        Ok((batch(self.layout.quantitative()), batch(self.layout.qualitative())))
    }

    /// Returns both raw outputs, still in scaled units.
    pub fn run(
        &self,
        scaled: &Array2<f64>,
        baseline: &dyn BaselineForecaster,
        fusion: &dyn FusionForecaster,
    ) -> Result<ScaledForecast, ForecastError> {
        let (quantitative, qualitative) = self.split(scaled)?;
        debug!(
            "Running inference with quantitative {:?} and qualitative {:?}",
            quantitative.shape(),
            qualitative.shape()
        );

        let baseline_out = guarded(|| baseline.forecast(quantitative.view()));
        let baseline_out = self.check_output(Scenario::Baseline, baseline.name(), baseline_out)?;

        let fusion_out = guarded(|| fusion.forecast(quantitative.view(), qualitative.view()));
        let fusion_out = self.check_output(Scenario::Fusion, fusion.name(), fusion_out)?;

        Ok(ScaledForecast {
            baseline: baseline_out,
            fusion: fusion_out,
        })
    }

    fn check_output(
        &self,
        scenario: Scenario,
        model: &str,
        output: anyhow::Result<Vec<f32>>,
    ) -> Result<Vec<f32>, ForecastError> {
        let failed = |cause: String| {
            error!("{} model {} failed: {}", scenario, model, cause);
            ForecastError::InferenceFailed { scenario, cause }
        };

        let values = output.map_err(|e| failed(format!("{:#}", e)))?;

        if values.len() != self.horizon {
            return Err(failed(format!(
                "expected {} outputs, got {}",
                self.horizon,
                values.len()
            )));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(failed(format!("non-finite output {}", bad)));
        }

        Ok(values)
    }
}

/// Runs a model call, turning a panic in the backend into an error.
fn guarded<F>(call: F) -> anyhow::Result<Vec<f32>>
where
    F: FnOnce() -> anyhow::Result<Vec<f32>>,
{
    catch_unwind(AssertUnwindSafe(call))
        .unwrap_or_else(|payload| Err(anyhow::anyhow!("model panicked: {}", panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_registry::WINDOW_SIZE;
    use crate::infrastructure::mock::MockForecaster;

    fn window() -> Array2<f64> {
        Array2::from_shape_fn((WINDOW_SIZE, FEATURE_COUNT), |(i, j)| {
            (i * FEATURE_COUNT + j) as f64 / 1000.0
        })
    }

    #[test]
    fn test_split_shapes_and_columns() {
        let runner = DualBranchRunner::new(FeatureLayout::default());
        let (quant, qual) = runner.split(&window()).unwrap();

        assert_eq!(quant.shape(), &[1, WINDOW_SIZE, 7]);
        assert_eq!(qual.shape(), &[1, WINDOW_SIZE, 4]);
        assert_eq!(quant[[0, 2, 6]], ((2 * FEATURE_COUNT + 6) as f64 / 1000.0) as f32);
        assert_eq!(qual[[0, 2, 0]], ((2 * FEATURE_COUNT + 7) as f64 / 1000.0) as f32);
    }

    #[test]
    fn test_run_feeds_each_model_its_subset() {
        let runner = DualBranchRunner::new(FeatureLayout::default());
        let baseline = MockForecaster::fixed("base", vec![0.5, 0.52, 0.55]);
        let fusion = MockForecaster::fixed("fuse", vec![0.4, 0.41, 0.42]);

        let out = runner.run(&window(), &baseline, &fusion).unwrap();

        assert_eq!(out.baseline, vec![0.5, 0.52, 0.55]);
        assert_eq!(out.fusion, vec![0.4, 0.41, 0.42]);
        assert_eq!(baseline.seen_shapes(), vec![vec![vec![1, WINDOW_SIZE, 7]]]);
        assert_eq!(
            fusion.seen_shapes(),
            vec![vec![vec![1, WINDOW_SIZE, 7], vec![1, WINDOW_SIZE, 4]]]
        );
    }

    #[test]
    fn test_model_error_becomes_inference_failed() {
        let runner = DualBranchRunner::new(FeatureLayout::default());
        let baseline = MockForecaster::fixed("base", vec![0.5, 0.5, 0.5]);
        let fusion = MockForecaster::failing("fuse", "shape mismatch in attention layer");

        let err = runner.run(&window(), &baseline, &fusion).unwrap_err();
        match err {
            ForecastError::InferenceFailed { scenario, cause } => {
                assert_eq!(scenario, Scenario::Fusion);
                assert!(cause.contains("attention layer"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_output_length_is_rejected() {
        let runner = DualBranchRunner::new(FeatureLayout::default());
        let baseline = MockForecaster::fixed("base", vec![0.5]);
        let fusion = MockForecaster::fixed("fuse", vec![0.5, 0.5, 0.5]);

        let err = runner.run(&window(), &baseline, &fusion).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InferenceFailed {
                scenario: Scenario::Baseline,
                ..
            }
        ));
    }

    #[test]
    fn test_panicking_model_becomes_inference_failed() {
        let runner = DualBranchRunner::new(FeatureLayout::default());
        let baseline = MockForecaster::panicking("base", "index out of bounds: the len is 0");
        let fusion = MockForecaster::fixed("fuse", vec![0.5, 0.5, 0.5]);

        let err = runner.run(&window(), &baseline, &fusion).unwrap_err();
        match err {
            ForecastError::InferenceFailed { scenario, cause } => {
                assert_eq!(scenario, Scenario::Baseline);
                assert!(cause.starts_with("model panicked"));
                assert!(cause.contains("index out of bounds"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fusion.calls(), 0);
    }

    #[test]
    fn test_panicking_fusion_model_is_contained() {
        let runner = DualBranchRunner::new(FeatureLayout::default());
        let baseline = MockForecaster::fixed("base", vec![0.5, 0.5, 0.5]);
        let fusion = MockForecaster::panicking("fuse", "attention weights missing");

        let err = runner.run(&window(), &baseline, &fusion).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InferenceFailed {
                scenario: Scenario::Fusion,
                ..
            }
        ));
    }

    #[test]
    fn test_non_finite_output_is_rejected() {
        let runner = DualBranchRunner::new(FeatureLayout::default());
        let baseline = MockForecaster::fixed("base", vec![0.5, f32::NAN, 0.5]);
        let fusion = MockForecaster::fixed("fuse", vec![0.5, 0.5, 0.5]);

        assert!(runner.run(&window(), &baseline, &fusion).is_err());
    }
}
