pub mod model_registry;
pub mod onnx_predictor;

pub use model_registry::FileModelRepository;
pub use onnx_predictor::OnnxSequenceModel;
