pub mod feature_registry;
pub mod scaler;
pub mod window;
