// Forecast pipeline: window, scaling, dual-branch inference, formatting
pub mod forecasting;

// Model artifact loading
pub mod ml;

// Dashboard headline figures
pub mod overview;
