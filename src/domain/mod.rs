// Instruments and historical observations
pub mod market;

// Feature layout, windowing and scaling
pub mod ml;

// Forecast results
pub mod forecast;

// Offline evaluation and attribution tables
pub mod attribution;
pub mod evaluation;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
