pub mod formatter;
pub mod inference;
pub mod pipeline;

pub use formatter::format_forecast;
pub use inference::DualBranchRunner;
pub use pipeline::ForecastPipeline;
