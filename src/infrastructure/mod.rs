pub mod dataset;
pub mod mock;
pub mod reports;
