pub mod instrument;
pub mod observation;
