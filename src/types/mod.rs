//! Type definitions for the serving pipeline

pub mod request;
pub mod response;

pub use request::{NumericArray, PredictionRequest};
pub use response::{HealthReport, PredictionResult};
