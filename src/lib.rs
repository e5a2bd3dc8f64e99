//! Classifier Serving Library
//!
//! Serves predictions from a pre-trained Iris, Wine or Fashion-MNIST model
//! over HTTP. The model artifact is loaded once at startup; every request
//! runs the same validate, normalize, predict pipeline, parameterized by the
//! variant's serving contract.

pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod server;
pub mod types;
pub mod validator;
pub mod variant;

pub use config::AppConfig;
pub use error::ServeError;
pub use models::loader::{ModelArtifact, ModelLoader, ServingState};
pub use pipeline::ServingPipeline;
pub use server::{create_router, AppState};
pub use types::{HealthReport, PredictionResult};
pub use variant::{ModelServingSpec, Variant};
