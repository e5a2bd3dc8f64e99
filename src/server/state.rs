//! Application state shared across handlers

use crate::metrics::MetricsReporter;
use crate::models::loader::ServingState;
use crate::pipeline::ServingPipeline;
use crate::variant::ModelServingSpec;
use std::sync::Arc;

/// Read-only state built once at startup
pub struct AppState {
    pub serving: Arc<ServingState>,
    pub pipeline: ServingPipeline,
    pub metrics: MetricsReporter,
}

impl AppState {
    pub fn new(spec: &'static ModelServingSpec, serving: ServingState) -> Self {
        let serving = Arc::new(serving);
        Self {
            pipeline: ServingPipeline::new(spec, serving.clone()),
            metrics: MetricsReporter::new(spec.variant),
            serving,
        }
    }
}
