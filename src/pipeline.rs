//! Request pipeline: validate, normalize, predict, build the response.

use crate::error::{Result, ServeError};
use crate::models::inference::Predictor;
use crate::models::loader::ServingState;
use crate::normalizer::FeatureNormalizer;
use crate::types::request::PredictionRequest;
use crate::types::response::{round_to, PredictionResult};
use crate::validator::RequestValidator;
use crate::variant::ModelServingSpec;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Single prediction path shared by every serving variant
#[derive(Clone)]
pub struct ServingPipeline {
    spec: &'static ModelServingSpec,
    state: Arc<ServingState>,
}

impl ServingPipeline {
    pub fn new(spec: &'static ModelServingSpec, state: Arc<ServingState>) -> Self {
        Self { spec, state }
    }

    /// Handle a raw `/predict` body.
    ///
    /// The timer starts before the body is decoded and stops after
    /// prediction. Without a loaded model the request is rejected before
    /// any validation.
    pub fn handle(&self, body: &[u8]) -> Result<PredictionResult> {
        let start = Instant::now();

        let artifact = self.state.artifact().ok_or(ServeError::ModelUnavailable)?;

        let request = PredictionRequest::from_slice(body).map_err(|_| {
            ServeError::InvalidInput("Request body must be a JSON object".to_string())
        })?;

        let validated = RequestValidator::new(self.spec).validate(&request)?;
        let input =
            FeatureNormalizer::new(self.spec).normalize(validated, artifact.scaler.as_ref())?;
        let prediction = Predictor::new(self.spec).predict(&input, artifact.classifier.as_ref())?;

        let inference_time_ms = round_to(start.elapsed().as_secs_f64() * 1000.0, 2);

        match prediction.confidence {
            Some(confidence) => info!(
                variant = %self.spec.variant,
                prediction = prediction.class_index,
                class_name = prediction.class_label,
                confidence = confidence,
                inference_time_ms = inference_time_ms,
                "Prediction served"
            ),
            None => info!(
                variant = %self.spec.variant,
                prediction = prediction.class_index,
                class_name = prediction.class_label,
                inference_time_ms = inference_time_ms,
                "Prediction served"
            ),
        }

        Ok(PredictionResult {
            prediction: prediction.class_index,
            class_name: prediction.class_label.to_string(),
            confidence: prediction.confidence,
            all_probabilities: prediction.probabilities,
            inference_time_ms,
        })
    }
}
