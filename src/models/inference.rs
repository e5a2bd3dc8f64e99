//! Prediction: run the classifier and map its output to a labelled result

use crate::error::{Result, ServeError};
use crate::models::classifier::Classifier;
use crate::normalizer::NormalizedInput;
use crate::types::response::round_to;
use crate::variant::ModelServingSpec;
use tracing::debug;

/// Decimal places kept for confidence and probabilities
const PROBABILITY_PLACES: i32 = 4;

/// Labelled model decision, before timing is attached
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class_index: i64,
    pub class_label: &'static str,
    pub confidence: Option<f64>,
    pub probabilities: Option<Vec<f64>>,
}

/// Runs inference for one serving contract
pub struct Predictor {
    spec: &'static ModelServingSpec,
}

impl Predictor {
    pub fn new(spec: &'static ModelServingSpec) -> Self {
        Self { spec }
    }

    /// Score a normalized input.
    ///
    /// Any classifier failure is reported as `Internal` with the underlying
    /// message. Indices outside the label table map to `"unknown"`.
    pub fn predict(
        &self,
        input: &NormalizedInput,
        classifier: &dyn Classifier,
    ) -> Result<Prediction> {
        let output = classifier
            .infer(input)
            .map_err(|e| ServeError::Internal(format!("{:#}", e)))?;

        let class_index = if self.spec.reports_confidence {
            output.argmax()
        } else {
            output.label.or_else(|| output.argmax())
        };
        let class_index = class_index.ok_or_else(|| {
            ServeError::Internal(format!(
                "Model {} returned no usable class output",
                classifier.name()
            ))
        })?;

        let (confidence, probabilities) = if self.spec.reports_confidence {
            let probs = output.probabilities.as_deref().unwrap_or_default();
            let confidence = usize::try_from(class_index)
                .ok()
                .and_then(|i| probs.get(i))
                .map(|&p| round_to(p as f64, PROBABILITY_PLACES));
            let rounded: Vec<f64> = probs
                .iter()
                .map(|&p| round_to(p as f64, PROBABILITY_PLACES))
                .collect();
            (confidence, Some(rounded))
        } else {
            (None, None)
        };

        let class_label = self.spec.label(class_index);
        debug!(
            model = %classifier.name(),
            class_index = class_index,
            class_label = class_label,
            "Prediction mapped"
        );

        Ok(Prediction {
            class_index,
            class_label,
            confidence,
            probabilities,
        })
    }
}
