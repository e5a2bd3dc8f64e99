//! Prometheus exposition for the `/metrics` endpoint.
//!
//! The exposition is a static placeholder: the series exist so scrapers can
//! be wired up, but no counter is incremented by request traffic and every
//! sample reads zero.

use crate::variant::Variant;

/// Content type of the exposition
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

const PREDICTIONS_TOTAL: &str = "# HELP model_predictions_total Total number of predictions
# TYPE model_predictions_total counter
model_predictions_total 0
";

const PREDICTIONS_TOTAL_SHORT: &str = "# HELP model_predictions_total Total predictions
# TYPE model_predictions_total counter
model_predictions_total 0
";

const INFERENCE_DURATION: &str = "
# HELP model_inference_duration_seconds Time spent processing predictions
# TYPE model_inference_duration_seconds histogram
model_inference_duration_seconds_bucket{le=\"0.005\"} 0
model_inference_duration_seconds_bucket{le=\"0.01\"} 0
model_inference_duration_seconds_bucket{le=\"0.025\"} 0
model_inference_duration_seconds_bucket{le=\"0.05\"} 0
model_inference_duration_seconds_bucket{le=\"0.1\"} 0
model_inference_duration_seconds_bucket{le=\"+Inf\"} 0
model_inference_duration_seconds_sum 0
model_inference_duration_seconds_count 0
";

/// Static metrics exposition for one serving variant
pub struct MetricsReporter {
    body: String,
}

impl MetricsReporter {
    pub fn new(variant: Variant) -> Self {
        let body = match variant {
            Variant::Iris => format!("{}{}", PREDICTIONS_TOTAL, INFERENCE_DURATION),
            Variant::Wine | Variant::Fashion => PREDICTIONS_TOTAL_SHORT.to_string(),
        };
        Self { body }
    }

    /// Exposition text
    pub fn render(&self) -> &str {
        &self.body
    }
}
