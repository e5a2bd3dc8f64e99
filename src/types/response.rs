//! Response payloads

use serde::{Deserialize, Serialize};

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Successful `/predict` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted class index
    pub prediction: i64,

    /// Label for the predicted index, `"unknown"` when out of range
    pub class_name: String,

    /// Probability of the predicted class (image variant only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Full per-class probability vector (image variant only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_probabilities: Option<Vec<f64>>,

    /// Wall-clock request handling time, 2 decimal places
    pub inference_time_ms: f64,
}

/// `/health` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl HealthReport {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            reason: None,
        }
    }

    pub fn unhealthy(reason: &str) -> Self {
        Self {
            status: "unhealthy".to_string(),
            reason: Some(reason.to_string()),
        }
    }
}
