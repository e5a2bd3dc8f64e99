//! Health reporting over the cached serving state

use crate::models::loader::ServingState;
use crate::types::response::HealthReport;
use axum::http::StatusCode;

/// Reason reported whenever the model is not ready
pub const NOT_LOADED_REASON: &str = "model not loaded";

/// Health for the current state. No I/O: reads the state loaded at startup.
pub fn report(state: &ServingState) -> (StatusCode, HealthReport) {
    if state.is_ready() {
        (StatusCode::OK, HealthReport::healthy())
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthReport::unhealthy(NOT_LOADED_REASON),
        )
    }
}
