//! HTTP handlers for `/health`, `/predict` and `/metrics`

use super::AppState;
use crate::error::ServeError;
use crate::health::report as health_report;
use crate::metrics::CONTENT_TYPE;
use crate::types::response::{HealthReport, PredictionResult};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{info_span, Instrument};
use uuid::Uuid;

pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    let (status, report) = health_report(&state.serving);
    (status, Json(report))
}

/// Run the request pipeline off the async runtime; inference is blocking.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PredictionResult>, ServeError> {
    let span = info_span!("predict", request_id = %Uuid::new_v4());
    let pipeline = state.pipeline.clone();

    let worker_span = span.clone();
    let result = tokio::task::spawn_blocking(move || {
        let _guard = worker_span.enter();
        pipeline.handle(&body)
    })
    .instrument(span)
    .await
    .map_err(|e| ServeError::Internal(format!("Inference task failed: {}", e)))??;

    Ok(Json(result))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        state.metrics.render().to_string(),
    )
}
