//! Request-level error taxonomy

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure of a single prediction request.
///
/// Every variant is terminal for the request; nothing is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServeError {
    /// The model artifact failed to load at startup
    #[error("model not loaded")]
    ModelUnavailable,

    /// Missing field, wrong feature count or wrong image shape
    #[error("{0}")]
    InvalidInput(String),

    /// Normalization or inference failure
    #[error("{0}")]
    Internal(String),
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ServeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ServeError {
    fn from(err: anyhow::Error) -> Self {
        ServeError::Internal(format!("{:#}", err))
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match &self {
            ServeError::ModelUnavailable => {
                tracing::warn!("Prediction rejected, model not loaded");
            }
            ServeError::InvalidInput(msg) => {
                tracing::debug!(detail = %msg, "Invalid prediction request");
            }
            ServeError::Internal(msg) => {
                tracing::error!(detail = %msg, "Prediction error");
            }
        }

        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServeError>;
