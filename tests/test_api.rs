//! Integration test: HTTP contract of /health, /predict and /metrics
//! Drives the router in-process with stand-in classifiers.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use classifier_serving::models::{Classifier, ModelOutput, StandardScaler};
use classifier_serving::normalizer::NormalizedInput;
use classifier_serving::{create_router, AppState, ModelArtifact, ServingState, Variant};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Short petals are setosa, long ones virginica.
struct PetalRule;

impl Classifier for PetalRule {
    fn name(&self) -> &str {
        "petal-rule"
    }

    fn infer(&self, input: &NormalizedInput) -> anyhow::Result<ModelOutput> {
        let label = match input.data[2] {
            l if l < 2.5 => 0,
            l if l < 5.0 => 1,
            _ => 2,
        };
        Ok(ModelOutput {
            label: Some(label),
            probabilities: None,
        })
    }
}

/// Always returns class 1 for wine.
struct ConstantWine;

impl Classifier for ConstantWine {
    fn name(&self) -> &str {
        "constant"
    }

    fn infer(&self, _input: &NormalizedInput) -> anyhow::Result<ModelOutput> {
        Ok(ModelOutput {
            label: Some(1),
            probabilities: Some(vec![0.1, 0.8, 0.1]),
        })
    }
}

/// Image stand-in that puts most mass on "Sneaker".
struct SneakerModel;

impl Classifier for SneakerModel {
    fn name(&self) -> &str {
        "sneaker"
    }

    fn infer(&self, input: &NormalizedInput) -> anyhow::Result<ModelOutput> {
        assert_eq!(input.shape, vec![1, 28, 28, 1]);
        let mut probs = vec![0.02_f32; 10];
        probs[7] = 0.82;
        Ok(ModelOutput {
            label: None,
            probabilities: Some(probs),
        })
    }
}

/// Model that rejects every input.
struct BrokenModel;

impl Classifier for BrokenModel {
    fn name(&self) -> &str {
        "broken"
    }

    fn infer(&self, _input: &NormalizedInput) -> anyhow::Result<ModelOutput> {
        anyhow::bail!("Unexpected input data type")
    }
}

fn ready_app(
    variant: Variant,
    classifier: impl Classifier + 'static,
    scaler: Option<StandardScaler>,
) -> axum::Router {
    let artifact = ModelArtifact::new(Arc::new(classifier), scaler);
    let state = AppState::new(variant.spec(), ServingState::ready(artifact));
    create_router(Arc::new(state))
}

fn failed_app(variant: Variant) -> axum::Router {
    let state = AppState::new(
        variant.spec(),
        ServingState::Failed("Model file not found: models/iris.onnx".to_string()),
    );
    create_router(Arc::new(state))
}

fn wine_scaler() -> StandardScaler {
    StandardScaler::new(vec![0.0; 13], vec![1.0; 13]).unwrap()
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post_predict(app: axum::Router, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_ready() {
    let (status, body) = get(ready_app(Variant::Iris, PetalRule, None), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_health_failed_load() {
    let (status, body) = get(failed_app(Variant::Iris), "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({"status": "unhealthy", "reason": "model not loaded"})
    );
}

#[tokio::test]
async fn test_health_independent_of_request_history() {
    let app = ready_app(Variant::Iris, BrokenModel, None);
    let (status, _) = post_predict(app.clone(), json!({"features": [1, 2, 3, 4]}).to_string()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _) = post_predict(app.clone(), "{}".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Tabular prediction
// ============================================================================

#[tokio::test]
async fn test_iris_setosa() {
    let app = ready_app(Variant::Iris, PetalRule, None);
    let (status, body) =
        post_predict(app, json!({"features": [5.1, 3.5, 1.4, 0.2]}).to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], 0);
    assert_eq!(body["class_name"], "setosa");
    assert!(body["inference_time_ms"].as_f64().unwrap() >= 0.0);
    assert!(body.get("confidence").is_none());
    assert!(body.get("all_probabilities").is_none());
}

#[tokio::test]
async fn test_inference_time_has_two_decimals() {
    let app = ready_app(Variant::Iris, PetalRule, None);
    let (_, body) = post_predict(app, json!({"features": [6.3, 3.3, 6.0, 2.5]}).to_string()).await;

    let ms = body["inference_time_ms"].as_f64().unwrap();
    assert!(ms >= 0.0);
    assert_eq!((ms * 100.0).round() / 100.0, ms);
    assert_eq!(body["class_name"], "virginica");
}

#[tokio::test]
async fn test_iris_missing_features() {
    let app = ready_app(Variant::Iris, PetalRule, None);
    let (status, body) = post_predict(app, json!({"data": [1, 2, 3, 4]}).to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing 'features' in request"}));
}

#[tokio::test]
async fn test_wine_wrong_length() {
    let app = ready_app(Variant::Wine, ConstantWine, Some(wine_scaler()));
    let (status, body) = post_predict(app, json!({"features": [1, 2, 3]}).to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Expected 13 features, got 3"}));
}

#[tokio::test]
async fn test_wine_off_by_one_lengths() {
    for count in [12, 14] {
        let app = ready_app(Variant::Wine, ConstantWine, Some(wine_scaler()));
        let (status, body) =
            post_predict(app, json!({ "features": vec![1.0; count] }).to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("13"));
        assert!(message.contains(&count.to_string()));
    }
}

#[tokio::test]
async fn test_wine_success() {
    let app = ready_app(Variant::Wine, ConstantWine, Some(wine_scaler()));
    let (status, body) = post_predict(app, json!({ "features": vec![13.2; 13] }).to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], 1);
    assert_eq!(body["class_name"], "class_1");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = ready_app(Variant::Iris, PetalRule, None);
    let (status, body) = post_predict(app, "not valid json".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_model_failure_is_internal_error() {
    let app = ready_app(Variant::Iris, BrokenModel, None);
    let (status, body) = post_predict(app, json!({"features": [1, 2, 3, 4]}).to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Unexpected input data type"}));
}

#[tokio::test]
async fn test_predict_without_model_is_unavailable() {
    let (status, body) =
        post_predict(failed_app(Variant::Iris), json!({"features": [1]}).to_string()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"error": "model not loaded"}));
}

// ============================================================================
// Image prediction
// ============================================================================

#[tokio::test]
async fn test_fashion_reports_probabilities() {
    let app = ready_app(Variant::Fashion, SneakerModel, None);
    let (status, body) = post_predict(app, json!({ "image": vec![128; 784] }).to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], 7);
    assert_eq!(body["class_name"], "Sneaker");
    assert_eq!(body["confidence"].as_f64().unwrap(), 0.82);
    let probs = body["all_probabilities"].as_array().unwrap();
    assert_eq!(probs.len(), 10);
    assert_eq!(probs[0].as_f64().unwrap(), 0.02);
}

#[tokio::test]
async fn test_fashion_grid_input() {
    let app = ready_app(Variant::Fashion, SneakerModel, None);
    let (status, body) =
        post_predict(app, json!({ "image": vec![vec![0.5; 28]; 28] }).to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["class_name"], "Sneaker");
}

#[tokio::test]
async fn test_fashion_bad_shape() {
    let app = ready_app(Variant::Fashion, SneakerModel, None);
    let (status, body) = post_predict(app, json!({ "image": vec![0; 100] }).to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "Invalid image shape: (100,). Expected (28,28) or (784,)"})
    );
}

#[tokio::test]
async fn test_fashion_missing_image() {
    let app = ready_app(Variant::Fashion, SneakerModel, None);
    let (status, body) = post_predict(app, json!({"features": [1, 2]}).to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing 'image' in request"}));
}

// ============================================================================
// Metrics
// ============================================================================

#[tokio::test]
async fn test_metrics_placeholder_stays_at_zero() {
    let app = ready_app(Variant::Iris, PetalRule, None);
    for _ in 0..3 {
        let (status, _) =
            post_predict(app.clone(), json!({"features": [5.1, 3.5, 1.4, 0.2]}).to_string()).await;
        assert_eq!(status, StatusCode::OK);
    }

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; charset=utf-8"
    );
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    // Intentional placeholder: counters are not wired to traffic.
    assert!(text.contains("model_predictions_total 0\n"));
    assert!(text.contains("model_inference_duration_seconds_count 0"));
}

#[tokio::test]
async fn test_metrics_available_without_model() {
    let (status, text) = get(failed_app(Variant::Fashion), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("model_predictions_total 0"));
}
