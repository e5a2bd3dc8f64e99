//! Startup loading of the model artifact and its serving state

use crate::config::ModelConfig;
use crate::models::classifier::{Classifier, OnnxClassifier};
use crate::models::scaler::StandardScaler;
use crate::variant::ModelServingSpec;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Immutable model artifact, shared read-only by every request
pub struct ModelArtifact {
    pub classifier: Arc<dyn Classifier>,
    /// Present only for variants that require feature scaling
    pub scaler: Option<StandardScaler>,
    pub loaded_at: DateTime<Utc>,
}

impl ModelArtifact {
    pub fn new(classifier: Arc<dyn Classifier>, scaler: Option<StandardScaler>) -> Self {
        Self {
            classifier,
            scaler,
            loaded_at: Utc::now(),
        }
    }
}

/// Process-wide serving state.
///
/// Written once by [`ModelLoader::load`]; `Ready` and `Failed` are terminal.
pub enum ServingState {
    Loading,
    Ready(Arc<ModelArtifact>),
    Failed(String),
}

impl ServingState {
    /// Ready state around an already-built artifact
    pub fn ready(artifact: ModelArtifact) -> Self {
        ServingState::Ready(Arc::new(artifact))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ServingState::Ready(_))
    }

    pub fn artifact(&self) -> Option<&Arc<ModelArtifact>> {
        match self {
            ServingState::Ready(artifact) => Some(artifact),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            ServingState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ServingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServingState::Loading => f.write_str("Loading"),
            ServingState::Ready(artifact) => f
                .debug_struct("Ready")
                .field("model", &artifact.classifier.name())
                .field("scaler", &artifact.scaler.is_some())
                .field("loaded_at", &artifact.loaded_at)
                .finish(),
            ServingState::Failed(reason) => f.debug_tuple("Failed").field(reason).finish(),
        }
    }
}

/// Loads the artifact (and scaler, when required) for one serving variant
pub struct ModelLoader {
    spec: &'static ModelServingSpec,
    model_path: PathBuf,
    scaler_path: Option<PathBuf>,
    onnx_threads: usize,
}

impl ModelLoader {
    pub fn new(spec: &'static ModelServingSpec, config: &ModelConfig) -> Self {
        Self {
            spec,
            model_path: config.resolved_model_path(),
            scaler_path: config.resolved_scaler_path(),
            onnx_threads: config.onnx_threads,
        }
    }

    /// Load everything once.
    ///
    /// Failures never escape: they become `ServingState::Failed` so the
    /// process keeps running and reports itself unhealthy.
    pub fn load(&self) -> ServingState {
        match self.try_load() {
            Ok(artifact) => {
                info!(
                    variant = %self.spec.variant,
                    model = %self.model_path.display(),
                    scaler = artifact.scaler.is_some(),
                    loaded_at = %artifact.loaded_at.to_rfc3339(),
                    "Model loaded successfully"
                );
                ServingState::ready(artifact)
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                error!(
                    variant = %self.spec.variant,
                    model = %self.model_path.display(),
                    error = %reason,
                    "Failed to load model"
                );
                ServingState::Failed(reason)
            }
        }
    }

    fn try_load(&self) -> Result<ModelArtifact> {
        if !self.model_path.exists() {
            bail!("Model file not found: {}", self.model_path.display());
        }

        let scaler = if self.spec.requires_scaler {
            let path = self
                .scaler_path
                .as_ref()
                .context("Variant requires a scaler but no scaler path is configured")?;
            Some(StandardScaler::load(path, self.spec.input.element_count())?)
        } else {
            None
        };

        let classifier = OnnxClassifier::load(
            &self.model_path,
            self.spec.variant.as_str(),
            self.onnx_threads,
        )?;

        Ok(ModelArtifact::new(Arc::new(classifier), scaler))
    }
}
