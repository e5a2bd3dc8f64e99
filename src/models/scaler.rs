//! Pre-fit feature standardizer
//!
//! The scaler artifact is exported next to the model by the training job as
//! JSON: per-feature `mean` plus either `scale` (standard deviation) or `var`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct ScalerArtifact {
    mean: Vec<f64>,
    #[serde(default)]
    scale: Option<Vec<f64>>,
    #[serde(default)]
    var: Option<Vec<f64>>,
}

/// Linear standardization `(x - mean) / scale`, fitted at training time
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Build a scaler from fitted statistics.
    ///
    /// Zero scales (constant training features) are replaced by 1.0.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        if mean.len() != scale.len() {
            bail!(
                "Scaler has {} means but {} scales",
                mean.len(),
                scale.len()
            );
        }
        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();
        Ok(Self { mean, scale })
    }

    /// Load a scaler artifact and check it against the expected feature count
    pub fn load<P: AsRef<Path>>(path: P, feature_count: usize) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read scaler from {}", path.display()))?;
        let artifact: ScalerArtifact = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse scaler from {}", path.display()))?;

        let scale = match (artifact.scale, artifact.var) {
            (Some(scale), _) => scale,
            (None, Some(var)) => var.into_iter().map(f64::sqrt).collect(),
            (None, None) => bail!("Scaler artifact has neither 'scale' nor 'var'"),
        };
        let scaler = Self::new(artifact.mean, scale)?;

        if scaler.feature_count() != feature_count {
            bail!(
                "Scaler fitted on {} features, model expects {}",
                scaler.feature_count(),
                feature_count
            );
        }

        info!(path = %path.display(), features = feature_count, "Scaler loaded");
        Ok(scaler)
    }

    pub fn feature_count(&self) -> usize {
        self.mean.len()
    }

    /// Standardize one row of features
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        if features.len() != self.feature_count() {
            bail!(
                "X has {} features, but StandardScaler is expecting {} features as input",
                features.len(),
                self.feature_count()
            );
        }
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }
}
