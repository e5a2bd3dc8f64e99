//! Conversion of validated requests into model input tensors.
//!
//! Tabular variants become a single `[1, N]` row, standardized when the
//! variant ships a scaler. Images are reshaped to the grid, rescaled from the
//! 0-255 range when needed, and given batch and channel dimensions.

use crate::error::{Result, ServeError};
use crate::models::scaler::StandardScaler;
use crate::types::request::ShapeDisplay;
use crate::validator::ValidatedInput;
use crate::variant::{InputShape, ModelServingSpec};

/// Pixel intensity above which an image is assumed to be in the 0-255 range
pub const PIXEL_RESCALE_THRESHOLD: f64 = 1.0;
const PIXEL_MAX: f64 = 255.0;

/// Fixed-shape `f32` tensor ready for inference, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedInput {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl NormalizedInput {
    /// Shape as ONNX dimensions
    pub fn dims(&self) -> Vec<i64> {
        self.shape.iter().map(|&d| d as i64).collect()
    }
}

/// Turns validated requests into model inputs for one serving contract
pub struct FeatureNormalizer {
    spec: &'static ModelServingSpec,
}

impl FeatureNormalizer {
    pub fn new(spec: &'static ModelServingSpec) -> Self {
        Self { spec }
    }

    /// Normalize a validated request.
    ///
    /// Fails with `InvalidInput` if the input cannot be reshaped to the
    /// variant's tensor shape, and with `Internal` if a required scaler is
    /// missing or rejects the row.
    pub fn normalize(
        &self,
        input: ValidatedInput,
        scaler: Option<&StandardScaler>,
    ) -> Result<NormalizedInput> {
        let values = match (self.spec.input, input) {
            (InputShape::Features { count }, ValidatedInput::Features(features)) => {
                if features.len() != count {
                    return Err(ServeError::InvalidInput(format!(
                        "Expected {} features, got {}",
                        count,
                        features.len()
                    )));
                }
                if self.spec.requires_scaler {
                    let scaler = scaler.ok_or_else(|| {
                        ServeError::Internal("Feature scaler not loaded".to_string())
                    })?;
                    scaler.transform(&features)?
                } else {
                    features
                }
            }
            (InputShape::Image { height, width }, ValidatedInput::Image(image)) => {
                if image.len() != height * width {
                    return Err(ServeError::InvalidInput(format!(
                        "Cannot reshape image of shape {} to ({},{})",
                        ShapeDisplay(&image.shape),
                        height,
                        width
                    )));
                }
                let max = image.max().unwrap_or(0.0);
                if max > PIXEL_RESCALE_THRESHOLD {
                    image.values.into_iter().map(|v| v / PIXEL_MAX).collect()
                } else {
                    image.values
                }
            }
            (_, _) => {
                return Err(ServeError::Internal(format!(
                    "Input does not match the {} serving contract",
                    self.spec.variant
                )))
            }
        };

        let normalized = NormalizedInput {
            shape: self.spec.input.tensor_shape(),
            data: values.into_iter().map(|v| v as f32).collect(),
        };
        debug_assert_eq!(normalized.data.len(), normalized.shape.iter().product::<usize>());
        Ok(normalized)
    }
}
