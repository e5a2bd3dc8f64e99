//! Shape checks for decoded prediction requests.
//!
//! Validation is a pure function of the request and the active
//! [`ModelServingSpec`]; nothing here touches the model.

use crate::error::{Result, ServeError};
use crate::types::request::{ArrayError, NumericArray, PredictionRequest, ShapeDisplay};
use crate::variant::{InputShape, ModelServingSpec};

/// Request that satisfies the variant's shape contract
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedInput {
    /// Exactly `count` features, in request order
    Features(Vec<f64>),
    /// Pixel grid, either flattened `(h*w,)` or `(h, w)`
    Image(NumericArray),
}

/// Checks request payloads against a serving contract
pub struct RequestValidator {
    spec: &'static ModelServingSpec,
}

impl RequestValidator {
    pub fn new(spec: &'static ModelServingSpec) -> Self {
        Self { spec }
    }

    /// Validate a decoded request.
    pub fn validate(&self, request: &PredictionRequest) -> Result<ValidatedInput> {
        let field = self.spec.input.field();
        let raw = request
            .field(field)
            .ok_or_else(|| ServeError::InvalidInput(format!("Missing '{}' in request", field)))?;

        match self.spec.input {
            InputShape::Features { count } => {
                let array = NumericArray::from_json(raw).map_err(|_| {
                    ServeError::InvalidInput(format!(
                        "Invalid '{}': expected a sequence of numbers",
                        field
                    ))
                })?;
                // Nested sequences are flattened, so only the element count matters.
                if array.len() != count {
                    return Err(ServeError::InvalidInput(format!(
                        "Expected {} features, got {}",
                        count,
                        array.len()
                    )));
                }
                Ok(ValidatedInput::Features(array.values))
            }
            InputShape::Image { height, width } => {
                let array = NumericArray::from_json(raw).map_err(|e| match e {
                    ArrayError::NonNumeric => ServeError::InvalidInput(format!(
                        "Invalid '{}': expected a sequence of numbers",
                        field
                    )),
                    ArrayError::Ragged => ServeError::InvalidInput(format!(
                        "Invalid image shape: ragged sequence. {}",
                        expected_image_shapes(height, width)
                    )),
                })?;
                let flat = [height * width];
                let grid = [height, width];
                if array.shape != flat && array.shape != grid {
                    return Err(ServeError::InvalidInput(format!(
                        "Invalid image shape: {}. {}",
                        ShapeDisplay(&array.shape),
                        expected_image_shapes(height, width)
                    )));
                }
                Ok(ValidatedInput::Image(array))
            }
        }
    }
}

fn expected_image_shapes(height: usize, width: usize) -> String {
    format!("Expected ({},{}) or ({},)", height, width, height * width)
}
