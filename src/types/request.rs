//! Decoded prediction request payloads

use serde_json::{Map, Value};
use std::fmt;

/// Decoded `/predict` body.
///
/// Only the JSON object is kept; which field matters depends on the active
/// serving variant.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    body: Map<String, Value>,
}

/// Body could not be decoded into a JSON object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedBody;

impl PredictionRequest {
    /// Decode raw request bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, MalformedBody> {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Self::from_value(value),
            Err(_) => Err(MalformedBody),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, MalformedBody> {
        match value {
            Value::Object(body) => Ok(Self { body }),
            _ => Err(MalformedBody),
        }
    }

    /// Raw value of a named field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }
}

/// Why a JSON value is not a numeric array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayError {
    /// A leaf is a string, bool, null or object
    NonNumeric,
    /// Nested sequences have inconsistent lengths
    Ragged,
}

/// Dense numeric array decoded from nested JSON sequences, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
}

impl NumericArray {
    /// Decode a (possibly nested) JSON sequence of numbers.
    ///
    /// A bare number decodes to a zero-dimensional array holding one value.
    pub fn from_json(value: &Value) -> Result<Self, ArrayError> {
        let mut shape = Vec::new();
        let mut cursor = value;
        while let Value::Array(items) = cursor {
            shape.push(items.len());
            match items.first() {
                Some(first) => cursor = first,
                None => break,
            }
        }

        let mut values = Vec::with_capacity(shape.iter().product());
        collect(value, &shape, 0, &mut values)?;
        Ok(Self { shape, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }
}

fn collect(value: &Value, shape: &[usize], depth: usize, out: &mut Vec<f64>) -> Result<(), ArrayError> {
    match value {
        Value::Array(items) => {
            if shape.get(depth) != Some(&items.len()) {
                return Err(ArrayError::Ragged);
            }
            for item in items {
                collect(item, shape, depth + 1, out)?;
            }
            Ok(())
        }
        Value::Number(n) => {
            if depth != shape.len() {
                return Err(ArrayError::Ragged);
            }
            out.push(n.as_f64().ok_or(ArrayError::NonNumeric)?);
            Ok(())
        }
        _ => Err(ArrayError::NonNumeric),
    }
}

/// Shape formatted as a tuple, e.g. `(28, 28)` or `(784,)`
pub struct ShapeDisplay<'a>(pub &'a [usize]);

impl fmt::Display for ShapeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            [single] => write!(f, "({},)", single),
            dims => {
                let joined: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
                write!(f, "({})", joined.join(", "))
            }
        }
    }
}
