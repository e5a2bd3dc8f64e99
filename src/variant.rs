//! Serving contracts for the supported classifiers.
//!
//! The Iris, Wine and Fashion-MNIST models differ only in input shape,
//! preprocessing and label table. Those differences are carried by a
//! [`ModelServingSpec`] so validation, normalization and prediction run
//! through a single code path.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Label reported when the model emits an index outside the label table.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Supported serving variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// 4-feature Iris classifier
    #[default]
    Iris,
    /// 13-feature Wine classifier with a companion scaler
    Wine,
    /// 28x28 Fashion-MNIST image classifier
    Fashion,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Iris => "iris",
            Variant::Wine => "wine",
            Variant::Fashion => "fashion",
        }
    }

    /// Serving contract for this variant
    pub fn spec(&self) -> &'static ModelServingSpec {
        match self {
            Variant::Iris => &IRIS,
            Variant::Wine => &WINE,
            Variant::Fashion => &FASHION,
        }
    }

    /// Default location of the model artifact
    pub fn default_model_path(&self) -> PathBuf {
        PathBuf::from(format!("models/{}.onnx", self.as_str()))
    }

    /// Default location of the scaler artifact, if the variant needs one
    pub fn default_scaler_path(&self) -> Option<PathBuf> {
        self.spec()
            .requires_scaler
            .then(|| PathBuf::from(format!("models/{}_scaler.json", self.as_str())))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected shape of the request payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    /// Ordered feature vector under `features`
    Features { count: usize },
    /// Single-channel image under `image`, flattened or 2-D
    Image { height: usize, width: usize },
}

impl InputShape {
    /// Number of scalar values the model consumes
    pub fn element_count(&self) -> usize {
        match *self {
            InputShape::Features { count } => count,
            InputShape::Image { height, width } => height * width,
        }
    }

    /// Tensor shape handed to the model, batch dimension included
    pub fn tensor_shape(&self) -> Vec<usize> {
        match *self {
            InputShape::Features { count } => vec![1, count],
            InputShape::Image { height, width } => vec![1, height, width, 1],
        }
    }

    /// Request field carrying the input
    pub fn field(&self) -> &'static str {
        match self {
            InputShape::Features { .. } => "features",
            InputShape::Image { .. } => "image",
        }
    }
}

/// Per-variant serving configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ModelServingSpec {
    pub variant: Variant,
    pub input: InputShape,
    /// Features must pass through the pre-fit scaler before inference
    pub requires_scaler: bool,
    /// Class index to label table
    pub class_labels: &'static [&'static str],
    /// Responses carry `confidence` and `all_probabilities`
    pub reports_confidence: bool,
}

impl ModelServingSpec {
    /// Map a class index to its label, falling back to [`UNKNOWN_LABEL`].
    pub fn label(&self, index: i64) -> &'static str {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.class_labels.get(i))
            .copied()
            .unwrap_or(UNKNOWN_LABEL)
    }

    pub fn class_count(&self) -> usize {
        self.class_labels.len()
    }
}

pub const IRIS: ModelServingSpec = ModelServingSpec {
    variant: Variant::Iris,
    input: InputShape::Features { count: 4 },
    requires_scaler: false,
    class_labels: &["setosa", "versicolor", "virginica"],
    reports_confidence: false,
};

pub const WINE: ModelServingSpec = ModelServingSpec {
    variant: Variant::Wine,
    input: InputShape::Features { count: 13 },
    requires_scaler: true,
    class_labels: &["class_0", "class_1", "class_2"],
    reports_confidence: false,
};

pub const FASHION: ModelServingSpec = ModelServingSpec {
    variant: Variant::Fashion,
    input: InputShape::Image {
        height: 28,
        width: 28,
    },
    requires_scaler: false,
    class_labels: &[
        "T-shirt/top",
        "Trouser",
        "Pullover",
        "Dress",
        "Coat",
        "Sandal",
        "Shirt",
        "Sneaker",
        "Bag",
        "Ankle boot",
    ],
    reports_confidence: true,
};
