//! Model artifacts and inference

pub mod classifier;
pub mod inference;
pub mod loader;
pub mod scaler;

pub use classifier::{Classifier, ModelOutput, OnnxClassifier};
pub use inference::Predictor;
pub use loader::ModelLoader;
pub use scaler::StandardScaler;
