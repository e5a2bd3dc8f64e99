//! Classifier abstraction and its ONNX Runtime implementation

use crate::normalizer::NormalizedInput;
use anyhow::{anyhow, Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Raw model output for a single-row batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelOutput {
    /// Class index emitted directly by the model, if it has a label output
    pub label: Option<i64>,
    /// Per-class probabilities, ordered by class index
    pub probabilities: Option<Vec<f32>>,
}

impl ModelOutput {
    /// Index of the most probable class
    pub fn argmax(&self) -> Option<i64> {
        self.probabilities.as_ref().and_then(|probs| {
            probs
                .iter()
                .enumerate()
                .fold(None, |best: Option<(usize, f32)>, (i, &p)| match best {
                    Some((_, bp)) if bp >= p => best,
                    _ => Some((i, p)),
                })
                .map(|(i, _)| i as i64)
        })
    }
}

/// A loaded model that can score one normalized input
pub trait Classifier: Send + Sync {
    /// Human-readable model name for logs
    fn name(&self) -> &str;

    /// Run inference on one normalized input
    fn infer(&self, input: &NormalizedInput) -> Result<ModelOutput>;
}

/// Classifier backed by an ONNX Runtime session
pub struct OnnxClassifier {
    name: String,
    /// Session runs need exclusive access
    session: Mutex<Session>,
    input_name: String,
}

impl OnnxClassifier {
    /// Load an ONNX model from file
    pub fn load<P: AsRef<Path>>(path: P, name: &str, onnx_threads: usize) -> Result<Self> {
        let path = path.as_ref();

        info!(model = %name, path = %path.display(), threads = onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "input".to_string());

        info!(
            model = %name,
            input = %input_name,
            outputs = session.outputs.len(),
            "ONNX session ready"
        );

        Ok(Self {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn infer(&self, input: &NormalizedInput) -> Result<ModelOutput> {
        let input_tensor = Tensor::from_array((input.dims(), input.data.clone()))
            .context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Lock error: {}", e))?;

        let outputs = session.run(ort::inputs![self.input_name.as_str() => input_tensor])?;
        let output = read_outputs(&outputs, &self.name)?;

        debug!(model = %self.name, label = ?output.label, "Inference complete");
        Ok(output)
    }
}

/// One usable output of a session run
#[derive(Debug, Clone, PartialEq)]
enum ExtractedOutput {
    Label(Option<i64>),
    Probabilities(Vec<f32>),
}

/// Collect the label and probability outputs.
///
/// Exporters differ: tree models emit an `int64` label plus either a
/// probability tensor or a `seq(map(int64, float))`, Keras graphs emit a
/// single probability tensor.
fn read_outputs(outputs: &SessionOutputs, model_name: &str) -> Result<ModelOutput> {
    let mut extracted = Vec::new();

    for (name, output) in outputs.iter() {
        if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
            extracted.push(ExtractedOutput::Label(data.first().copied()));
            continue;
        }

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            extracted.push(ExtractedOutput::Probabilities(first_row(shape, data)));
            continue;
        }

        let dtype = output.dtype();
        if DynSequenceValueType::can_downcast(&dtype) {
            match extract_from_sequence_map(&output) {
                Ok(probs) => extracted.push(ExtractedOutput::Probabilities(probs)),
                Err(e) => debug!(model = %model_name, output = %name, error = %e, "Skipping output"),
            }
        }
    }

    merge_outputs(extracted, model_name)
}

/// First label and first probability row win, in graph output order
fn merge_outputs(
    extracted: impl IntoIterator<Item = ExtractedOutput>,
    model_name: &str,
) -> Result<ModelOutput> {
    let mut result = ModelOutput::default();

    for output in extracted {
        match output {
            ExtractedOutput::Label(label) => {
                if result.label.is_none() {
                    result.label = label;
                }
            }
            ExtractedOutput::Probabilities(probs) => {
                if result.probabilities.is_none() {
                    result.probabilities = Some(probs);
                }
            }
        }
    }

    if result.label.is_none() && result.probabilities.is_none() {
        return Err(anyhow!("Model {} produced no label or probability output", model_name));
    }
    Ok(result)
}

/// Probabilities of the first (only) row of a `[batch, classes]` tensor
fn first_row(shape: &[i64], data: &[f32]) -> Vec<f32> {
    let classes = shape
        .last()
        .map(|&c| c.max(0) as usize)
        .unwrap_or(data.len())
        .min(data.len());
    data[..classes].to_vec()
}

/// Probabilities from a ZipMap `seq(map(int64, float))` output
fn extract_from_sequence_map(output: &ort::value::DynValue) -> Result<Vec<f32>> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow!("Failed to downcast to sequence: {}", e))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
    let map_value = maps.first().ok_or_else(|| anyhow!("Empty sequence"))?;

    Ok(ordered_by_class(map_value.try_extract_key_values::<i64, f32>()?))
}

/// ZipMap entries come back in hash order
fn ordered_by_class(mut kv_pairs: Vec<(i64, f32)>) -> Vec<f32> {
    kv_pairs.sort_by_key(|(class_id, _)| *class_id);
    kv_pairs.into_iter().map(|(_, prob)| prob).collect()
}
