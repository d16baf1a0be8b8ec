//! Classifier seam and result post-processing.

use std::path::Path;

use thiserror::Error;

use crate::network::{InputType, ModelError, Network};
use crate::preprocess::{NormalizedTensor, INPUT_SIZE};

/// Number of digit classes.
pub const NUM_CLASSES: usize = 10;

/// Display names for the digit classes, index = digit.
pub const DIGIT_LABELS: [&str; NUM_CLASSES] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];

#[derive(Error, Debug, PartialEq)]
pub enum ClassifyError {
    #[error("classifier expects {expected} inputs, tensor has {got}")]
    InputSize { expected: usize, got: usize },

    #[error("classifier returned an empty distribution")]
    EmptyDistribution,

    #[error("classifier returned a non-finite probability at index {0}")]
    NotFinite(usize),

    #[error("classifier returned {value} at index {index}, outside [0, 1]")]
    NotAProbability { index: usize, value: f64 },

    #[error("classifier returned {classes} classes but has {labels} labels")]
    LabelCount { classes: usize, labels: usize },
}

/// Anything that maps a normalized tensor to a probability distribution
/// over the digit classes.
pub trait Classifier {
    fn classify(&self, tensor: &NormalizedTensor) -> Result<Vec<f64>, ClassifyError>;

    /// Class names, index-aligned with the distribution.
    fn labels(&self) -> Vec<String> {
        DIGIT_LABELS.iter().map(|s| s.to_string()).collect()
    }
}

impl Classifier for Network {
    fn classify(&self, tensor: &NormalizedTensor) -> Result<Vec<f64>, ClassifyError> {
        if self.input_size() != tensor.len() {
            return Err(ClassifyError::InputSize { expected: self.input_size(), got: tensor.len() });
        }
        Ok(self.predict(tensor.as_slice()))
    }

    fn labels(&self) -> Vec<String> {
        match self.metadata.as_ref().and_then(|m| m.output_labels.as_ref()) {
            Some(labels) if labels.len() == self.output_size() => labels.clone(),
            _ => DIGIT_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Loads a model file and checks it can consume the pipeline's 28×28
/// tensors and emit one probability per digit.
pub fn load_digit_model<P: AsRef<Path>>(path: P) -> Result<Network, ModelError> {
    let network = Network::load_json(path)?;
    let pixels = (INPUT_SIZE * INPUT_SIZE) as usize;
    network.validate(pixels, NUM_CLASSES)?;

    match network.metadata.as_ref().and_then(|m| m.input_type.as_ref()) {
        None => {}
        Some(InputType::ImageGrayscale { width, height })
            if *width == INPUT_SIZE && *height == INPUT_SIZE => {}
        Some(other) => return Err(ModelError::IncompatibleInput(other.clone())),
    }
    Ok(network)
}

/// The digit the classifier settled on and how sure it is.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Index of the winning class.
    pub label: usize,
    /// Display name of the winning class.
    pub name: String,
    /// Winning probability as a percentage in [0, 100].
    pub confidence: f64,
}

impl PredictionResult {
    /// Argmax of `distribution` (first index wins ties), with the maximum
    /// probability scaled to a percentage.
    ///
    /// Every value must be a probability in [0, 1] and there must be one
    /// label per class.
    pub fn from_distribution(distribution: &[f64], labels: &[String]) -> Result<PredictionResult, ClassifyError> {
        if let Some(i) = distribution.iter().position(|p| !p.is_finite()) {
            return Err(ClassifyError::NotFinite(i));
        }
        if let Some((index, &value)) = distribution.iter().enumerate().find(|(_, p)| !(0.0..=1.0).contains(*p)) {
            return Err(ClassifyError::NotAProbability { index, value });
        }
        if !distribution.is_empty() && distribution.len() != labels.len() {
            return Err(ClassifyError::LabelCount { classes: distribution.len(), labels: labels.len() });
        }
        let (label, best) = distribution
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &p)| match best {
                Some((_, b)) if b >= p => best,
                _ => Some((i, p)),
            })
            .ok_or(ClassifyError::EmptyDistribution)?;

        Ok(PredictionResult { label, name: labels[label].clone(), confidence: best * 100.0 })
    }

    /// Confidence rendered with two decimals, e.g. `"87.25%"`.
    pub fn confidence_text(&self) -> String {
        format!("{:.2}%", self.confidence)
    }
}
