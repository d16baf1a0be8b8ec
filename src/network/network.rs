use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::layers::dense::Layer;
use crate::network::metadata::{InputType, ModelMetadata};

/// Reasons a model file cannot be used for inference.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("could not read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("model file is not a valid network: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model has no layers")]
    Empty,

    #[error("layer {layer}: weights/biases do not match the declared shape")]
    MalformedLayer { layer: usize },

    #[error("layer {layer} expects {expected} inputs but receives {got}")]
    LayerMismatch { layer: usize, expected: usize, got: usize },

    #[error("model takes {got} inputs, expected {expected}")]
    InputSize { expected: usize, got: usize },

    #[error("model produces {got} outputs, expected {expected}")]
    OutputSize { expected: usize, got: usize },

    #[error("model declares input {0:?}, which this pipeline does not produce")]
    IncompatibleInput(InputType),
}

/// A stack of dense layers plus optional metadata, as stored in model JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl Network {
    pub fn new(layers: Vec<Layer>) -> Network {
        Network { layers, metadata: None }
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Network {
        self.metadata = Some(metadata);
        self
    }

    /// Read-only forward pass.
    pub fn predict(&self, input: &[f64]) -> Vec<f64> {
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.forward(&current);
        }
        current
    }

    /// Number of values the first layer consumes (0 for an empty network).
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |l| l.input_size())
    }

    /// Number of values the last layer produces (0 for an empty network).
    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.size)
    }

    /// Checks that every layer is internally consistent, that consecutive
    /// layers chain, and that the network maps `inputs` values to `outputs`.
    ///
    /// A network that passes cannot panic in `predict` when fed `inputs`
    /// values.
    pub fn validate(&self, inputs: usize, outputs: usize) -> Result<(), ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::Empty);
        }
        for (i, layer) in self.layers.iter().enumerate() {
            let w = &layer.weights;
            let b = &layer.biases;
            if !w.is_consistent() || !b.is_consistent()
                || b.rows != 1 || b.cols != w.cols || layer.size != w.cols
            {
                return Err(ModelError::MalformedLayer { layer: i });
            }
            if i > 0 {
                let prev = self.layers[i - 1].size;
                if layer.input_size() != prev {
                    return Err(ModelError::LayerMismatch {
                        layer: i,
                        expected: layer.input_size(),
                        got: prev,
                    });
                }
            }
        }
        if self.input_size() != inputs {
            return Err(ModelError::InputSize { expected: inputs, got: self.input_size() });
        }
        if self.output_size() != outputs {
            return Err(ModelError::OutputSize { expected: outputs, got: self.output_size() });
        }
        Ok(())
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Network, ModelError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
