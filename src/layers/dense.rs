use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// Fully connected layer: `a = f(x·W + b)`.
///
/// `weights` is `input_size × size`, `biases` is `1 × size`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer{
    pub size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction
}

impl Layer {
    /// Builds a layer from explicit parameters.
    pub fn from_parts(weights: Matrix, biases: Matrix, activation: ActivationFunction) -> Layer {
        Layer {
            size: weights.cols,
            weights,
            biases,
            activator: activation
        }
    }

    /// Number of inputs this layer consumes.
    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    /// Read-only forward pass for a single sample.
    ///
    /// Callers must pass exactly `input_size()` values; `Network::validate`
    /// guarantees the shapes line up for loaded models.
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        let z = &(&Matrix::row(input) * &self.weights) + &self.biases;
        self.activator.apply(&z.data[0])
    }
}
