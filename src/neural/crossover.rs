//! Uniform crossover between networks of identical topology.

use super::matrix::Matrix;
use super::network::{Layer, NeuralNet};
use crate::error::{EvoError, Result};
use rand::Rng;

impl NeuralNet {
    /// Build a child whose every weight and bias is taken from `self` or
    /// `other` by an independent coin flip. Values are copied, never averaged.
    pub fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Result<Self> {
        if self.topology() != other.topology() {
            return Err(EvoError::TopologyMismatch(format!(
                "{:?} vs {:?}",
                self.topology(),
                other.topology()
            )));
        }

        let layers = self
            .layers
            .iter()
            .zip(other.layers.iter())
            .map(|(a, b)| {
                Ok(Layer {
                    weights: mix(&a.weights, &b.weights, rng)?,
                    biases: mix(&a.biases, &b.biases, rng)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(NeuralNet::from_layers(self.topology().clone(), layers))
    }
}

fn mix<R: Rng>(a: &Matrix, b: &Matrix, rng: &mut R) -> Result<Matrix> {
    let (rows, cols) = a.shape();
    let values = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| if rng.gen_bool(0.5) { y } else { x })
        .collect();
    Matrix::from_row_major(rows, cols, values)
}
