//! Network topology, genome storage and forward propagation.

use super::matrix::Matrix;
use crate::error::{EvoError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Layer sizes of a network. Fixed for the lifetime of a genome.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topology {
    /// Number of sensor inputs
    pub inputs: usize,
    /// Hidden layer sizes (one or two layers)
    pub hidden: Vec<usize>,
    /// Number of outputs
    pub outputs: usize,
    /// Feed the previous output back in alongside the sensors
    pub recurrent: bool,
}

impl Topology {
    /// Ray-cast snake brain: 24 sensors, 16-16 hidden, 3 outputs, recurrent
    pub fn snake_brain() -> Self {
        Self {
            inputs: crate::sensor::SENSOR_COUNT,
            hidden: vec![16, 16],
            outputs: crate::brain::Action::COUNT,
            recurrent: true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.inputs == 0 || self.outputs == 0 {
            return Err(EvoError::Configuration(
                "network inputs and outputs must be >= 1".to_string(),
            ));
        }
        if self.hidden.is_empty() || self.hidden.len() > 2 {
            return Err(EvoError::Configuration(format!(
                "network needs one or two hidden layers, got {}",
                self.hidden.len()
            )));
        }
        if self.hidden.iter().any(|&h| h == 0) {
            return Err(EvoError::Configuration(
                "hidden layer sizes must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Width of the first layer's input vector
    #[inline]
    pub fn input_width(&self) -> usize {
        if self.recurrent {
            self.inputs + self.outputs
        } else {
            self.inputs
        }
    }

    /// (rows, cols) of every weight matrix, input side first
    pub fn weight_shapes(&self) -> Vec<(usize, usize)> {
        let mut shapes = Vec::with_capacity(self.hidden.len() + 1);
        let mut prev = self.input_width();
        for &size in &self.hidden {
            shapes.push((size, prev));
            prev = size;
        }
        shapes.push((self.outputs, prev));
        shapes
    }

    /// Total number of weights and biases
    pub fn parameter_count(&self) -> usize {
        self.weight_shapes()
            .iter()
            .map(|&(rows, cols)| rows * cols + rows)
            .sum()
    }
}

/// One fully connected layer: `sigmoid(weights · x + biases)`
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// (layer_size, previous_size)
    pub weights: Matrix,
    /// (layer_size, 1)
    pub biases: Matrix,
}

impl Layer {
    fn random<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Result<Self> {
        Ok(Self {
            weights: Matrix::random(rows, cols, rng)?,
            biases: Matrix::random(rows, 1, rng)?,
        })
    }

    fn forward(&self, input: &Matrix) -> Result<Matrix> {
        let mut out = Matrix::multiply(&self.weights, input)?;
        out.add(&self.biases)?;
        out.sigmoid();
        Ok(out)
    }
}

/// Fixed-topology feedforward network with optional Elman feedback.
///
/// The layers are the genome. `feedback` is runtime state: it never travels
/// with copies, crossovers or snapshots.
#[derive(Debug)]
pub struct NeuralNet {
    topology: Topology,
    pub(crate) layers: Vec<Layer>,
    feedback: Vec<f32>,
}

impl NeuralNet {
    /// Create a network with every weight and bias uniform in [-1, 1)
    pub fn random<R: Rng>(topology: Topology, rng: &mut R) -> Result<Self> {
        topology.validate()?;
        let layers = topology
            .weight_shapes()
            .into_iter()
            .map(|(rows, cols)| Layer::random(rows, cols, rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_layers(topology, layers))
    }

    /// Assemble a network from existing layers, feedback zeroed
    pub(crate) fn from_layers(topology: Topology, layers: Vec<Layer>) -> Self {
        let feedback = vec![0.0; topology.outputs];
        Self {
            topology,
            layers,
            feedback,
        }
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Previous tick's output (all zeros for a fresh or non-recurrent net)
    #[inline]
    pub fn feedback(&self) -> &[f32] {
        &self.feedback
    }

    /// Run one tick. Recurrent networks remember the output for the next call.
    ///
    /// This is for driving a bare network; a `Brain` keeps its feedback in
    /// its controller state and calls [`NeuralNet::forward_with`] instead.
    pub fn feed_forward(&mut self, sensors: &[f32]) -> Result<Vec<f32>> {
        let output = self.forward_with(sensors, &self.feedback)?;
        if self.topology.recurrent {
            self.feedback.copy_from_slice(&output);
        }
        Ok(output)
    }

    /// Forward pass with explicit feedback; does not touch the network.
    /// `feedback` is ignored for non-recurrent topologies.
    pub fn forward_with(&self, sensors: &[f32], feedback: &[f32]) -> Result<Vec<f32>> {
        if sensors.len() != self.topology.inputs {
            return Err(EvoError::ShapeMismatch {
                op: "feed_forward",
                left: (self.topology.inputs, 1),
                right: (sensors.len(), 1),
            });
        }

        let mut input = Vec::with_capacity(self.topology.input_width());
        input.extend_from_slice(sensors);
        if self.topology.recurrent {
            if feedback.len() != self.topology.outputs {
                return Err(EvoError::ShapeMismatch {
                    op: "feedback",
                    left: (self.topology.outputs, 1),
                    right: (feedback.len(), 1),
                });
            }
            input.extend_from_slice(feedback);
        }

        let mut activation = Matrix::from_vector(&input)?;
        for layer in &self.layers {
            activation = layer.forward(&activation)?;
        }

        Ok(activation.to_vector())
    }

    /// Clear recurrent state
    pub fn reset(&mut self) {
        self.feedback.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Deep, independent clone of the genome. Feedback starts at zero.
    pub fn copy(&self) -> Self {
        Self::from_layers(self.topology.clone(), self.layers.clone())
    }

    /// Genome values in snapshot order: per layer, weights (row order) then biases
    pub fn values(&self) -> Vec<f32> {
        let mut values = Vec::with_capacity(self.parameter_count());
        for layer in &self.layers {
            values.extend(layer.weights.iter().copied());
            values.extend(layer.biases.iter().copied());
        }
        values
    }

    /// Get total number of parameters (weights + biases)
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.len() + l.biases.len())
            .sum()
    }

    /// Check if network is valid (no NaN/Inf)
    pub fn is_valid(&self) -> bool {
        self.layers.iter().all(|layer| {
            layer.weights.iter().all(|w| w.is_finite()) && layer.biases.iter().all(|b| b.is_finite())
        })
    }

    /// Hash of the topology and every weight bit pattern, for telling genomes apart in logs
    pub fn fingerprint(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.topology.hash(&mut hasher);
        for value in self.values() {
            value.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}
