//! Replacement mutation of network genomes.

use super::network::NeuralNet;
use crate::error::{EvoError, Result};
use rand::Rng;

/// Reject mutation rates outside [0, 1]
pub fn validate_rate(rate: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(EvoError::Configuration(format!(
            "mutation_rate must be in [0, 1], got {}",
            rate
        )));
    }
    Ok(())
}

impl NeuralNet {
    /// With probability `rate`, independently replace each weight and bias
    /// with a fresh uniform draw in [-1, 1). Old values are discarded, not nudged.
    pub fn mutate<R: Rng>(&mut self, rate: f32, rng: &mut R) -> Result<()> {
        validate_rate(rate)?;

        for layer in &mut self.layers {
            for value in layer.weights.iter_mut().chain(layer.biases.iter_mut()) {
                if rng.gen::<f32>() < rate {
                    *value = rng.gen_range(-1.0..1.0);
                }
            }
        }

        Ok(())
    }
}
