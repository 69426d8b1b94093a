//! Lossless genome snapshots and their on-disk format.

use crate::error::EvoError;
use crate::neural::{Layer, Matrix, NeuralNet, Topology};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC: &[u8; 4] = b"GSNK";

/// Every weight and bias of one network, in a fixed order.
///
/// Order: for each layer from the input side, weights in row order then
/// biases. Recurrent feedback is not part of a snapshot; restored networks
/// start from a zero feedback vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenomeSnapshot {
    /// Version for compatibility checking
    pub version: u32,
    pub topology: Topology,
    pub values: Vec<f32>,
    /// Generation the genome was taken from
    pub generation: u64,
    /// Fitness of the agent that carried it, when known
    pub fitness: Option<f32>,
}

impl GenomeSnapshot {
    /// Current snapshot version
    pub const VERSION: u32 = 1;

    /// Capture a network's genome
    pub fn capture(net: &NeuralNet, generation: u64, fitness: Option<f32>) -> Self {
        Self {
            version: Self::VERSION,
            topology: net.topology().clone(),
            values: net.values(),
            generation,
            fitness,
        }
    }

    /// Rebuild the network. Feedback starts at zero.
    pub fn restore(&self) -> Result<NeuralNet, EvoError> {
        self.topology.validate()?;
        let expected = self.topology.parameter_count();
        if self.values.len() != expected {
            return Err(EvoError::TopologyMismatch(format!(
                "snapshot holds {} values, topology needs {}",
                self.values.len(),
                expected
            )));
        }

        let mut rest = self.values.as_slice();
        let mut layers = Vec::with_capacity(self.topology.hidden.len() + 1);
        for (rows, cols) in self.topology.weight_shapes() {
            let (weights, tail) = rest.split_at(rows * cols);
            let (biases, tail) = tail.split_at(rows);
            rest = tail;
            layers.push(Layer {
                weights: Matrix::from_row_major(rows, cols, weights.to_vec())?,
                biases: Matrix::from_row_major(rows, 1, biases.to_vec())?,
            });
        }

        Ok(NeuralNet::from_layers(self.topology.clone(), layers))
    }

    /// Save snapshot to binary file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(MAGIC)?;
        let encoded = bincode::serialize(self)?;
        writer.write_all(&encoded)?;
        writer.flush()?;

        Ok(())
    }

    /// Load snapshot from binary file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(SnapshotError::InvalidFormat("Invalid magic bytes".to_string()));
        }

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let snapshot: GenomeSnapshot = bincode::deserialize(&buffer)?;

        if snapshot.version != Self::VERSION {
            return Err(SnapshotError::VersionMismatch {
                expected: Self::VERSION,
                found: snapshot.version,
            });
        }

        Ok(snapshot)
    }
}

/// Errors that can occur while reading or writing snapshots
#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    Serialization(bincode::Error),
    InvalidFormat(String),
    VersionMismatch { expected: u32, found: u32 },
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            Self::VersionMismatch { expected, found } => {
                write!(f, "Version mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<std::io::Error> for SnapshotError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<bincode::Error> for SnapshotError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e)
    }
}
