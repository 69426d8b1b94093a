//! Error taxonomy shared by the matrix engine, the networks and the population.

use thiserror::Error;

/// Errors raised by the evolutionary core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvoError {
    /// A matrix was requested with a zero dimension
    #[error("invalid matrix shape {rows}x{cols}: both dimensions must be >= 1")]
    InvalidShape { rows: usize, cols: usize },

    /// Operands of an elementwise or product operation do not line up
    #[error("shape mismatch in {op}: {left:?} vs {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// A cell outside the matrix was addressed
    #[error("index ({row}, {col}) out of range for {rows}x{cols} matrix")]
    OutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Two networks (or a network and a snapshot) have different layer sizes
    #[error("topology mismatch: {0}")]
    TopologyMismatch(String),

    /// Invalid configuration, detected before any simulation runs
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, EvoError>;
