//! Numbered engine errors
//!
//! Each variant carries a stable small-integer code; a failed validation
//! at the public API prints `function: message` on the detecting rank and
//! aborts the whole process group with that code as exit status.

use crate::precision::Real;
use thiserror::Error;

/// Errors raised by argument validation and numerical preconditions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Target qubit index out of range
    #[error("invalid target qubit {target} for a {num_qubits}-qubit register (qubits are zero indexed)")]
    InvalidTarget { target: usize, num_qubits: usize },

    /// Control qubit index out of range
    #[error("invalid control qubit {control} for a {num_qubits}-qubit register")]
    InvalidControl { control: usize, num_qubits: usize },

    /// Control qubit equals the target qubit
    #[error("control qubit {qubit} cannot equal the target qubit")]
    ControlEqualsTarget { qubit: usize },

    /// Wrong number of control qubits
    #[error("invalid number of control qubits {count} for a {num_qubits}-qubit register")]
    InvalidControlCount { count: usize, num_qubits: usize },

    /// Supplied 2×2 matrix is not unitary within tolerance
    #[error("matrix is not unitary within tolerance")]
    NonUnitaryMatrix,

    /// Compact pair fails |α|² + |β|² = 1 within tolerance
    #[error("|alpha|^2 + |beta|^2 must equal 1")]
    NonUnitaryCompactPair,

    /// Measurement outcome other than 0 or 1
    #[error("measurement outcome {outcome} is not 0 or 1")]
    InvalidOutcome { outcome: u8 },

    /// Collapse requested onto an outcome of (near-)zero probability
    #[error("cannot collapse to an outcome of probability {probability:e}")]
    ZeroProbability { probability: Real },

    /// Control mask empty or out of range
    #[error("control mask {mask:#x} out of range (at least one qubit must stay outside the control set)")]
    ControlMaskOutOfRange { mask: u64 },

    /// Control mask intersects the target qubit
    #[error("control mask intersects target qubit {target}")]
    ControlMaskHitsTarget { target: usize },

    /// Failure in the underlying message transport
    #[error("transport failure: {0}")]
    Transport(String),
}

impl EngineError {
    /// Stable numeric code, used as the abort exit status.
    pub fn code(&self) -> i32 {
        match self {
            EngineError::InvalidTarget { .. } => 1,
            EngineError::InvalidControl { .. } => 2,
            EngineError::ControlEqualsTarget { .. } => 3,
            EngineError::InvalidControlCount { .. } => 4,
            EngineError::NonUnitaryMatrix => 5,
            EngineError::NonUnitaryCompactPair => 6,
            EngineError::InvalidOutcome { .. } => 7,
            EngineError::ZeroProbability { .. } => 8,
            EngineError::ControlMaskOutOfRange { .. } => 9,
            EngineError::ControlMaskHitsTarget { .. } => 10,
            EngineError::Transport(_) => 11,
        }
    }
}

/// Textual table mapping each error code to its generic message.
pub fn describe(code: i32) -> &'static str {
    match code {
        0 => "success",
        1 => "invalid target qubit",
        2 => "invalid control qubit",
        3 => "control qubit equals target",
        4 => "invalid number of control qubits",
        5 => "matrix is not unitary",
        6 => "compact pair is not unitary",
        7 => "outcome is not 0 or 1",
        8 => "collapse probability below epsilon",
        9 => "control mask out of range",
        10 => "control mask intersects target",
        11 => "transport failure",
        _ => "unknown error",
    }
}
