//! Errors raised while constructing a partitioned state

use thiserror::Error;

/// Construction-time geometry failures.
///
/// These are recoverable `Result`s rather than collective aborts: no
/// collective has been entered yet, so the caller can still back out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// A register needs at least one qubit
    #[error("register must have at least one qubit")]
    NoQubits,

    /// Rank counts must be powers of two
    #[error("rank count {ranks} is not a power of two")]
    RanksNotPowerOfTwo { ranks: usize },

    /// More ranks than amplitudes
    #[error("{ranks} ranks cannot partition a {num_qubits}-qubit state vector")]
    TooManyRanks { ranks: usize, num_qubits: usize },

    /// Chunk id outside the group
    #[error("chunk id {chunk_id} out of range for {ranks} ranks")]
    ChunkIdOutOfRange { chunk_id: usize, ranks: usize },
}
