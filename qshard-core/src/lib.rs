//! Core scalar types, error codes and argument validation for qshard
//!
//! Everything in the engine — amplitudes, probabilities, reductions and
//! wire messages — uses a single real scalar width chosen at compile time
//! (see [`precision`]). This crate also owns the numbered error table and
//! the pure validators that every public gate runs before touching the
//! state vector.

pub mod error;
pub mod matrix;
pub mod precision;
pub mod validation;

pub use error::{describe, EngineError};
pub use matrix::{compact_pair_is_unitary, matrix_from_compact, matrix_is_unitary, Matrix2};
pub use precision::{real_bytes, Amp, Real, REAL_EPS};
