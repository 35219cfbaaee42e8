//! Partitioned quantum state storage and amplitude kernels
//!
//! The global 2^n-amplitude state vector is split into equal contiguous
//! chunks, one per rank, stored as parallel real/imaginary arrays plus a
//! same-shaped pair buffer that receives the peer's chunk during an
//! exchange. The [`layout`] module answers, for any target qubit, whether
//! a gate's amplitude pairs are local and which peer holds the matching
//! half; the [`kernels`] module holds the local and distributed update
//! loops those answers dispatch to.

pub mod chunk;
pub mod error;
pub mod kernels;
pub mod layout;

pub use chunk::{AmpBuffer, ChunkedState};
pub use error::StateError;
