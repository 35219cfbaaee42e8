//! The distributed quantum state-vector engine
//!
//! A [`Register`] holds one rank's chunk of an n-qubit pure state and
//! applies gates, probability queries and projective collapses to it.
//! Every operation that might exchange, broadcast or reduce is a
//! collective: each rank of the group must call it in the same program
//! order with the same arguments. On a single rank the same code runs
//! without any communication.
//!
//! ```
//! use qshard_sim::{Environment, Register};
//!
//! let env = Environment::solo();
//! let mut reg = Register::new(2, &env).unwrap();
//! reg.hadamard(0);
//! reg.controlled_not(0, 1);
//! let p = reg.find_probability_of_outcome(1, 0);
//! assert!((p - 0.5).abs() < 1e-12);
//! ```

pub mod gates;
pub mod observe;
pub mod register;

pub use gates::PhaseKind;
pub use register::Register;

// the pieces callers need alongside the engine
pub use qshard_comm::{run_group, Environment};
pub use qshard_core::{Amp, Matrix2, Real};
