//! Process-group lifecycle and rank-to-rank message passing
//!
//! Every rank of the engine owns an [`Environment`] wrapping a
//! [`Transport`]: the set of collectives (barrier, all-reduce, broadcast)
//! and the paired send/receive used by the state-vector exchange. Two
//! transports are provided: [`SoloTransport`] for single-rank runs and
//! [`ThreadGroup`] for an in-process group of shared-nothing rank threads,
//! which is also what the distributed test suites execute on.

pub mod env;
pub mod solo;
pub mod threads;
pub mod transport;

pub use env::Environment;
pub use solo::SoloTransport;
pub use threads::{run_group, ThreadGroup};
pub use transport::{max_message_elems, CommError, Transport, EXCHANGE_TAG};
