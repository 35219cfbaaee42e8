//! Per-rank execution environment
//!
//! Wraps a [`Transport`] with the lifecycle and reporting surface the
//! engine expects: collective agreement on validation outcomes, the
//! rank-0 banner, and the fatal error reporter.

use std::sync::atomic::{AtomicBool, Ordering};

use qshard_core::{real_bytes, EngineError, Real};
use tracing::warn;

use crate::solo::SoloTransport;
use crate::transport::{CommError, Transport};

static SOLO_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// One rank's view of the process group.
///
/// Construction joins the group; dropping the environment releases it.
/// Ownership makes a second release unrepresentable, so only repeated
/// initialization needs the reported-but-ignored treatment.
pub struct Environment {
    transport: Box<dyn Transport>,
}

impl Environment {
    /// The single-rank environment for undistributed runs.
    ///
    /// Initializing it more than once per process is reported and
    /// ignored; each call still returns a usable handle.
    pub fn solo() -> Self {
        if SOLO_INITIALIZED.swap(true, Ordering::SeqCst) {
            warn!("environment already initialized; ignoring repeated initialization");
        }
        Self::with_transport(Box::new(SoloTransport))
    }

    /// Join a group through an explicit transport endpoint.
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Environment { transport }
    }

    /// This rank's id.
    pub fn rank(&self) -> usize {
        self.transport.rank()
    }

    /// Number of ranks in the group.
    pub fn size(&self) -> usize {
        self.transport.size()
    }

    /// Block until every rank arrives.
    pub fn barrier(&self) {
        self.transport.barrier();
    }

    /// Collective success-AND: true only if every rank passed `ok = true`.
    pub fn agree(&self, ok: bool) -> bool {
        self.transport.all_reduce_and(ok)
    }

    /// Sum `value` across all ranks.
    pub fn all_reduce_sum(&self, value: Real) -> Real {
        self.transport.all_reduce_sum(value)
    }

    /// Propagate `value` from `root` to every rank.
    pub fn broadcast(&self, value: Real, root: usize) -> Real {
        self.transport.broadcast(value, root)
    }

    /// Paired send/receive with `peer`; see [`Transport::send_recv`].
    pub fn send_recv(
        &self,
        peer: usize,
        tag: u32,
        send: &[Real],
        recv: &mut [Real],
    ) -> Result<(), CommError> {
        self.transport.send_recv(peer, tag, send, recv)
    }

    /// Rank 0 prints a human-readable banner describing the run.
    pub fn report(&self) {
        if self.rank() == 0 {
            println!("qshard execution environment:");
            println!("  ranks: {}", self.size());
            println!("  worker threads per rank: {}", rayon::current_num_threads());
            println!("  scalar width: {} bytes", real_bytes());
        }
    }

    /// The error reporter: print `function: message` on this rank, then
    /// abort the whole group with the error code as exit status.
    pub fn fail(&self, function: &str, err: EngineError) -> ! {
        eprintln!("{function}: {err}");
        self.transport.abort(err.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solo_environment_is_rank_zero_of_one() {
        let env = Environment::solo();
        assert_eq!(env.rank(), 0);
        assert_eq!(env.size(), 1);
        assert!(env.agree(true));
        assert_eq!(env.all_reduce_sum(2.0), 2.0);
        // repeated initialization is reported, not fatal
        let again = Environment::solo();
        assert_eq!(again.size(), 1);
    }
}
