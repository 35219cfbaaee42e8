//! Degenerate transport for a single-rank group

use crate::transport::{CommError, Transport};
use qshard_core::Real;

/// The one-rank group: collectives are identities, exchange is impossible.
///
/// With a single chunk every half-block fits locally, so the engine never
/// asks this transport to exchange; a call anyway is a logic error and is
/// reported as [`CommError::SelfExchange`].
#[derive(Debug, Default)]
pub struct SoloTransport;

impl Transport for SoloTransport {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn barrier(&self) {}

    fn all_reduce_sum(&self, value: Real) -> Real {
        value
    }

    fn all_reduce_and(&self, value: bool) -> bool {
        value
    }

    fn broadcast(&self, value: Real, _root: usize) -> Real {
        value
    }

    fn send_recv(
        &self,
        _peer: usize,
        _tag: u32,
        _send: &[Real],
        _recv: &mut [Real],
    ) -> Result<(), CommError> {
        Err(CommError::SelfExchange { rank: 0 })
    }

    fn abort(&self, code: i32) -> ! {
        std::process::exit(code)
    }
}
