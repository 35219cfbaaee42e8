//! The transport contract every process group implements

use qshard_core::{real_bytes, Real};
use thiserror::Error;

/// Tag used by the state-vector exchange; send and receive to the same
/// peer are paired, so one tag suffices.
pub const EXCHANGE_TAG: u32 = 100;

/// Largest number of scalar elements in a single exchange message.
///
/// Derived from a 2 GiB per-message limit in common transports combined
/// with the element size: 2^29 for 4-byte, 2^28 for 8-byte and 2^27 for
/// 16-byte scalars. Transports without such a limit still chunk to these
/// sizes so behavior stays portable.
pub fn max_message_elems() -> usize {
    match real_bytes() {
        4 => 1 << 29,
        8 => 1 << 28,
        _ => 1 << 27,
    }
}

/// Failures in the message layer. All of them are fatal to the group.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommError {
    /// Peer rank outside the group
    #[error("peer rank {peer} out of range for a group of {size}")]
    InvalidPeer { peer: usize, size: usize },

    /// A rank asked to exchange with itself
    #[error("rank {rank} cannot exchange with itself")]
    SelfExchange { rank: usize },

    /// The peer's endpoint is gone
    #[error("peer rank {peer} disconnected")]
    PeerDisconnected { peer: usize },

    /// Received message length differs from the posted receive
    #[error("message length mismatch: expected {expected} elements, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// Received message carried an unexpected tag
    #[error("message tag mismatch: expected {expected}, got {got}")]
    TagMismatch { expected: u32, got: u32 },
}

/// Two-sided message passing between the ranks of one process group.
///
/// Every method except `send_recv` is a collective: all ranks must call
/// it in the same program order. `send_recv` is pairwise: the named peer
/// must post the matching call.
pub trait Transport: Send {
    /// This rank's id within the group.
    fn rank(&self) -> usize;

    /// Number of ranks in the group.
    fn size(&self) -> usize;

    /// Block until every rank has reached the barrier.
    fn barrier(&self);

    /// Sum of `value` over all ranks, returned on every rank.
    fn all_reduce_sum(&self, value: Real) -> Real;

    /// Logical AND of `value` over all ranks, returned on every rank.
    fn all_reduce_and(&self, value: bool) -> bool;

    /// Value held by `root`, returned on every rank.
    fn broadcast(&self, value: Real, root: usize) -> Real;

    /// Send `send` to `peer` and receive the matching message from `peer`
    /// into `recv`. Both sides must post the call with equal lengths.
    fn send_recv(
        &self,
        peer: usize,
        tag: u32,
        send: &[Real],
        recv: &mut [Real],
    ) -> Result<(), CommError>;

    /// Tear the whole group down with `code` as the process exit status.
    fn abort(&self, code: i32) -> !;
}
