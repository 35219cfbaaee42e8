//! In-process thread group: one OS thread per rank, shared-nothing chunks
//!
//! Collectives go through per-rank slots guarded by a shared barrier;
//! pairwise exchange goes through a full matrix of mpsc channels. Ranks
//! share no state-vector memory, so the engine behaves exactly as it
//! would across processes, which is what the distributed test suites
//! rely on.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Barrier};
use std::thread;

use parking_lot::Mutex;
use qshard_core::Real;
use tracing::debug;

use crate::env::Environment;
use crate::transport::{CommError, Transport};

struct Message {
    tag: u32,
    payload: Vec<Real>,
}

/// State shared by every rank of one group.
struct Shared {
    size: usize,
    barrier: Barrier,
    sum_slots: Mutex<Vec<Real>>,
    flag_slots: Mutex<Vec<bool>>,
    cast_slot: Mutex<Real>,
}

/// One rank's endpoint of an in-process group.
///
/// Created in bulk by [`ThreadGroup::new_group`]; each endpoint is moved
/// onto its own thread. Collectives must be called by every rank in the
/// same order — slot writes are separated by two barrier phases so a slot
/// is never rewritten before all ranks have read it.
pub struct ThreadGroup {
    rank: usize,
    shared: Arc<Shared>,
    /// senders[to]: channel into rank `to`'s inbox for messages from us
    senders: Vec<Sender<Message>>,
    /// inboxes[from]: our receive side for messages from rank `from`
    inboxes: Vec<Receiver<Message>>,
}

impl ThreadGroup {
    /// Build the endpoints of a `size`-rank group.
    pub fn new_group(size: usize) -> Vec<ThreadGroup> {
        assert!(size >= 1, "a group needs at least one rank");
        let shared = Arc::new(Shared {
            size,
            barrier: Barrier::new(size),
            sum_slots: Mutex::new(vec![0.0; size]),
            flag_slots: Mutex::new(vec![false; size]),
            cast_slot: Mutex::new(0.0),
        });

        // full channel matrix: one queue per ordered (from, to) pair
        let mut senders: Vec<Vec<Option<Sender<Message>>>> = (0..size)
            .map(|_| (0..size).map(|_| None).collect())
            .collect();
        let mut inboxes: Vec<Vec<Option<Receiver<Message>>>> = (0..size)
            .map(|_| (0..size).map(|_| None).collect())
            .collect();
        for from in 0..size {
            for to in 0..size {
                let (tx, rx) = channel();
                senders[from][to] = Some(tx);
                inboxes[to][from] = Some(rx);
            }
        }

        senders
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(rank, (txs, rxs))| ThreadGroup {
                rank,
                shared: Arc::clone(&shared),
                senders: txs.into_iter().map(Option::unwrap).collect(),
                inboxes: rxs.into_iter().map(Option::unwrap).collect(),
            })
            .collect()
    }
}

impl Transport for ThreadGroup {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn barrier(&self) {
        self.shared.barrier.wait();
    }

    fn all_reduce_sum(&self, value: Real) -> Real {
        self.shared.sum_slots.lock()[self.rank] = value;
        self.shared.barrier.wait();
        // fold in rank order so every rank computes bit-identical totals
        let total = self.shared.sum_slots.lock().iter().sum();
        self.shared.barrier.wait();
        total
    }

    fn all_reduce_and(&self, value: bool) -> bool {
        self.shared.flag_slots.lock()[self.rank] = value;
        self.shared.barrier.wait();
        let all = self.shared.flag_slots.lock().iter().all(|&f| f);
        self.shared.barrier.wait();
        all
    }

    fn broadcast(&self, value: Real, root: usize) -> Real {
        if self.rank == root {
            *self.shared.cast_slot.lock() = value;
        }
        self.shared.barrier.wait();
        let out = *self.shared.cast_slot.lock();
        self.shared.barrier.wait();
        out
    }

    fn send_recv(
        &self,
        peer: usize,
        tag: u32,
        send: &[Real],
        recv: &mut [Real],
    ) -> Result<(), CommError> {
        if peer >= self.shared.size {
            return Err(CommError::InvalidPeer { peer, size: self.shared.size });
        }
        if peer == self.rank {
            return Err(CommError::SelfExchange { rank: self.rank });
        }

        // post the send first; queues are unbounded, so neither side can
        // block the other before both receives are posted
        self.senders[peer]
            .send(Message { tag, payload: send.to_vec() })
            .map_err(|_| CommError::PeerDisconnected { peer })?;
        let msg = self.inboxes[peer]
            .recv()
            .map_err(|_| CommError::PeerDisconnected { peer })?;

        if msg.tag != tag {
            return Err(CommError::TagMismatch { expected: tag, got: msg.tag });
        }
        if msg.payload.len() != recv.len() {
            return Err(CommError::LengthMismatch {
                expected: recv.len(),
                got: msg.payload.len(),
            });
        }
        recv.copy_from_slice(&msg.payload);
        Ok(())
    }

    fn abort(&self, code: i32) -> ! {
        // rank threads share the process, so the group dies with it
        debug!(rank = self.rank, code, "collective abort");
        std::process::exit(code)
    }
}

/// Run `f` once per rank on its own thread and collect the results in
/// rank order. This is the harness the distributed tests drive.
pub fn run_group<T, F>(size: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(Environment) -> T + Send + Sync,
{
    let endpoints = ThreadGroup::new_group(size);
    thread::scope(|scope| {
        let handles: Vec<_> = endpoints
            .into_iter()
            .map(|endpoint| {
                let f = &f;
                scope.spawn(move || f(Environment::with_transport(Box::new(endpoint))))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank thread panicked"))
            .collect()
    })
}
