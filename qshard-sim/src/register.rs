//! The per-rank register object and the state-vector exchange driver

use qshard_comm::{max_message_elems, Environment, EXCHANGE_TAG};
use qshard_core::{Amp, EngineError, Real};
use qshard_state::kernels::chunk_norm_sqr;
use qshard_state::{ChunkedState, StateError};
use tracing::debug;

/// One rank's view of a distributed n-qubit register.
///
/// Construction is collective in effect (every rank builds its chunk of
/// the same register); all gate and observable methods must then be
/// called by every rank in the same program order with the same
/// arguments. Buffers are freed when the register drops.
pub struct Register<'e> {
    env: &'e Environment,
    state: ChunkedState,
}

impl<'e> Register<'e> {
    /// Allocate this rank's chunk of an n-qubit register in |0…0⟩.
    ///
    /// The group size must be a power of two dividing 2^n; the caller can
    /// still agree on failure across ranks (via [`Environment::agree`])
    /// since no collective has run yet.
    pub fn new(num_qubits: usize, env: &'e Environment) -> Result<Self, StateError> {
        let mut state = ChunkedState::new(num_qubits, env.rank(), env.size())?;
        state.init_zero_state();
        Ok(Register { env, state })
    }

    pub fn num_qubits(&self) -> usize {
        self.state.num_qubits()
    }

    /// Global amplitude count, 2^n.
    pub fn total_amps(&self) -> usize {
        self.state.total_amps()
    }

    pub fn env(&self) -> &Environment {
        self.env
    }

    pub(crate) fn state(&self) -> &ChunkedState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut ChunkedState {
        &mut self.state
    }

    /// This rank's amplitudes in global index order.
    pub fn local_amps(&self) -> Vec<Amp> {
        let amps = self.state.amps();
        (0..amps.len()).map(|i| amps.amp(i)).collect()
    }

    /// Real part of the amplitude at a global index; collective, the
    /// owning rank broadcasts.
    pub fn real_amp(&self, index: usize) -> Real {
        self.broadcast_amp_component(index, |amp| amp.re)
    }

    /// Imaginary part of the amplitude at a global index; collective.
    pub fn imag_amp(&self, index: usize) -> Real {
        self.broadcast_amp_component(index, |amp| amp.im)
    }

    fn broadcast_amp_component(&self, index: usize, component: impl Fn(Amp) -> Real) -> Real {
        assert!(index < self.total_amps(), "amplitude index out of range");
        let owner = index / self.state.chunk_size();
        let value = if self.state.chunk_id() == owner {
            component(self.state.amps().amp(index - self.state.global_offset()))
        } else {
            0.0
        };
        self.env.broadcast(value, owner)
    }

    /// Σ |amp|² over the whole register; collective. Equals 1 within
    /// floating tolerance for any unitarily evolved state.
    pub fn total_probability(&self) -> Real {
        let local = chunk_norm_sqr(self.state.amps());
        self.env.all_reduce_sum(local)
    }

    /// Abort the group on a failed validation; never returns.
    pub(crate) fn check(&self, function: &'static str, result: Result<(), EngineError>) {
        if let Err(err) = result {
            self.env.fail(function, err);
        }
    }

    /// Swap state vectors with `pair_rank`: our chunk lands in its pair
    /// buffer and vice versa, real parts then imaginary parts per round,
    /// each message capped by the per-precision element limit.
    pub(crate) fn exchange_state_vectors(&mut self, pair_rank: usize) {
        let chunk_size = self.state.chunk_size();
        let message_elems = max_message_elems().min(chunk_size);
        let rounds = chunk_size / message_elems;
        debug!(pair_rank, rounds, message_elems, "exchanging state vectors");

        let env = self.env;
        let (amps, pair) = self.state.split_for_exchange();
        for round in 0..rounds {
            let span = round * message_elems..(round + 1) * message_elems;
            let exchanged = env
                .send_recv(
                    pair_rank,
                    EXCHANGE_TAG,
                    &amps.re[span.clone()],
                    &mut pair.re[span.clone()],
                )
                .and_then(|()| {
                    env.send_recv(
                        pair_rank,
                        EXCHANGE_TAG,
                        &amps.im[span.clone()],
                        &mut pair.im[span],
                    )
                });
            if let Err(err) = exchanged {
                env.fail("exchange_state_vectors", EngineError::Transport(err.to_string()));
            }
        }
    }
}
