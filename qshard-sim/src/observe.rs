//! Probability queries and projective collapse
//!
//! Both are collectives: each rank contributes its chunk's share of
//! P(qubit = 0) and the contributions are sum-reduced across the group.
//! When the block for the measured qubit spans chunks, a chunk lies
//! wholly in one half and either contributes its full norm or nothing.

use qshard_core::{validation, EngineError, Real, REAL_EPS};
use qshard_state::kernels::{
    chunk_norm_sqr, collapse_local, collapse_renorm_chunk, collapse_zero_chunk,
    zero_outcome_probability_local,
};
use qshard_state::layout::{chunk_skipped_for_zero_outcome, half_block_fits_in_chunk};

use crate::register::Register;

impl Register<'_> {
    /// P(measuring `measure_qubit` = `outcome`); collective.
    pub fn find_probability_of_outcome(&self, measure_qubit: usize, outcome: u8) -> Real {
        const FUNC: &str = "find_probability_of_outcome";
        self.check(FUNC, validation::check_target(measure_qubit, self.num_qubits()));
        self.check(FUNC, validation::check_outcome(outcome));

        let state = self.state();
        let chunk_size = state.chunk_size();
        let local = if half_block_fits_in_chunk(chunk_size, measure_qubit) {
            zero_outcome_probability_local(state.amps(), measure_qubit)
        } else if !chunk_skipped_for_zero_outcome(state.chunk_id(), chunk_size, measure_qubit) {
            chunk_norm_sqr(state.amps())
        } else {
            0.0
        };
        let p_zero = self.env().all_reduce_sum(local);
        if outcome == 1 {
            1.0 - p_zero
        } else {
            p_zero
        }
    }

    /// Project onto `outcome` of `measure_qubit` and renormalize;
    /// collective. Returns the pre-collapse probability of that outcome.
    /// Collapsing onto an outcome of probability below epsilon aborts.
    pub fn collapse_to_outcome(&mut self, measure_qubit: usize, outcome: u8) -> Real {
        const FUNC: &str = "collapse_to_outcome";
        self.check(FUNC, validation::check_target(measure_qubit, self.num_qubits()));
        self.check(FUNC, validation::check_outcome(outcome));

        let probability = self.find_probability_of_outcome(measure_qubit, outcome);
        if probability.abs() <= REAL_EPS {
            self.env().fail(FUNC, EngineError::ZeroProbability { probability });
        }

        let chunk_size = self.state().chunk_size();
        let chunk_id = self.state().chunk_id();
        if half_block_fits_in_chunk(chunk_size, measure_qubit) {
            collapse_local(self.state_mut().amps_mut(), measure_qubit, outcome, probability);
        } else {
            let in_zero_half =
                !chunk_skipped_for_zero_outcome(chunk_id, chunk_size, measure_qubit);
            let survives = in_zero_half == (outcome == 0);
            if survives {
                collapse_renorm_chunk(self.state_mut().amps_mut(), probability);
            } else {
                collapse_zero_chunk(self.state_mut().amps_mut());
            }
        }
        probability
    }
}
