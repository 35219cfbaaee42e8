//! Gate dispatch: local kernel, or half-coefficient rewrite + exchange +
//! distributed kernel
//!
//! Every gate follows the same template. Validate the arguments; ask the
//! locality oracle whether the half-block for the target fits inside a
//! chunk; if it does, run the local kernel and return. Otherwise work out
//! which half of its block this chunk is, rewrite the coefficient pair
//! for that half, exchange state vectors with the pair rank, and run the
//! distributed kernel with the buffers oriented (upper, lower, output) —
//! the output always being the local chunk.

use qshard_core::{matrix_from_compact, validation, Amp, Matrix2, Real};
use qshard_state::kernels;
use qshard_state::layout::{chunk_is_upper, chunk_pair_id, half_block_fits_in_chunk};

use crate::register::Register;

/// Diagonal phase gates sharing one dispatch path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    /// σz: phase −1
    PauliZ,
    /// S: phase i
    S,
    /// T: phase e^{iπ/4}
    T,
}

impl PhaseKind {
    /// Factor applied to every amplitude whose target bit is set.
    pub fn factor(self) -> Amp {
        let s = std::f64::consts::FRAC_1_SQRT_2 as Real;
        match self {
            PhaseKind::PauliZ => Amp::new(-1.0, 0.0),
            PhaseKind::S => Amp::new(0.0, 1.0),
            PhaseKind::T => Amp::new(s, s),
        }
    }
}

/// Coefficient pair seen by one half of the block under the compact form:
/// the upper half keeps (α, −β), the lower gets (β, α). The distributed
/// kernel conjugates the second coefficient.
fn compact_half_coefficients(is_upper: bool, alpha: Amp, beta: Amp) -> (Amp, Amp) {
    if is_upper {
        (alpha, -beta)
    } else {
        (beta, alpha)
    }
}

/// Coefficient pair for one half under a full 2×2 matrix: its row.
fn matrix_half_coefficients(is_upper: bool, m: &Matrix2) -> (Amp, Amp) {
    if is_upper {
        (m[0][0], m[0][1])
    } else {
        (m[1][0], m[1][1])
    }
}

impl Register<'_> {
    /// Which half of its block this chunk holds for `target`, and the
    /// rank holding the other half.
    fn half_and_pair(&self, target: usize) -> (bool, usize) {
        let state = self.state();
        let upper = chunk_is_upper(state.chunk_id(), state.chunk_size(), target);
        let pair = chunk_pair_id(upper, state.chunk_id(), state.chunk_size(), target);
        (upper, pair)
    }

    /// Single-qubit unitary from the compact pair (α, β) with
    /// |α|² + |β|² = 1, representing [[α, −β*], [β, α*]].
    pub fn compact_unitary(&mut self, target: usize, alpha: Amp, beta: Amp) {
        self.check("compact_unitary", validation::check_target(target, self.num_qubits()));
        self.check("compact_unitary", validation::check_compact_pair(alpha, beta));

        if half_block_fits_in_chunk(self.state().chunk_size(), target) {
            let m = matrix_from_compact(alpha, beta);
            kernels::unitary_local(self.state_mut().amps_mut(), target, &m);
            return;
        }
        let (upper, pair_rank) = self.half_and_pair(target);
        let (rot1, rot2) = compact_half_coefficients(upper, alpha, beta);
        self.exchange_state_vectors(pair_rank);
        let (amps, pair) = self.state_mut().split_for_update();
        kernels::compact_unitary_dist(amps, pair, rot1, rot2, upper);
    }

    /// Single-qubit unitary from an explicit 2×2 matrix.
    pub fn unitary(&mut self, target: usize, m: &Matrix2) {
        self.check("unitary", validation::check_target(target, self.num_qubits()));
        self.check("unitary", validation::check_unitary(m));

        if half_block_fits_in_chunk(self.state().chunk_size(), target) {
            kernels::unitary_local(self.state_mut().amps_mut(), target, m);
            return;
        }
        let (upper, pair_rank) = self.half_and_pair(target);
        let (rot1, rot2) = matrix_half_coefficients(upper, m);
        self.exchange_state_vectors(pair_rank);
        let (amps, pair) = self.state_mut().split_for_update();
        kernels::unitary_dist(amps, pair, rot1, rot2, upper);
    }

    /// Compact-pair unitary applied where the control bit is 1.
    pub fn controlled_compact_unitary(
        &mut self,
        control: usize,
        target: usize,
        alpha: Amp,
        beta: Amp,
    ) {
        const FUNC: &str = "controlled_compact_unitary";
        self.check(FUNC, validation::check_target(target, self.num_qubits()));
        self.check(FUNC, validation::check_control(control, self.num_qubits()));
        self.check(FUNC, validation::check_distinct(control, target));
        self.check(FUNC, validation::check_compact_pair(alpha, beta));

        if half_block_fits_in_chunk(self.state().chunk_size(), target) {
            let m = matrix_from_compact(alpha, beta);
            let offset = self.state().global_offset();
            kernels::controlled_unitary_local(self.state_mut().amps_mut(), offset, control, target, &m);
            return;
        }
        let (upper, pair_rank) = self.half_and_pair(target);
        let (rot1, rot2) = compact_half_coefficients(upper, alpha, beta);
        self.exchange_state_vectors(pair_rank);
        let offset = self.state().global_offset();
        let (amps, pair) = self.state_mut().split_for_update();
        kernels::controlled_compact_unitary_dist(amps, pair, offset, control, rot1, rot2, upper);
    }

    /// Matrix unitary applied where the control bit is 1.
    pub fn controlled_unitary(&mut self, control: usize, target: usize, m: &Matrix2) {
        const FUNC: &str = "controlled_unitary";
        self.check(FUNC, validation::check_target(target, self.num_qubits()));
        self.check(FUNC, validation::check_control(control, self.num_qubits()));
        self.check(FUNC, validation::check_distinct(control, target));
        self.check(FUNC, validation::check_unitary(m));

        if half_block_fits_in_chunk(self.state().chunk_size(), target) {
            let offset = self.state().global_offset();
            kernels::controlled_unitary_local(self.state_mut().amps_mut(), offset, control, target, m);
            return;
        }
        let (upper, pair_rank) = self.half_and_pair(target);
        let (rot1, rot2) = matrix_half_coefficients(upper, m);
        self.exchange_state_vectors(pair_rank);
        let offset = self.state().global_offset();
        let (amps, pair) = self.state_mut().split_for_update();
        kernels::controlled_unitary_dist(amps, pair, offset, control, rot1, rot2, upper);
    }

    /// Matrix unitary applied where every control bit is 1.
    ///
    /// At least one qubit must stay outside the control set, and the set
    /// must not contain the target.
    pub fn multi_controlled_unitary(&mut self, controls: &[usize], target: usize, m: &Matrix2) {
        const FUNC: &str = "multi_controlled_unitary";
        let n = self.num_qubits();
        self.check(FUNC, validation::check_target(target, n));
        self.check(FUNC, validation::check_control_count(controls.len(), n));
        self.check(FUNC, validation::check_unitary(m));
        let mask = match validation::build_control_mask(controls, n) {
            Ok(mask) => mask,
            Err(err) => self.env().fail(FUNC, err),
        };
        self.check(FUNC, validation::check_control_mask(mask, target, n));

        if half_block_fits_in_chunk(self.state().chunk_size(), target) {
            let offset = self.state().global_offset();
            kernels::multi_controlled_unitary_local(self.state_mut().amps_mut(), offset, mask, target, m);
            return;
        }
        let (upper, pair_rank) = self.half_and_pair(target);
        let (rot1, rot2) = matrix_half_coefficients(upper, m);
        self.exchange_state_vectors(pair_rank);
        let offset = self.state().global_offset();
        let (amps, pair) = self.state_mut().split_for_update();
        kernels::multi_controlled_unitary_dist(amps, pair, offset, mask, rot1, rot2, upper);
    }

    /// Pauli X. No coefficient rewriting: the exchanged chunk simply
    /// replaces the local one.
    pub fn sigma_x(&mut self, target: usize) {
        self.check("sigma_x", validation::check_target(target, self.num_qubits()));

        if half_block_fits_in_chunk(self.state().chunk_size(), target) {
            kernels::sigma_x_local(self.state_mut().amps_mut(), target);
            return;
        }
        let (_, pair_rank) = self.half_and_pair(target);
        self.exchange_state_vectors(pair_rank);
        let (amps, pair) = self.state_mut().split_for_update();
        kernels::sigma_x_dist(amps, pair);
    }

    /// Pauli Y. The distributed kernel needs the half to pick the sign
    /// of i.
    pub fn sigma_y(&mut self, target: usize) {
        self.check("sigma_y", validation::check_target(target, self.num_qubits()));

        if half_block_fits_in_chunk(self.state().chunk_size(), target) {
            kernels::sigma_y_local(self.state_mut().amps_mut(), target);
            return;
        }
        let (upper, pair_rank) = self.half_and_pair(target);
        self.exchange_state_vectors(pair_rank);
        let (amps, pair) = self.state_mut().split_for_update();
        kernels::sigma_y_dist(amps, pair, upper);
    }

    /// Hadamard, with its fixed coefficient pair.
    pub fn hadamard(&mut self, target: usize) {
        self.check("hadamard", validation::check_target(target, self.num_qubits()));

        if half_block_fits_in_chunk(self.state().chunk_size(), target) {
            kernels::hadamard_local(self.state_mut().amps_mut(), target);
            return;
        }
        let (upper, pair_rank) = self.half_and_pair(target);
        self.exchange_state_vectors(pair_rank);
        let (amps, pair) = self.state_mut().split_for_update();
        kernels::hadamard_dist(amps, pair, upper);
    }

    /// Diagonal phase gate. Never exchanges: an upper chunk is untouched,
    /// a lower chunk scales in place.
    pub fn phase_gate(&mut self, target: usize, kind: PhaseKind) {
        self.check("phase_gate", validation::check_target(target, self.num_qubits()));

        let factor = kind.factor();
        if half_block_fits_in_chunk(self.state().chunk_size(), target) {
            kernels::phase_factor_local(self.state_mut().amps_mut(), target, factor);
            return;
        }
        let (upper, _) = self.half_and_pair(target);
        if !upper {
            kernels::phase_factor_chunk(self.state_mut().amps_mut(), factor);
        }
    }

    /// Controlled NOT.
    pub fn controlled_not(&mut self, control: usize, target: usize) {
        const FUNC: &str = "controlled_not";
        self.check(FUNC, validation::check_target(target, self.num_qubits()));
        self.check(FUNC, validation::check_control(control, self.num_qubits()));
        self.check(FUNC, validation::check_distinct(control, target));

        if half_block_fits_in_chunk(self.state().chunk_size(), target) {
            let offset = self.state().global_offset();
            kernels::controlled_not_local(self.state_mut().amps_mut(), offset, control, target);
            return;
        }
        let (_, pair_rank) = self.half_and_pair(target);
        self.exchange_state_vectors(pair_rank);
        let offset = self.state().global_offset();
        let (amps, pair) = self.state_mut().split_for_update();
        kernels::controlled_not_dist(amps, pair, offset, control);
    }
}
