//! Invariants that must hold for any rank count dividing the state:
//! norm preservation, equivalence with the single-rank engine, and the
//! algebraic round trips of the named gates

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use qshard_sim::{run_group, Amp, Environment, Matrix2, PhaseKind, Real, Register};

const EPS: Real = 1e-10;

fn full_state<F>(ranks: usize, num_qubits: usize, program: F) -> Vec<Amp>
where
    F: Fn(&mut Register) + Send + Sync,
{
    run_group(ranks, |env: Environment| {
        let mut reg = Register::new(num_qubits, &env).unwrap();
        program(&mut reg);
        reg.local_amps()
    })
    .into_iter()
    .flatten()
    .collect()
}

/// A normalized compact pair from two angles.
fn compact_pair(theta: Real, phi: Real) -> (Amp, Amp) {
    let alpha = Amp::new(theta.cos() * phi.cos(), theta.cos() * phi.sin());
    let beta = Amp::new(theta.sin() * (2.0 * phi).cos(), theta.sin() * (2.0 * phi).sin());
    (alpha, beta)
}

/// A unitary built from a compact pair, for the matrix entry points.
fn unitary_matrix(theta: Real, phi: Real) -> Matrix2 {
    let (alpha, beta) = compact_pair(theta, phi);
    [[alpha, -beta.conj()], [beta, alpha.conj()]]
}

/// A program touching every gate kind, with targets on both sides of
/// every chunk boundary used by the tests.
fn mixed_program(reg: &mut Register) {
    let (a1, b1) = compact_pair(0.3, 1.1);
    let (a2, b2) = compact_pair(1.2, -0.4);
    let m1 = unitary_matrix(0.7, 0.2);
    let m2 = unitary_matrix(-0.5, 2.3);
    let m3 = unitary_matrix(2.1, -1.7);

    reg.hadamard(0);
    reg.hadamard(3);
    reg.compact_unitary(2, a1, b1);
    reg.controlled_compact_unitary(0, 3, a2, b2);
    reg.unitary(3, &m1);
    reg.controlled_unitary(1, 2, &m2);
    reg.multi_controlled_unitary(&[0, 1], 3, &m3);
    reg.sigma_x(3);
    reg.sigma_y(2);
    reg.controlled_not(2, 3);
    reg.phase_gate(3, PhaseKind::T);
    reg.phase_gate(0, PhaseKind::S);
}

#[test]
fn distributed_runs_match_the_single_rank_engine() {
    let reference = full_state(1, 4, mixed_program);
    for ranks in [2, 4, 8] {
        let state = full_state(ranks, 4, mixed_program);
        for (got, want) in state.iter().zip(&reference) {
            assert_abs_diff_eq!(got.re, want.re, epsilon = EPS);
            assert_abs_diff_eq!(got.im, want.im, epsilon = EPS);
        }
    }
}

#[test]
fn norm_is_preserved_under_random_circuits() {
    let mut rng = StdRng::seed_from_u64(42);
    let circuit: Vec<(usize, Real, Real)> = (0..40)
        .map(|_| {
            (
                rng.gen_range(0..4usize),
                rng.gen_range(0.0..std::f64::consts::PI) as Real,
                rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI) as Real,
            )
        })
        .collect();

    for ranks in [1, 2, 4] {
        let totals = run_group(ranks, |env: Environment| {
            let mut reg = Register::new(4, &env).unwrap();
            for &(target, theta, phi) in &circuit {
                let (alpha, beta) = compact_pair(theta, phi);
                reg.compact_unitary(target, alpha, beta);
            }
            reg.total_probability()
        });
        for total in totals {
            assert_abs_diff_eq!(total, 1.0, epsilon = EPS);
        }
    }
}

#[test]
fn sigma_x_twice_is_exactly_the_identity() {
    for ranks in [1, 2, 4] {
        let before = full_state(ranks, 3, |reg| reg.hadamard(0));
        let after = full_state(ranks, 3, |reg| {
            reg.hadamard(0);
            reg.sigma_x(2);
            reg.sigma_x(2);
        });
        // the exchange copies amplitudes verbatim, so this is bit exact
        assert_eq!(before, after);
    }
}

#[test]
fn hadamard_twice_is_the_identity() {
    for ranks in [1, 2, 4] {
        let before = full_state(ranks, 3, mixed_program_prefix);
        let after = full_state(ranks, 3, |reg| {
            mixed_program_prefix(reg);
            reg.hadamard(2);
            reg.hadamard(2);
        });
        for (got, want) in after.iter().zip(&before) {
            assert_abs_diff_eq!(got.re, want.re, epsilon = EPS);
            assert_abs_diff_eq!(got.im, want.im, epsilon = EPS);
        }
    }
}

/// A short state preparation shared by the round-trip tests.
fn mixed_program_prefix(reg: &mut Register) {
    let (alpha, beta) = compact_pair(0.9, 0.5);
    reg.hadamard(0);
    reg.compact_unitary(1, alpha, beta);
    reg.controlled_not(0, 2);
}

#[test]
fn compact_unitary_inverts_with_its_adjoint_pair() {
    let (alpha, beta) = compact_pair(1.05, -2.2);
    for ranks in [1, 2, 4] {
        let before = full_state(ranks, 3, mixed_program_prefix);
        let after = full_state(ranks, 3, |reg| {
            mixed_program_prefix(reg);
            reg.compact_unitary(2, alpha, beta);
            reg.compact_unitary(2, alpha.conj(), -beta);
        });
        for (got, want) in after.iter().zip(&before) {
            assert_abs_diff_eq!(got.re, want.re, epsilon = EPS);
            assert_abs_diff_eq!(got.im, want.im, epsilon = EPS);
        }
    }
}

#[test]
fn sigma_y_twice_is_the_identity() {
    for ranks in [1, 2, 4] {
        let before = full_state(ranks, 3, mixed_program_prefix);
        let after = full_state(ranks, 3, |reg| {
            mixed_program_prefix(reg);
            reg.sigma_y(2);
            reg.sigma_y(2);
        });
        for (got, want) in after.iter().zip(&before) {
            assert_abs_diff_eq!(got.re, want.re, epsilon = EPS);
            assert_abs_diff_eq!(got.im, want.im, epsilon = EPS);
        }
    }
}

#[test]
fn outcome_probabilities_are_complementary() {
    for ranks in [1, 2, 4, 8] {
        let sums = run_group(ranks, |env: Environment| {
            let mut reg = Register::new(3, &env).unwrap();
            mixed_program_prefix(&mut reg);
            (0..3)
                .map(|q| {
                    reg.find_probability_of_outcome(q, 0)
                        + reg.find_probability_of_outcome(q, 1)
                })
                .collect::<Vec<_>>()
        });
        for per_rank in sums {
            for sum in per_rank {
                assert_abs_diff_eq!(sum, 1.0, epsilon = EPS);
            }
        }
    }
}

#[test]
fn collapse_then_probability_is_certain() {
    for ranks in [1, 2, 4] {
        let probabilities = run_group(ranks, |env: Environment| {
            let mut reg = Register::new(3, &env).unwrap();
            reg.hadamard(2);
            let pre = reg.collapse_to_outcome(2, 1);
            (pre, reg.find_probability_of_outcome(2, 1), reg.total_probability())
        });
        for (pre, post, total) in probabilities {
            assert_abs_diff_eq!(pre, 0.5, epsilon = EPS);
            assert_abs_diff_eq!(post, 1.0, epsilon = EPS);
            assert_abs_diff_eq!(total, 1.0, epsilon = EPS);
        }
    }
}
