//! Local kernels: every amplitude pair lies inside the chunk
//!
//! The chunk is walked block by block; within a block, index i pairs
//! with i + 2^target. Controlled variants test control bits against the
//! *global* index, so they take the chunk's global offset.

use qshard_core::{Amp, Matrix2, Real};
use rayon::prelude::*;

use super::PARALLEL_THRESHOLD;
use crate::chunk::AmpBuffer;

/// Apply a 2×2 operator to every (upper, lower) pair of the chunk.
pub fn unitary_local(amps: &mut AmpBuffer, target: usize, m: &Matrix2) {
    let half = 1usize << target;
    let block = half << 1;
    let [[m00, m01], [m10, m11]] = *m;
    let kernel = move |re: &mut [Real], im: &mut [Real]| {
        for i in 0..half {
            let a = Amp::new(re[i], im[i]);
            let b = Amp::new(re[i + half], im[i + half]);
            let up = m00 * a + m01 * b;
            let lo = m10 * a + m11 * b;
            re[i] = up.re;
            im[i] = up.im;
            re[i + half] = lo.re;
            im[i + half] = lo.im;
        }
    };
    if amps.len() >= PARALLEL_THRESHOLD {
        amps.re
            .par_chunks_mut(block)
            .zip(amps.im.par_chunks_mut(block))
            .for_each(|(re, im)| kernel(re, im));
    } else {
        for (re, im) in amps.re.chunks_mut(block).zip(amps.im.chunks_mut(block)) {
            kernel(re, im);
        }
    }
}

/// Apply a 2×2 operator to pairs whose global index has every bit of
/// `control_mask` set. A single-control gate passes a one-bit mask; the
/// mask never contains the target bit, so both halves of a pair agree on
/// the condition.
pub fn multi_controlled_unitary_local(
    amps: &mut AmpBuffer,
    chunk_offset: usize,
    control_mask: u64,
    target: usize,
    m: &Matrix2,
) {
    let half = 1usize << target;
    let block = half << 1;
    let [[m00, m01], [m10, m11]] = *m;
    let kernel = move |block_index: usize, re: &mut [Real], im: &mut [Real]| {
        let base = chunk_offset + block_index * block;
        for i in 0..half {
            if (base + i) as u64 & control_mask != control_mask {
                continue;
            }
            let a = Amp::new(re[i], im[i]);
            let b = Amp::new(re[i + half], im[i + half]);
            let up = m00 * a + m01 * b;
            let lo = m10 * a + m11 * b;
            re[i] = up.re;
            im[i] = up.im;
            re[i + half] = lo.re;
            im[i + half] = lo.im;
        }
    };
    if amps.len() >= PARALLEL_THRESHOLD {
        amps.re
            .par_chunks_mut(block)
            .zip(amps.im.par_chunks_mut(block))
            .enumerate()
            .for_each(|(bi, (re, im))| kernel(bi, re, im));
    } else {
        for (bi, (re, im)) in amps
            .re
            .chunks_mut(block)
            .zip(amps.im.chunks_mut(block))
            .enumerate()
        {
            kernel(bi, re, im);
        }
    }
}

/// Single-control version of [`multi_controlled_unitary_local`].
pub fn controlled_unitary_local(
    amps: &mut AmpBuffer,
    chunk_offset: usize,
    control: usize,
    target: usize,
    m: &Matrix2,
) {
    multi_controlled_unitary_local(amps, chunk_offset, 1u64 << control, target, m);
}

/// σx: swap the halves of every pair.
pub fn sigma_x_local(amps: &mut AmpBuffer, target: usize) {
    let half = 1usize << target;
    let block = half << 1;
    let kernel = move |re: &mut [Real], im: &mut [Real]| {
        for i in 0..half {
            re.swap(i, i + half);
            im.swap(i, i + half);
        }
    };
    if amps.len() >= PARALLEL_THRESHOLD {
        amps.re
            .par_chunks_mut(block)
            .zip(amps.im.par_chunks_mut(block))
            .for_each(|(re, im)| kernel(re, im));
    } else {
        for (re, im) in amps.re.chunks_mut(block).zip(amps.im.chunks_mut(block)) {
            kernel(re, im);
        }
    }
}

/// σy: upper half gets −i·lower, lower half gets i·upper.
pub fn sigma_y_local(amps: &mut AmpBuffer, target: usize) {
    let half = 1usize << target;
    let block = half << 1;
    let kernel = move |re: &mut [Real], im: &mut [Real]| {
        for i in 0..half {
            let a = Amp::new(re[i], im[i]);
            let b = Amp::new(re[i + half], im[i + half]);
            // −i·b and i·a, written out component-wise
            re[i] = b.im;
            im[i] = -b.re;
            re[i + half] = -a.im;
            im[i + half] = a.re;
        }
    };
    if amps.len() >= PARALLEL_THRESHOLD {
        amps.re
            .par_chunks_mut(block)
            .zip(amps.im.par_chunks_mut(block))
            .for_each(|(re, im)| kernel(re, im));
    } else {
        for (re, im) in amps.re.chunks_mut(block).zip(amps.im.chunks_mut(block)) {
            kernel(re, im);
        }
    }
}

/// CNOT: swap the halves of pairs whose global index has the control bit.
pub fn controlled_not_local(
    amps: &mut AmpBuffer,
    chunk_offset: usize,
    control: usize,
    target: usize,
) {
    let half = 1usize << target;
    let block = half << 1;
    let control_mask = 1u64 << control;
    let kernel = move |block_index: usize, re: &mut [Real], im: &mut [Real]| {
        let base = chunk_offset + block_index * block;
        for i in 0..half {
            if (base + i) as u64 & control_mask != 0 {
                re.swap(i, i + half);
                im.swap(i, i + half);
            }
        }
    };
    if amps.len() >= PARALLEL_THRESHOLD {
        amps.re
            .par_chunks_mut(block)
            .zip(amps.im.par_chunks_mut(block))
            .enumerate()
            .for_each(|(bi, (re, im))| kernel(bi, re, im));
    } else {
        for (bi, (re, im)) in amps
            .re
            .chunks_mut(block)
            .zip(amps.im.chunks_mut(block))
            .enumerate()
        {
            kernel(bi, re, im);
        }
    }
}

/// Hadamard with the constant pulled out of the pair loop.
pub fn hadamard_local(amps: &mut AmpBuffer, target: usize) {
    let half = 1usize << target;
    let block = half << 1;
    let s = std::f64::consts::FRAC_1_SQRT_2 as Real;
    let kernel = move |re: &mut [Real], im: &mut [Real]| {
        for i in 0..half {
            let a = Amp::new(re[i], im[i]);
            let b = Amp::new(re[i + half], im[i + half]);
            let up = (a + b) * s;
            let lo = (a - b) * s;
            re[i] = up.re;
            im[i] = up.im;
            re[i + half] = lo.re;
            im[i + half] = lo.im;
        }
    };
    if amps.len() >= PARALLEL_THRESHOLD {
        amps.re
            .par_chunks_mut(block)
            .zip(amps.im.par_chunks_mut(block))
            .for_each(|(re, im)| kernel(re, im));
    } else {
        for (re, im) in amps.re.chunks_mut(block).zip(amps.im.chunks_mut(block)) {
            kernel(re, im);
        }
    }
}

/// Multiply every lower-half amplitude (target bit set) by `factor`.
pub fn phase_factor_local(amps: &mut AmpBuffer, target: usize, factor: Amp) {
    let half = 1usize << target;
    let block = half << 1;
    let kernel = move |re: &mut [Real], im: &mut [Real]| {
        for i in half..block {
            let a = Amp::new(re[i], im[i]) * factor;
            re[i] = a.re;
            im[i] = a.im;
        }
    };
    if amps.len() >= PARALLEL_THRESHOLD {
        amps.re
            .par_chunks_mut(block)
            .zip(amps.im.par_chunks_mut(block))
            .for_each(|(re, im)| kernel(re, im));
    } else {
        for (re, im) in amps.re.chunks_mut(block).zip(amps.im.chunks_mut(block)) {
            kernel(re, im);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qshard_core::matrix_from_compact;

    const EPS: Real = 1e-12;

    fn single_qubit_zero() -> AmpBuffer {
        let mut amps = AmpBuffer::zeroed(2);
        amps.re[0] = 1.0;
        amps
    }

    #[test]
    fn sigma_x_flips_basis_state() {
        let mut amps = single_qubit_zero();
        sigma_x_local(&mut amps, 0);
        assert_abs_diff_eq!(amps.re[0], 0.0, epsilon = EPS);
        assert_abs_diff_eq!(amps.re[1], 1.0, epsilon = EPS);
    }

    #[test]
    fn sigma_y_maps_zero_to_i_one() {
        let mut amps = single_qubit_zero();
        sigma_y_local(&mut amps, 0);
        assert_abs_diff_eq!(amps.amp(0).norm(), 0.0, epsilon = EPS);
        assert_abs_diff_eq!(amps.im[1], 1.0, epsilon = EPS);
        assert_abs_diff_eq!(amps.re[1], 0.0, epsilon = EPS);
    }

    #[test]
    fn hadamard_makes_plus_state() {
        let mut amps = single_qubit_zero();
        hadamard_local(&mut amps, 0);
        let s = std::f64::consts::FRAC_1_SQRT_2 as Real;
        assert_abs_diff_eq!(amps.re[0], s, epsilon = EPS);
        assert_abs_diff_eq!(amps.re[1], s, epsilon = EPS);
    }

    #[test]
    fn unitary_matches_compact_expansion() {
        let theta: Real = 0.61;
        let alpha = Amp::new(theta.cos(), 0.2);
        let beta = Amp::new(0.1, theta.sin());
        let norm = (alpha.norm_sqr() + beta.norm_sqr()).sqrt();
        let (alpha, beta) = (alpha / norm, beta / norm);

        let mut amps = AmpBuffer::zeroed(8);
        amps.re[3] = 0.5;
        amps.im[6] = -0.5;
        amps.re[0] = (0.5 as Real).sqrt();
        let mut expect = amps.clone();

        unitary_local(&mut amps, 1, &matrix_from_compact(alpha, beta));
        // reference: apply the matrix pairwise by hand
        let m = matrix_from_compact(alpha, beta);
        for i in 0..8 {
            if i & 0b10 != 0 {
                continue;
            }
            let a = expect.amp(i);
            let b = expect.amp(i | 0b10);
            expect.set_amp(i, m[0][0] * a + m[0][1] * b);
            expect.set_amp(i | 0b10, m[1][0] * a + m[1][1] * b);
        }
        for i in 0..8 {
            assert_abs_diff_eq!(amps.re[i], expect.re[i], epsilon = EPS);
            assert_abs_diff_eq!(amps.im[i], expect.im[i], epsilon = EPS);
        }
    }

    #[test]
    fn controlled_not_respects_control_bit() {
        // |10⟩ (qubit 1 set): CNOT(control=1, target=0) → |11⟩
        let mut amps = AmpBuffer::zeroed(4);
        amps.re[2] = 1.0;
        controlled_not_local(&mut amps, 0, 1, 0);
        assert_abs_diff_eq!(amps.re[3], 1.0, epsilon = EPS);
        assert_abs_diff_eq!(amps.re[2], 0.0, epsilon = EPS);

        // |00⟩ stays put
        let mut amps = AmpBuffer::zeroed(4);
        amps.re[0] = 1.0;
        controlled_not_local(&mut amps, 0, 1, 0);
        assert_abs_diff_eq!(amps.re[0], 1.0, epsilon = EPS);
    }

    #[test]
    fn controlled_not_uses_global_index() {
        // second chunk of a 2-qubit state split across 2 ranks:
        // local index 0 is global |10⟩, control = qubit 1 is set
        let mut amps = AmpBuffer::zeroed(2);
        amps.re[0] = 1.0;
        controlled_not_local(&mut amps, 2, 1, 0);
        assert_abs_diff_eq!(amps.re[1], 1.0, epsilon = EPS);
        assert_abs_diff_eq!(amps.re[0], 0.0, epsilon = EPS);
    }

    #[test]
    fn multi_controlled_requires_all_bits() {
        // |110⟩: controls {1, 2} satisfied, X on target 0 → |111⟩
        let mut amps = AmpBuffer::zeroed(8);
        amps.re[0b110] = 1.0;
        let x = [
            [Amp::new(0.0, 0.0), Amp::new(1.0, 0.0)],
            [Amp::new(1.0, 0.0), Amp::new(0.0, 0.0)],
        ];
        multi_controlled_unitary_local(&mut amps, 0, 0b110, 0, &x);
        assert_abs_diff_eq!(amps.re[0b111], 1.0, epsilon = EPS);

        // |010⟩: control 2 missing, untouched
        let mut amps = AmpBuffer::zeroed(8);
        amps.re[0b010] = 1.0;
        multi_controlled_unitary_local(&mut amps, 0, 0b110, 0, &x);
        assert_abs_diff_eq!(amps.re[0b010], 1.0, epsilon = EPS);
    }

    #[test]
    fn phase_factor_touches_only_lower_half() {
        let mut amps = AmpBuffer::zeroed(4);
        amps.re.fill(0.5);
        phase_factor_local(&mut amps, 0, Amp::new(0.0, 1.0));
        assert_abs_diff_eq!(amps.re[0], 0.5, epsilon = EPS);
        assert_abs_diff_eq!(amps.im[1], 0.5, epsilon = EPS);
        assert_abs_diff_eq!(amps.re[1], 0.0, epsilon = EPS);
        assert_abs_diff_eq!(amps.re[2], 0.5, epsilon = EPS);
        assert_abs_diff_eq!(amps.im[3], 0.5, epsilon = EPS);
    }
}
