//! Probability reductions and collapse kernels
//!
//! Chunk-length summations use Kahan compensation so rounding drift stays
//! O(ε) rather than O(N·ε); the cross-rank reduction above them is a
//! plain sum, which is enough for at most R terms of similar magnitude.

use qshard_core::Real;

use crate::chunk::AmpBuffer;

/// Compensated accumulator.
#[derive(Debug, Default, Clone, Copy)]
pub struct KahanSum {
    sum: Real,
    compensation: Real,
}

impl KahanSum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one term. Do not reorder the operations in here.
    #[inline]
    pub fn add(&mut self, value: Real) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    pub fn total(&self) -> Real {
        self.sum
    }
}

/// Σ |amp|² over the whole chunk.
///
/// Serves both the global-norm query and the P(q=0) contribution of a
/// chunk that lies wholly in the zero half of its block.
pub fn chunk_norm_sqr(amps: &AmpBuffer) -> Real {
    let mut acc = KahanSum::new();
    for i in 0..amps.len() {
        acc.add(amps.re[i] * amps.re[i]);
        acc.add(amps.im[i] * amps.im[i]);
    }
    acc.total()
}

/// Σ |amp|² over the amplitudes whose `measure_qubit` bit is 0, for a
/// chunk that contains whole blocks.
pub fn zero_outcome_probability_local(amps: &AmpBuffer, measure_qubit: usize) -> Real {
    let half = 1usize << measure_qubit;
    let block = half << 1;
    let mut acc = KahanSum::new();
    for (re, im) in amps.re.chunks(block).zip(amps.im.chunks(block)) {
        for i in 0..half {
            acc.add(re[i] * re[i]);
            acc.add(im[i] * im[i]);
        }
    }
    acc.total()
}

/// Project onto `outcome` inside a chunk that contains whole blocks:
/// rescale the surviving half by 1/√p, zero the other half.
pub fn collapse_local(amps: &mut AmpBuffer, measure_qubit: usize, outcome: u8, probability: Real) {
    let half = 1usize << measure_qubit;
    let block = half << 1;
    let renorm = 1.0 / probability.sqrt();
    for (re, im) in amps.re.chunks_mut(block).zip(amps.im.chunks_mut(block)) {
        let (zero_half, one_half) = (0..half, half..block);
        let (keep, drop) = if outcome == 0 {
            (zero_half, one_half)
        } else {
            (one_half, zero_half)
        };
        for i in keep {
            re[i] *= renorm;
            im[i] *= renorm;
        }
        for i in drop {
            re[i] = 0.0;
            im[i] = 0.0;
        }
    }
}

/// Rescale a wholly surviving chunk by 1/√p.
pub fn collapse_renorm_chunk(amps: &mut AmpBuffer, probability: Real) {
    let renorm = 1.0 / probability.sqrt();
    for value in amps.re.iter_mut().chain(amps.im.iter_mut()) {
        *value *= renorm;
    }
}

/// Zero a chunk whose whole half was measured away.
pub fn collapse_zero_chunk(amps: &mut AmpBuffer) {
    amps.set_zero();
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qshard_core::Amp;

    const EPS: Real = 1e-12;

    #[test]
    fn kahan_beats_naive_on_long_runs() {
        // many tiny terms after a large one lose bits under naive sums
        let mut acc = KahanSum::new();
        acc.add(1.0);
        for _ in 0..1_000_000 {
            acc.add(1e-16);
        }
        assert_abs_diff_eq!(acc.total(), 1.0 + 1e-10, epsilon = 1e-14);
    }

    #[test]
    fn norm_of_uniform_chunk() {
        let mut amps = AmpBuffer::zeroed(8);
        let s = (0.125 as Real).sqrt();
        for i in 0..8 {
            amps.set_amp(i, Amp::new(s, 0.0));
        }
        assert_abs_diff_eq!(chunk_norm_sqr(&amps), 1.0, epsilon = EPS);
    }

    #[test]
    fn zero_outcome_sums_upper_halves() {
        let mut amps = AmpBuffer::zeroed(8);
        for i in 0..8 {
            amps.set_amp(i, Amp::new(if i & 0b10 == 0 { 0.5 } else { 0.25 }, 0.0));
        }
        // qubit 1: four amplitudes with the bit clear, each 0.25
        assert_abs_diff_eq!(zero_outcome_probability_local(&amps, 1), 1.0, epsilon = EPS);
    }

    #[test]
    fn collapse_keeps_and_renormalizes_the_right_half() {
        let s = (0.25 as Real).sqrt();
        let mut amps = AmpBuffer::zeroed(4);
        for i in 0..4 {
            amps.set_amp(i, Amp::new(s, 0.0));
        }
        collapse_local(&mut amps, 0, 1, 0.5);
        assert_abs_diff_eq!(amps.re[0], 0.0, epsilon = EPS);
        assert_abs_diff_eq!(amps.re[1], s / (0.5 as Real).sqrt(), epsilon = EPS);
        assert_abs_diff_eq!(amps.re[2], 0.0, epsilon = EPS);
        assert_abs_diff_eq!(amps.re[3], s / (0.5 as Real).sqrt(), epsilon = EPS);
        assert_abs_diff_eq!(chunk_norm_sqr(&amps), 1.0, epsilon = EPS);
    }

    #[test]
    fn chunkwide_collapse_kernels() {
        let mut amps = AmpBuffer::zeroed(4);
        amps.re.fill(0.5);
        collapse_renorm_chunk(&mut amps, 0.25);
        assert_abs_diff_eq!(amps.re[0], 1.0, epsilon = EPS);

        collapse_zero_chunk(&mut amps);
        assert!(amps.re.iter().all(|&r| r == 0.0));
    }
}
