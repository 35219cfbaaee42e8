//! Distributed kernels: the other half of every pair is in the pair buffer
//!
//! The dispatcher has already exchanged chunks with the pair rank, so
//! these kernels combine the local chunk and the pair buffer elementwise.
//! `is_upper` says which buffer plays the upper half; the output always
//! goes into the local chunk. Controlled variants test control bits of
//! the global index, which is the same for both halves of a pair.

use qshard_core::{Amp, Real};
use rayon::prelude::*;

use super::PARALLEL_THRESHOLD;
use crate::chunk::AmpBuffer;

/// Tile width for the parallel elementwise walks.
const TILE: usize = 1 << 12;

/// Rewrite every local amplitude as `f(local_index, mine, theirs)`.
///
/// Callers that need the global index fold the chunk offset into their
/// closure.
fn for_each_amp<F>(amps: &mut AmpBuffer, pair: &AmpBuffer, f: F)
where
    F: Fn(usize, Amp, Amp) -> Amp + Send + Sync,
{
    debug_assert_eq!(amps.len(), pair.len());
    let n = amps.len();
    if n >= PARALLEL_THRESHOLD {
        amps.re
            .par_chunks_mut(TILE)
            .zip(amps.im.par_chunks_mut(TILE))
            .zip(pair.re.par_chunks(TILE).zip(pair.im.par_chunks(TILE)))
            .enumerate()
            .for_each(|(tile, ((mre, mim), (pre, pim)))| {
                let base = tile * TILE;
                for i in 0..mre.len() {
                    let out = f(base + i, Amp::new(mre[i], mim[i]), Amp::new(pre[i], pim[i]));
                    mre[i] = out.re;
                    mim[i] = out.im;
                }
            });
    } else {
        for i in 0..n {
            let out = f(i, amps.amp(i), pair.amp(i));
            amps.re[i] = out.re;
            amps.im[i] = out.im;
        }
    }
}

/// Compact-pair update: out = rot1·upper + rot2*·lower.
pub fn compact_unitary_dist(
    amps: &mut AmpBuffer,
    pair: &AmpBuffer,
    rot1: Amp,
    rot2: Amp,
    is_upper: bool,
) {
    let rot2_conj = rot2.conj();
    for_each_amp(amps, pair, move |_, mine, theirs| {
        let (up, lo) = if is_upper { (mine, theirs) } else { (theirs, mine) };
        rot1 * up + rot2_conj * lo
    });
}

/// General-matrix update: out = rot1·upper + rot2·lower.
pub fn unitary_dist(amps: &mut AmpBuffer, pair: &AmpBuffer, rot1: Amp, rot2: Amp, is_upper: bool) {
    for_each_amp(amps, pair, move |_, mine, theirs| {
        let (up, lo) = if is_upper { (mine, theirs) } else { (theirs, mine) };
        rot1 * up + rot2 * lo
    });
}

/// [`compact_unitary_dist`] gated on a control bit of the global index.
pub fn controlled_compact_unitary_dist(
    amps: &mut AmpBuffer,
    pair: &AmpBuffer,
    chunk_offset: usize,
    control: usize,
    rot1: Amp,
    rot2: Amp,
    is_upper: bool,
) {
    let rot2_conj = rot2.conj();
    let control_mask = 1u64 << control;
    for_each_amp(amps, pair, move |i, mine, theirs| {
        if (chunk_offset + i) as u64 & control_mask == 0 {
            return mine;
        }
        let (up, lo) = if is_upper { (mine, theirs) } else { (theirs, mine) };
        rot1 * up + rot2_conj * lo
    });
}

/// [`unitary_dist`] gated on a control bit of the global index.
pub fn controlled_unitary_dist(
    amps: &mut AmpBuffer,
    pair: &AmpBuffer,
    chunk_offset: usize,
    control: usize,
    rot1: Amp,
    rot2: Amp,
    is_upper: bool,
) {
    let control_mask = 1u64 << control;
    for_each_amp(amps, pair, move |i, mine, theirs| {
        if (chunk_offset + i) as u64 & control_mask == 0 {
            return mine;
        }
        let (up, lo) = if is_upper { (mine, theirs) } else { (theirs, mine) };
        rot1 * up + rot2 * lo
    });
}

/// [`unitary_dist`] gated on every bit of `control_mask` being set.
pub fn multi_controlled_unitary_dist(
    amps: &mut AmpBuffer,
    pair: &AmpBuffer,
    chunk_offset: usize,
    control_mask: u64,
    rot1: Amp,
    rot2: Amp,
    is_upper: bool,
) {
    for_each_amp(amps, pair, move |i, mine, theirs| {
        if (chunk_offset + i) as u64 & control_mask != control_mask {
            return mine;
        }
        let (up, lo) = if is_upper { (mine, theirs) } else { (theirs, mine) };
        rot1 * up + rot2 * lo
    });
}

/// σx: the pair buffer simply becomes this rank's chunk.
pub fn sigma_x_dist(amps: &mut AmpBuffer, pair: &AmpBuffer) {
    amps.re.copy_from_slice(&pair.re);
    amps.im.copy_from_slice(&pair.im);
}

/// σy: −i·pair on the upper rank, i·pair on the lower.
pub fn sigma_y_dist(amps: &mut AmpBuffer, pair: &AmpBuffer, is_upper: bool) {
    for_each_amp(amps, pair, move |_, _mine, theirs| {
        if is_upper {
            Amp::new(theirs.im, -theirs.re)
        } else {
            Amp::new(-theirs.im, theirs.re)
        }
    });
}

/// CNOT: take the pair value where the control bit is set, else keep own.
pub fn controlled_not_dist(
    amps: &mut AmpBuffer,
    pair: &AmpBuffer,
    chunk_offset: usize,
    control: usize,
) {
    let control_mask = 1u64 << control;
    for_each_amp(amps, pair, move |i, mine, theirs| {
        if (chunk_offset + i) as u64 & control_mask != 0 {
            theirs
        } else {
            mine
        }
    });
}

/// Hadamard with a fixed coefficient pair; the sign depends on which half
/// this rank holds.
pub fn hadamard_dist(amps: &mut AmpBuffer, pair: &AmpBuffer, is_upper: bool) {
    let s = std::f64::consts::FRAC_1_SQRT_2 as Real;
    for_each_amp(amps, pair, move |_, mine, theirs| {
        if is_upper {
            (mine + theirs) * s
        } else {
            (theirs - mine) * s
        }
    });
}

/// Phase on a chunk wholly inside the lower half: scale everything.
pub fn phase_factor_chunk(amps: &mut AmpBuffer, factor: Amp) {
    let n = amps.len();
    if n >= PARALLEL_THRESHOLD {
        amps.re
            .par_chunks_mut(TILE)
            .zip(amps.im.par_chunks_mut(TILE))
            .for_each(|(re, im)| {
                for i in 0..re.len() {
                    let a = Amp::new(re[i], im[i]) * factor;
                    re[i] = a.re;
                    im[i] = a.im;
                }
            });
    } else {
        for i in 0..n {
            let a = amps.amp(i) * factor;
            amps.set_amp(i, a);
        }
    }
}
