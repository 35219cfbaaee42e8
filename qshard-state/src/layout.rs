//! The locality oracle: pure functions over (chunk size, target qubit)
//!
//! For a gate on qubit q the state vector decomposes into blocks of
//! 2·2^q amplitudes; the upper half of a block holds the amplitudes with
//! the qth bit clear, the lower half those with it set. Everything the
//! dispatcher needs to know — local or remote, which orientation, which
//! peer — is a pure function of the chunk geometry, computed identically
//! on every rank.

/// True iff every pair (i, i ⊕ 2^target) lies inside one chunk, so the
/// local kernel suffices.
pub fn half_block_fits_in_chunk(chunk_size: usize, target: usize) -> bool {
    chunk_size > (1 << target)
}

/// True iff this chunk is the upper half of its block for `target`.
///
/// Only meaningful when the half-block does not fit in a chunk; then a
/// chunk lies wholly in one half.
pub fn chunk_is_upper(chunk_id: usize, chunk_size: usize, target: usize) -> bool {
    let size_half_block = 1 << target;
    let size_block = size_half_block * 2;
    let pos_in_block = (chunk_id * chunk_size) % size_block;
    pos_in_block < size_half_block
}

/// Id of the chunk holding the matching half of this chunk's block.
pub fn chunk_pair_id(is_upper: bool, chunk_id: usize, chunk_size: usize, target: usize) -> usize {
    let chunks_per_half_block = (1 << target) / chunk_size;
    if is_upper {
        chunk_id + chunks_per_half_block
    } else {
        chunk_id - chunks_per_half_block
    }
}

/// True iff this chunk sits wholly in the "qubit = 1" portion of its
/// block, so it contributes nothing to P(qubit = 0).
///
/// Only meaningful when the half-block does not fit in a chunk.
pub fn chunk_skipped_for_zero_outcome(
    chunk_id: usize,
    chunk_size: usize,
    measure_qubit: usize,
) -> bool {
    let chunks_per_half_block = (1 << measure_qubit) / chunk_size;
    chunk_id & chunks_per_half_block != 0
}
