//! The per-rank slice of the state vector and its pair buffer

use num_complex::Complex;
use qshard_core::{Amp, Real};

use crate::error::StateError;

/// A contiguous run of amplitudes stored as parallel real and imaginary
/// arrays, the shape every kernel and every exchange message works on.
#[derive(Debug, Clone, PartialEq)]
pub struct AmpBuffer {
    pub re: Vec<Real>,
    pub im: Vec<Real>,
}

impl AmpBuffer {
    /// All-zero buffer of `len` amplitudes.
    pub fn zeroed(len: usize) -> Self {
        AmpBuffer {
            re: vec![0.0; len],
            im: vec![0.0; len],
        }
    }

    /// Number of amplitudes.
    pub fn len(&self) -> usize {
        self.re.len()
    }

    pub fn is_empty(&self) -> bool {
        self.re.is_empty()
    }

    /// Amplitude at a local index.
    #[inline]
    pub fn amp(&self, index: usize) -> Amp {
        Complex::new(self.re[index], self.im[index])
    }

    /// Overwrite the amplitude at a local index.
    #[inline]
    pub fn set_amp(&mut self, index: usize, value: Amp) {
        self.re[index] = value.re;
        self.im[index] = value.im;
    }

    /// Zero every amplitude.
    pub fn set_zero(&mut self) {
        self.re.fill(0.0);
        self.im.fill(0.0);
    }
}

/// One rank's partition of an n-qubit pure state.
///
/// Rank r owns global indices [r·C, (r+1)·C) where C = 2^n / R. The pair
/// buffer has the same shape and is written only by the exchange
/// protocol; a distributed kernel then reads it as the other half of the
/// block while writing its output into the local chunk.
#[derive(Debug)]
pub struct ChunkedState {
    num_qubits: usize,
    total_amps: usize,
    chunk_id: usize,
    num_chunks: usize,
    amps: AmpBuffer,
    pair: AmpBuffer,
}

impl ChunkedState {
    /// Allocate this rank's chunk of an n-qubit state, zero-filled.
    ///
    /// `num_chunks` must be a power of two no larger than 2^n, so that the
    /// chunk size is a whole power of two and every block half maps onto
    /// whole chunks.
    pub fn new(num_qubits: usize, chunk_id: usize, num_chunks: usize) -> Result<Self, StateError> {
        if num_qubits == 0 {
            return Err(StateError::NoQubits);
        }
        if !num_chunks.is_power_of_two() {
            return Err(StateError::RanksNotPowerOfTwo { ranks: num_chunks });
        }
        let total_amps = 1usize << num_qubits;
        if num_chunks > total_amps {
            return Err(StateError::TooManyRanks { ranks: num_chunks, num_qubits });
        }
        if chunk_id >= num_chunks {
            return Err(StateError::ChunkIdOutOfRange { chunk_id, ranks: num_chunks });
        }
        let chunk_size = total_amps / num_chunks;
        Ok(ChunkedState {
            num_qubits,
            total_amps,
            chunk_id,
            num_chunks,
            amps: AmpBuffer::zeroed(chunk_size),
            pair: AmpBuffer::zeroed(chunk_size),
        })
    }

    /// Set the global state to |0…0⟩: chunk 0 holds the unit amplitude.
    pub fn init_zero_state(&mut self) {
        self.amps.set_zero();
        if self.chunk_id == 0 {
            self.amps.re[0] = 1.0;
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Global amplitude count, 2^n.
    pub fn total_amps(&self) -> usize {
        self.total_amps
    }

    /// Amplitudes owned by this rank.
    pub fn chunk_size(&self) -> usize {
        self.amps.len()
    }

    pub fn chunk_id(&self) -> usize {
        self.chunk_id
    }

    pub fn num_chunks(&self) -> usize {
        self.num_chunks
    }

    /// Global index of this chunk's first amplitude.
    pub fn global_offset(&self) -> usize {
        self.chunk_id * self.chunk_size()
    }

    pub fn amps(&self) -> &AmpBuffer {
        &self.amps
    }

    pub fn amps_mut(&mut self) -> &mut AmpBuffer {
        &mut self.amps
    }

    /// Local chunk read-only, pair buffer writable: the exchange view.
    pub fn split_for_exchange(&mut self) -> (&AmpBuffer, &mut AmpBuffer) {
        (&self.amps, &mut self.pair)
    }

    /// Local chunk writable, pair buffer read-only: the kernel view.
    pub fn split_for_update(&mut self) -> (&mut AmpBuffer, &AmpBuffer) {
        (&mut self.amps, &self.pair)
    }
}
