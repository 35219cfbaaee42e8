//! Compile-time selection of the real scalar width
//!
//! The whole engine is generic over exactly one decision: whether an
//! amplitude component is an `f32` or an `f64`. The choice is made once,
//! here, by cargo feature; no other module names a concrete float type.

use num_complex::Complex;

/// Real scalar used for amplitude components, probabilities and reductions.
#[cfg(feature = "single")]
pub type Real = f32;

/// Real scalar used for amplitude components, probabilities and reductions.
#[cfg(not(feature = "single"))]
pub type Real = f64;

/// Tolerance for unitarity checks and the collapse-probability floor.
#[cfg(feature = "single")]
pub const REAL_EPS: Real = 1e-5;

/// Tolerance for unitarity checks and the collapse-probability floor.
#[cfg(not(feature = "single"))]
pub const REAL_EPS: Real = 1e-13;

/// A complex amplitude at the selected precision.
pub type Amp = Complex<Real>;

/// Byte width of the real scalar; drives the exchange message cap.
pub const fn real_bytes() -> usize {
    core::mem::size_of::<Real>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_bytes_matches_type() {
        assert_eq!(real_bytes(), core::mem::size_of::<Real>());
        assert!(real_bytes() == 4 || real_bytes() == 8);
    }

    #[test]
    fn eps_is_small() {
        assert!(REAL_EPS > 0.0);
        assert!(REAL_EPS < 1e-4);
    }
}
