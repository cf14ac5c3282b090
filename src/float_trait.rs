//! Float trait abstraction for f32/f64 support.
//!
//! All profile arithmetic (smoothing, band estimation, scoring) is generic
//! over the working precision. The production acquisition pipeline runs in
//! f32; f64 is useful for tests and offline analysis.

use num_traits::{Float, FromPrimitive, NumAssign};
use std::fmt::Debug;
use std::iter::Sum;

/// Trait alias for floating point types usable as working precision.
///
/// Combines the bounds needed by the correction core:
/// - Basic float operations (Float, NumAssign)
/// - Conversion from primitive types (FromPrimitive)
/// - Iteration support (Sum)
/// - Thread safety for parallel row processing
pub trait DebandFloat:
    Float + FromPrimitive + NumAssign + Sum + Debug + Send + Sync + 'static
{
    /// Create a value from an f64 constant.
    fn from_f64_c(val: f64) -> Self;

    /// Create a value from a usize count.
    fn usize_as(val: usize) -> Self;

    /// Create a value from a u16 image sample.
    fn u16_as(val: u16) -> Self;
}

impl DebandFloat for f32 {
    #[inline]
    fn from_f64_c(val: f64) -> Self {
        val as f32
    }

    #[inline]
    fn usize_as(val: usize) -> Self {
        val as f32
    }

    #[inline]
    fn u16_as(val: u16) -> Self {
        val as f32
    }
}

impl DebandFloat for f64 {
    #[inline]
    fn from_f64_c(val: f64) -> Self {
        val
    }

    #[inline]
    fn usize_as(val: usize) -> Self {
        val as f64
    }

    #[inline]
    fn u16_as(val: u16) -> Self {
        val as f64
    }
}
