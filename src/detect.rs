//! Banding presence check.
//!
//! Measures the spread of the fast residual on the reference stripe and
//! compares it against a threshold, so callers can skip correction on
//! frames that do not need it.

use ndarray::ArrayView2;
use num_traits::ToPrimitive;

use crate::config::CorrectionParams;
use crate::error::DebandError;
use crate::estimator::{estimate_band, profile_std};
use crate::float_trait::DebandFloat;

/// Outcome of a banding presence check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionResult {
    /// True when the band residual spread strictly exceeds the threshold.
    pub has_banding: bool,
    /// Spread (population std) of the band residual, in native intensity
    /// units.
    pub band_std: f64,
}

/// Decide whether banding correction is worth running at all.
///
/// `threshold` is in the image's native intensity units; the production
/// default is [`crate::config::DEFAULT_DETECT_THRESHOLD`]. Detection only
/// measures the reference stripe and never touches the rest of the frame.
pub fn detect_banding<F: DebandFloat>(
    image: ArrayView2<u16>,
    params: &CorrectionParams,
    threshold: f64,
) -> Result<DetectionResult, DebandError> {
    let reference = estimate_band::<F>(image, params)?;
    let band_std = profile_std(reference.split.band.view())
        .to_f64()
        .unwrap_or(f64::NAN);
    Ok(DetectionResult {
        has_banding: band_std > threshold,
        band_std,
    })
}
