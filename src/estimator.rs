//! Slow/fast decomposition of a reference line profile.
//!
//! The measured profile mixes two things: a slowly varying real component
//! (illumination gradient, scatter, drift) and the fast periodic readout
//! banding. The low-passed profile is taken as the real part; the residual
//! on top of it is the artifact to remove.

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::config::CorrectionParams;
use crate::error::DebandError;
use crate::float_trait::DebandFloat;
use crate::smooth::moving_average;
use crate::stripe::{extract_stripe, reduce_to_profile};

/// The two components of a line profile.
#[derive(Debug, Clone)]
pub struct BandSplit<F: DebandFloat> {
    /// Low-passed profile: the assumed-real slow background.
    pub slow: Array1<F>,
    /// Fast residual riding on the slow component: the banding artifact.
    pub band: Array1<F>,
}

/// Reference-stripe measurement of an image: the reduced line profile and
/// its slow/fast split.
#[derive(Debug, Clone)]
pub struct ReferenceBand<F: DebandFloat> {
    /// Per-line profile of the reference stripe.
    pub profile: Array1<F>,
    /// Decomposition of that profile.
    pub split: BandSplit<F>,
}

/// Split `profile` into a slow background (moving average over `window`)
/// and the fast residual. Index alignment is preserved; both outputs have
/// the profile's length.
pub fn split_profile<F: DebandFloat>(profile: ArrayView1<F>, window: usize) -> BandSplit<F> {
    let slow = moving_average(profile, window);
    let band = &profile - &slow;
    BandSplit { slow, band }
}

/// Measure the reference stripe of `image` and split its profile.
/// This is the shared front half of correction, detection and optimization.
pub fn estimate_band<F: DebandFloat>(
    image: ArrayView2<u16>,
    params: &CorrectionParams,
) -> Result<ReferenceBand<F>, DebandError> {
    let stripe = extract_stripe::<F>(
        image,
        params.axis,
        params.stripe_width,
        params.stripe_offset,
    )?;
    let profile = reduce_to_profile(stripe.view(), params.axis, params.stat)?;
    let split = split_profile(profile.view(), params.smooth_window);
    Ok(ReferenceBand { profile, split })
}

/// Population standard deviation of a profile (divide by N).
pub fn profile_std<F: DebandFloat>(profile: ArrayView1<F>) -> F {
    let n = profile.len();
    if n == 0 {
        return F::zero();
    }
    let count = F::usize_as(n);
    let mean = profile.iter().copied().sum::<F>() / count;
    let variance = profile
        .iter()
        .map(|&v| {
            let d = v - mean;
            d * d
        })
        .sum::<F>()
        / count;
    variance.sqrt()
}
