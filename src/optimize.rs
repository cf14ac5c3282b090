//! Grid search for the smoothing window.
//!
//! Scores each candidate window by correcting the reference stripe alone
//! and measuring how uniform its profile becomes. The search is
//! O(candidates × lines × stripe_width) — cheap enough to run once per
//! capture session, too expensive for every frame; callers memoize the
//! result (see the pipeline module).

use ndarray::{Array1, Array2, ArrayView2};
use num_traits::ToPrimitive;
use rayon::prelude::*;

use crate::config::{BandAxis, CorrectionParams};
use crate::error::DebandError;
use crate::estimator::split_profile;
use crate::float_trait::DebandFloat;
use crate::stripe::{extract_stripe, reduce_to_profile};

/// Smallest candidate window in the default grid.
const CANDIDATE_MIN: usize = 10;

/// Largest candidate window in the default grid.
const CANDIDATE_CAP: usize = 512;

/// Step between candidate windows in the default grid.
const CANDIDATE_STEP: usize = 5;

/// Fixed fallback grid for images too short for the regular range.
const FALLBACK_CANDIDATES: [usize; 5] = [10, 32, 64, 128, 256];

/// Result of a smoothing-window search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizationResult {
    /// Window with the lowest corrected-stripe std. Ties keep the smallest
    /// candidate, since iteration ascends and only a strictly lower score
    /// replaces the incumbent.
    pub best_window: usize,
    /// The winning score (corrected-stripe profile std; lower is better).
    pub best_score: f64,
}

/// Candidate windows for a profile of `lines` entries:
/// `10..=min(512, lines / 4)` stepping by 5, or a fixed small set when that
/// range is empty.
pub fn default_candidates(lines: usize) -> Vec<usize> {
    let max_win = CANDIDATE_CAP.min(lines / 4);
    let candidates: Vec<usize> = (CANDIDATE_MIN..=max_win).step_by(CANDIDATE_STEP).collect();
    if candidates.is_empty() {
        FALLBACK_CANDIDATES.to_vec()
    } else {
        candidates
    }
}

/// Subtract the per-line band residual from the stripe itself.
fn subtract_band_from_stripe<F: DebandFloat>(
    stripe: ArrayView2<F>,
    band: &Array1<F>,
    axis: BandAxis,
) -> Array2<F> {
    match axis {
        BandAxis::Horizontal => {
            let mut out = stripe.to_owned();
            for (mut row, &delta) in out.rows_mut().into_iter().zip(band.iter()) {
                row.mapv_inplace(|v| v - delta);
            }
            out
        }
        BandAxis::Vertical => {
            let mut out = stripe.to_owned();
            for (mut col, &delta) in out.columns_mut().into_iter().zip(band.iter()) {
                col.mapv_inplace(|v| v - delta);
            }
            out
        }
    }
}

/// Grid-search the smoothing window that leaves the reference stripe most
/// uniform after correction.
///
/// `candidates` of `None` uses [`default_candidates`]; an explicitly empty
/// slice is an error. `params.smooth_window` is ignored — every candidate
/// replaces it in turn. Deterministic: scores are gathered in candidate
/// order even though they are evaluated in parallel.
pub fn optimize_smooth_window<F: DebandFloat>(
    image: ArrayView2<u16>,
    params: &CorrectionParams,
    candidates: Option<&[usize]>,
) -> Result<OptimizationResult, DebandError> {
    let stripe = extract_stripe::<F>(
        image,
        params.axis,
        params.stripe_width,
        params.stripe_offset,
    )?;
    let profile = reduce_to_profile(stripe.view(), params.axis, params.stat)?;

    let owned;
    let candidates: &[usize] = match candidates {
        Some(c) => c,
        None => {
            owned = default_candidates(profile.len());
            &owned
        }
    };
    if candidates.is_empty() {
        return Err(DebandError::NoCandidates);
    }

    let scores: Vec<Result<f64, DebandError>> = candidates
        .par_iter()
        .map(|&window| {
            let split = split_profile(profile.view(), window);
            let corrected = subtract_band_from_stripe(stripe.view(), &split.band, params.axis);
            let corrected_profile =
                reduce_to_profile(corrected.view(), params.axis, params.stat)?;
            Ok(crate::estimator::profile_std(corrected_profile.view())
                .to_f64()
                .unwrap_or(f64::INFINITY))
        })
        .collect();

    let mut best_window = candidates[0];
    let mut best_score = f64::INFINITY;
    for (&window, score) in candidates.iter().zip(scores) {
        let score = score?;
        if score < best_score {
            best_score = score;
            best_window = window;
        }
    }

    log::info!(
        "{} banding: optimized smooth window = {} (score: {:.2})",
        params.axis,
        best_window,
        best_score
    );

    Ok(OptimizationResult {
        best_window,
        best_score,
    })
}
