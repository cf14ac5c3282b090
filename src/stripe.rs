//! Reference-stripe extraction and per-line reduction.
//!
//! The sensor carries a stripe of masked (dark) pixels along one edge:
//! the last columns for horizontal banding, the bottom rows for vertical.
//! Reducing each line of that stripe with a robust statistic yields the 1D
//! profile that drives estimation, detection and optimization.

use ndarray::{s, Array1, Array2, ArrayView2, Axis};
use std::ops::Range;

use crate::config::{BandAxis, StripeStat};
use crate::error::DebandError;
use crate::float_trait::DebandFloat;

/// Resolve stripe bounds for `axis` against the image dimensions.
///
/// Horizontal: columns `[W - offset - width, W - offset)` over all rows.
/// Vertical: rows `[H - width, H)` over all columns; `offset` does not
/// apply on this axis — the masked reference rows sit at the very bottom
/// of the sensor.
///
/// Geometry errors are reported precisely rather than clamped: the caller
/// set these values and must be told when they do not fit the frame.
pub fn stripe_bounds(
    dims: (usize, usize),
    axis: BandAxis,
    width: usize,
    offset: usize,
) -> Result<(Range<usize>, Range<usize>), DebandError> {
    let (h, w) = dims;
    if h == 0 || w == 0 {
        return Err(DebandError::EmptyImage);
    }
    if width == 0 {
        return Err(DebandError::EmptyStripe { axis });
    }

    match axis {
        BandAxis::Horizontal => {
            if offset + width > w {
                return Err(DebandError::StripeOutOfBounds {
                    axis,
                    width,
                    offset,
                    extent: w,
                });
            }
            let end = w - offset;
            Ok((0..h, end - width..end))
        }
        BandAxis::Vertical => {
            if width > h {
                return Err(DebandError::StripeOutOfBounds {
                    axis,
                    width,
                    offset: 0,
                    extent: h,
                });
            }
            Ok((h - width..h, 0..w))
        }
    }
}

/// Extract the reference stripe as float working data.
pub fn extract_stripe<F: DebandFloat>(
    image: ArrayView2<u16>,
    axis: BandAxis,
    width: usize,
    offset: usize,
) -> Result<Array2<F>, DebandError> {
    let (rows, cols) = stripe_bounds(image.dim(), axis, width, offset)?;
    Ok(image.slice(s![rows, cols]).mapv(F::u16_as))
}

/// Compute the median of a slice using partial sorting.
/// Uses select_nth_unstable for O(n) average case.
pub(crate) fn median_slice<F: DebandFloat>(data: &mut [F]) -> F {
    let n = data.len();
    if n == 0 {
        return F::zero();
    }
    if n == 1 {
        return data[0];
    }

    let mid = n / 2;
    let (left, upper, _) = data.select_nth_unstable_by(mid, |a, b| {
        a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
    });

    if n % 2 == 1 {
        *upper
    } else {
        // Even length: average the two middle elements. The lower middle is
        // the max of the left partition.
        let lower = left
            .iter()
            .copied()
            .fold(F::neg_infinity(), |acc, x| if x > acc { x } else { acc });
        (lower + *upper) / F::from_f64_c(2.0)
    }
}

/// Reduce each line of the stripe to one value, producing the line profile.
///
/// Horizontal stripes reduce per row (one value per image row), vertical
/// stripes per column. A non-finite reduced value is rejected so NaN can
/// never propagate into a corrected image.
pub fn reduce_to_profile<F: DebandFloat>(
    stripe: ArrayView2<F>,
    axis: BandAxis,
    stat: StripeStat,
) -> Result<Array1<F>, DebandError> {
    let lane_axis = match axis {
        BandAxis::Horizontal => Axis(0),
        BandAxis::Vertical => Axis(1),
    };

    let lanes = stripe.len_of(lane_axis);
    let mut profile = Array1::zeros(lanes);
    let mut buffer: Vec<F> = Vec::with_capacity(stripe.len() / lanes.max(1));

    for (i, lane) in stripe.axis_iter(lane_axis).enumerate() {
        let value = match stat {
            StripeStat::Median => {
                buffer.clear();
                buffer.extend(lane.iter().copied());
                median_slice(&mut buffer)
            }
            StripeStat::Mean => {
                let sum: F = lane.iter().copied().sum();
                sum / F::usize_as(lane.len())
            }
        };
        if !value.is_finite() {
            return Err(DebandError::DegenerateProfile { line: i });
        }
        profile[i] = value;
    }

    Ok(profile)
}
