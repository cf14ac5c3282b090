//! Uniform moving-average smoothing of 1D line profiles.
//!
//! This is the shared low-pass primitive: a box kernel with edge-replication
//! padding sized so a "valid" convolution returns exactly the input length.
//! Replication is deliberate; zero or reflect padding would bias the slow-
//! background estimate at the image edges.

use ndarray::{Array1, ArrayView1};

use crate::float_trait::DebandFloat;

/// Smallest window that actually smooths. Below this the profile passes
/// through unchanged, so the band residual is zero and correction is a no-op.
pub const MIN_SMOOTH_WINDOW: usize = 3;

/// Fill `padded` with `input` plus edge-replicated borders.
/// Padding widths may exceed the input length; the edge value repeats.
fn fill_padded<F: DebandFloat>(
    input: &[F],
    pad_left: usize,
    pad_right: usize,
    padded: &mut Vec<F>,
) {
    padded.clear();
    padded.reserve(input.len() + pad_left + pad_right);

    let first = input[0];
    let last = input[input.len() - 1];

    padded.extend(std::iter::repeat(first).take(pad_left));
    padded.extend_from_slice(input);
    padded.extend(std::iter::repeat(last).take(pad_right));
}

/// Box-filter low pass of a line profile with edge-replication padding.
///
/// Output length always equals the input length. The kernel is centered,
/// favoring the left half-window when `window` is even (`pad_left =
/// window / 2`, `pad_right = window - 1 - pad_left`). Windows below
/// [`MIN_SMOOTH_WINDOW`] return the input unchanged.
///
/// Each output sample is a direct kernel sum over the padded profile, so
/// interior samples reproduce the plain arithmetic rolling mean exactly.
pub fn moving_average<F: DebandFloat>(profile: ArrayView1<F>, window: usize) -> Array1<F> {
    let n = profile.len();
    if window < MIN_SMOOTH_WINDOW || n == 0 {
        return profile.to_owned();
    }

    let pad_left = window / 2;
    let pad_right = window - 1 - pad_left;

    let input: Vec<F> = profile.iter().copied().collect();
    let mut padded = Vec::new();
    fill_padded(&input, pad_left, pad_right, &mut padded);

    let inv_window = F::one() / F::usize_as(window);
    let mut output = Array1::zeros(n);
    for (i, out) in output.iter_mut().enumerate() {
        let mut sum = F::zero();
        for &v in &padded[i..i + window] {
            sum += v;
        }
        *out = sum * inv_window;
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    // ==================== No-op Floor Tests ====================

    #[test]
    fn test_window_below_floor_is_identity() {
        let input = Array1::from_vec(vec![3.0f64, 1.0, 4.0, 1.0, 5.0]);
        for window in [0, 1, 2] {
            let output = moving_average(input.view(), window);
            assert_eq!(output, input, "window {} must be a no-op", window);
        }
    }

    #[test]
    fn test_empty_profile() {
        let input = Array1::<f32>::zeros(0);
        let output = moving_average(input.view(), 5);
        assert_eq!(output.len(), 0);
    }

    // ==================== Length Preservation Tests ====================

    #[test]
    fn test_length_preserved() {
        for n in [1usize, 2, 3, 7, 100] {
            let input = Array1::from_shape_fn(n, |i| i as f64);
            for window in [3usize, 4, 5, 16, 128] {
                let output = moving_average(input.view(), window);
                assert_eq!(
                    output.len(),
                    n,
                    "length changed for n={} window={}",
                    n,
                    window
                );
            }
        }
    }

    #[test]
    fn test_window_larger_than_profile() {
        // Realistic misuse: a 512-line smoothing window on a short profile.
        // Padding exceeds the profile length; must not panic.
        let input = Array1::from_vec(vec![10.0f64, 20.0, 30.0]);
        let output = moving_average(input.view(), 512);
        assert_eq!(output.len(), 3);
        for &v in output.iter() {
            assert!(v >= 10.0 && v <= 30.0, "output {} outside value range", v);
        }
    }

    // ==================== Flat Signal Tests ====================

    #[test]
    fn test_constant_profile_invariant() {
        for c in [0.0f64, 7.5, 60000.0] {
            let input = Array1::from_elem(50, c);
            for window in [3usize, 10, 64, 200] {
                let output = moving_average(input.view(), window);
                for &v in output.iter() {
                    assert!(
                        approx_eq(v, c, 1e-9),
                        "constant {} drifted to {} (window {})",
                        c,
                        v,
                        window
                    );
                }
            }
        }
    }

    // ==================== Alignment Tests ====================

    #[test]
    fn test_odd_window_known_values() {
        // x = [1,2,3,4,5], window 3, edge padding [1,|1..5|,5]
        let input = Array1::from_vec(vec![1.0f64, 2.0, 3.0, 4.0, 5.0]);
        let output = moving_average(input.view(), 3);
        let expected = [4.0 / 3.0, 2.0, 3.0, 4.0, 14.0 / 3.0];
        for (o, e) in output.iter().zip(expected.iter()) {
            assert!(approx_eq(*o, *e, 1e-12), "got {} expected {}", o, e);
        }
    }

    #[test]
    fn test_even_window_favors_left_half() {
        // window 4: pad_left = 2, pad_right = 1
        // padded = [1,1,|1,2,3,4,5|,5]
        let input = Array1::from_vec(vec![1.0f64, 2.0, 3.0, 4.0, 5.0]);
        let output = moving_average(input.view(), 4);
        let expected = [1.25, 1.75, 2.5, 3.5, 4.25];
        for (o, e) in output.iter().zip(expected.iter()) {
            assert!(approx_eq(*o, *e, 1e-12), "got {} expected {}", o, e);
        }
    }

    #[test]
    fn test_interior_matches_rolling_mean() {
        let input = Array1::from_shape_fn(64, |i| ((i * 37) % 11) as f64);
        let window = 9usize;
        let output = moving_average(input.view(), window);

        // Away from the edges the box filter is a plain rolling mean.
        let radius = window / 2;
        for i in radius..64 - radius {
            let mean: f64 =
                input.slice(ndarray::s![i - radius..=i + radius]).sum() / window as f64;
            assert!(
                approx_eq(output[i], mean, 1e-12),
                "interior sample {} deviates from rolling mean",
                i
            );
        }
    }

    #[test]
    fn test_f32_path() {
        let input = Array1::from_vec(vec![1.0f32, 2.0, 3.0, 4.0, 5.0]);
        let output = moving_average(input.view(), 3);
        assert!((output[2] - 3.0).abs() < 1e-6);
    }
}
