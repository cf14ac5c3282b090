//! Correction geometry and policy configuration.
//!
//! The experiment scripts this core replaces kept their defaults as
//! module-level constants that silently disagreed (stripe width 10 in one,
//! 80 in another). Everything configurable is an explicit field here, with
//! the production defaults spelled out as named constants.

use serde::{Deserialize, Serialize};

// =============================================================================
// Defaults
// =============================================================================

/// Default reference stripe width in pixels.
pub const DEFAULT_STRIPE_WIDTH: usize = 10;

/// Default stripe offset from the image edge.
pub const DEFAULT_STRIPE_OFFSET: usize = 0;

/// Default smoothing window in lines. Bigger preserves more real gradient.
pub const DEFAULT_SMOOTH_WINDOW: usize = 128;

/// Default banding-detection threshold in native intensity units.
pub const DEFAULT_DETECT_THRESHOLD: f64 = 5.0;

/// Default upper clip bound for 16-bit sensor data.
pub const DEFAULT_SAMPLE_MAX: u16 = 65535;

// =============================================================================
// Types
// =============================================================================

/// Direction of the banding artifact being removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandAxis {
    /// Row-to-row banding, measured on a column stripe at the right edge.
    #[default]
    Horizontal,
    /// Column-to-column banding, measured on the bottom rows.
    Vertical,
}

impl std::fmt::Display for BandAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Horizontal => write!(f, "horizontal"),
            Self::Vertical => write!(f, "vertical"),
        }
    }
}

/// Per-line statistic reducing the reference stripe to a 1D profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StripeStat {
    /// Median per line. Robust to hot pixels in the stripe.
    #[default]
    Median,
    /// Mean per line. Legacy behavior, sensitive to outliers.
    Mean,
}

/// How the band residual is applied to the image.
///
/// The source variants disagreed on whether the residual mean should be
/// removed before subtraction, so the policy is explicit rather than assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandCentering {
    /// Subtract the residual as measured. The reference stripe levels out to
    /// the slow profile; the image mean shifts by the residual mean.
    #[default]
    Direct,
    /// Subtract the residual minus its mean, preserving the image mean.
    PreserveMean,
}

/// Parameters for a single correction, detection or optimization call.
///
/// Immutable per invocation; the core validates the stripe geometry against
/// the image and never persists anything (settings storage belongs to the
/// application layer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionParams {
    /// Banding direction to correct.
    pub axis: BandAxis,
    /// Stripe width in pixels: columns for horizontal, rows for vertical.
    pub stripe_width: usize,
    /// Stripe offset from the right edge, horizontal axis only. The vertical
    /// reference rows are always the bottommost `stripe_width` rows; this
    /// field is ignored on that axis (observed sensor behavior, kept as an
    /// explicit documented default rather than silently symmetrized).
    pub stripe_offset: usize,
    /// Smoothing window in lines for the slow-background estimate.
    /// Values below 3 disable smoothing, which makes the correction a no-op.
    pub smooth_window: usize,
    /// Per-line reduction statistic.
    pub stat: StripeStat,
    /// Residual centering policy.
    pub centering: BandCentering,
    /// Upper clip bound of the sensor's sample range (65535 for 16-bit,
    /// 4095 for 12-bit data stored in u16).
    pub sample_max: u16,
}

impl Default for CorrectionParams {
    fn default() -> Self {
        Self {
            axis: BandAxis::Horizontal,
            stripe_width: DEFAULT_STRIPE_WIDTH,
            stripe_offset: DEFAULT_STRIPE_OFFSET,
            smooth_window: DEFAULT_SMOOTH_WINDOW,
            stat: StripeStat::Median,
            centering: BandCentering::Direct,
            sample_max: DEFAULT_SAMPLE_MAX,
        }
    }
}

impl CorrectionParams {
    /// Default parameters for horizontal banding (right-edge column stripe).
    pub fn horizontal() -> Self {
        Self::default()
    }

    /// Default parameters for vertical banding (bottom-row stripe).
    pub fn vertical() -> Self {
        Self {
            axis: BandAxis::Vertical,
            ..Self::default()
        }
    }
}
