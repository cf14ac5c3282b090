//! Error taxonomy for the correction core.
//!
//! Hard errors are returned at the point of detection with enough context
//! (stripe bounds, axis) to diagnose a misconfiguration. The ineffective-
//! correction case is a warning surfaced through `log`, not an error, since
//! the operator is the final arbiter of the result.

use thiserror::Error;

use crate::config::BandAxis;

/// Errors from stripe extraction, correction, detection and optimization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DebandError {
    /// Image has zero rows or zero columns.
    #[error("image has no pixels")]
    EmptyImage,

    /// Stripe width of zero was requested.
    #[error("{axis} reference stripe width must be positive")]
    EmptyStripe {
        /// Axis the stripe was requested for.
        axis: BandAxis,
    },

    /// Stripe falls outside the image after applying the offset.
    #[error(
        "{axis} reference stripe (width {width}, offset {offset}) exceeds the image extent of {extent} pixels"
    )]
    StripeOutOfBounds {
        /// Axis the stripe was requested for.
        axis: BandAxis,
        /// Requested stripe width in pixels.
        width: usize,
        /// Requested offset from the image edge.
        offset: usize,
        /// Image extent along the stripe placement direction.
        extent: usize,
    },

    /// The reduced line profile contains non-finite values.
    #[error("reference profile contains a non-finite value at line {line}")]
    DegenerateProfile {
        /// Index of the first offending line.
        line: usize,
    },

    /// The optimizer was handed an explicitly empty candidate list.
    #[error("no smoothing-window candidates to evaluate")]
    NoCandidates,
}
