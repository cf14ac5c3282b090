//! Banding correction core for X-ray sensor frames.
//!
//! Sensor readout electronics imprint a fast, quasi-periodic line-to-line
//! intensity variation (banding) on top of the real illumination and
//! scatter gradients. A stripe of masked reference pixels along one sensor
//! edge sees the artifact in isolation: its per-line median profile is
//! split into a slow component (moving-average low pass) and a fast
//! residual, and only the residual is subtracted from the frame.
//!
//! The crate is a pure computational core: no I/O, no persistent state,
//! inputs are never mutated, and concurrent calls on disjoint frames do not
//! interfere. Acquisition, file handling and settings persistence belong to
//! the application layers around it.

pub mod config;
pub mod correction;
pub mod detect;
pub mod error;
pub mod estimator;
pub mod float_trait;
pub mod optimize;
pub mod pipeline;
pub mod smooth;
pub mod stripe;

// Re-export commonly used types at the crate root
pub use config::{BandAxis, BandCentering, CorrectionParams, StripeStat};
pub use correction::{correct_banding, CorrectionReport};
pub use detect::{detect_banding, DetectionResult};
pub use error::DebandError;
pub use estimator::{estimate_band, split_profile, BandSplit, ReferenceBand};
pub use float_trait::DebandFloat;
pub use optimize::{optimize_smooth_window, OptimizationResult};
pub use pipeline::{AxisPlan, FramePipeline, StageReport};
pub use smooth::moving_average;
