//! Frame pipeline composing detection, window optimization and correction.
//!
//! The numeric core below this module is stateless and pure; this is the
//! one stateful wrapper, mirroring how the acquisition application drives
//! correction frame after frame: each enabled axis optionally grid-searches
//! its smoothing window once (memoized until invalidated), optionally
//! short-circuits on a negative banding detection, then corrects. The
//! `vertical_first` flag picks the axis order, which matters because the
//! second axis re-measures its reference stripe on the already-corrected
//! frame.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::config::{BandAxis, CorrectionParams, DEFAULT_DETECT_THRESHOLD};
use crate::correction::{correct_banding, CorrectionReport};
use crate::detect::{detect_banding, DetectionResult};
use crate::error::DebandError;
use crate::float_trait::DebandFloat;
use crate::optimize::optimize_smooth_window;

/// Per-axis plan: whether the axis runs and with which knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisPlan {
    /// Run this axis at all.
    pub enabled: bool,
    /// Correction parameters; `smooth_window` is overridden per frame when
    /// `auto_optimize` is on.
    pub params: CorrectionParams,
    /// Skip correction when no banding is detected on the stripe.
    pub auto_detect: bool,
    /// Detection threshold in native intensity units.
    pub detect_threshold: f64,
    /// Grid-search the smoothing window on the first frame and memoize it.
    pub auto_optimize: bool,
}

impl AxisPlan {
    /// Horizontal-axis plan with the production defaults (enabled,
    /// window auto-optimized on the first frame).
    pub fn horizontal() -> Self {
        Self {
            enabled: true,
            params: CorrectionParams::horizontal(),
            auto_detect: false,
            detect_threshold: DEFAULT_DETECT_THRESHOLD,
            auto_optimize: true,
        }
    }

    /// Vertical-axis plan with the production defaults (enabled, fixed
    /// smoothing window).
    pub fn vertical() -> Self {
        Self {
            enabled: true,
            params: CorrectionParams::vertical(),
            auto_detect: false,
            detect_threshold: DEFAULT_DETECT_THRESHOLD,
            auto_optimize: false,
        }
    }
}

/// What one pipeline stage did to the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageReport {
    /// Axis this stage ran for.
    pub axis: BandAxis,
    /// False when auto-detection short-circuited the stage.
    pub applied: bool,
    /// Detection outcome, when auto-detect ran.
    pub detection: Option<DetectionResult>,
    /// Memoized or freshly optimized window, when auto-optimize is on.
    pub optimized_window: Option<usize>,
    /// Correction diagnostics, when the band was subtracted.
    pub correction: Option<CorrectionReport>,
}

/// Stateful per-session pipeline with memoized optimized windows.
#[derive(Debug, Clone)]
pub struct FramePipeline {
    /// Plan for the horizontal axis.
    pub horizontal: AxisPlan,
    /// Plan for the vertical axis.
    pub vertical: AxisPlan,
    /// Run vertical correction before horizontal.
    pub vertical_first: bool,
    optimized_horizontal: Option<usize>,
    optimized_vertical: Option<usize>,
}

impl Default for FramePipeline {
    fn default() -> Self {
        Self::new(AxisPlan::horizontal(), AxisPlan::vertical(), false)
    }
}

impl FramePipeline {
    /// Build a pipeline from per-axis plans and the ordering flag.
    pub fn new(horizontal: AxisPlan, vertical: AxisPlan, vertical_first: bool) -> Self {
        Self {
            horizontal,
            vertical,
            vertical_first,
            optimized_horizontal: None,
            optimized_vertical: None,
        }
    }

    /// Drop the memoized windows. Call when stripe geometry or the scene
    /// changes enough that the old optimum no longer applies.
    pub fn invalidate(&mut self) {
        self.optimized_horizontal = None;
        self.optimized_vertical = None;
    }

    /// Memoized optimized window for `axis`, if one has been computed.
    pub fn optimized_window(&self, axis: BandAxis) -> Option<usize> {
        match axis {
            BandAxis::Horizontal => self.optimized_horizontal,
            BandAxis::Vertical => self.optimized_vertical,
        }
    }

    /// Run the enabled axes over `frame` in the configured order.
    ///
    /// Returns the corrected frame and one report per executed axis (in
    /// execution order). The input frame is never modified.
    pub fn process<F: DebandFloat>(
        &mut self,
        frame: ArrayView2<u16>,
    ) -> Result<(Array2<u16>, Vec<StageReport>), DebandError> {
        let order = if self.vertical_first {
            [BandAxis::Vertical, BandAxis::Horizontal]
        } else {
            [BandAxis::Horizontal, BandAxis::Vertical]
        };

        let mut current = frame.to_owned();
        let mut reports = Vec::new();

        for axis in order {
            let plan = match axis {
                BandAxis::Horizontal => self.horizontal.clone(),
                BandAxis::Vertical => self.vertical.clone(),
            };
            if !plan.enabled {
                continue;
            }
            let report = self.run_axis::<F>(axis, &plan, &mut current)?;
            reports.push(report);
        }

        Ok((current, reports))
    }

    fn run_axis<F: DebandFloat>(
        &mut self,
        axis: BandAxis,
        plan: &AxisPlan,
        frame: &mut Array2<u16>,
    ) -> Result<StageReport, DebandError> {
        let mut params = plan.params.clone();
        // The slot decides the axis; keep a mis-filled plan consistent.
        params.axis = axis;

        let mut optimized_window = None;
        if plan.auto_optimize {
            let cached = self.optimized_window(axis);
            let window = match cached {
                Some(window) => window,
                None => {
                    let result = optimize_smooth_window::<F>(frame.view(), &params, None)?;
                    match axis {
                        BandAxis::Horizontal => {
                            self.optimized_horizontal = Some(result.best_window)
                        }
                        BandAxis::Vertical => self.optimized_vertical = Some(result.best_window),
                    }
                    result.best_window
                }
            };
            params.smooth_window = window;
            optimized_window = Some(window);
        }

        let mut detection = None;
        if plan.auto_detect {
            let det = detect_banding::<F>(frame.view(), &params, plan.detect_threshold)?;
            detection = Some(det);
            if !det.has_banding {
                log::info!(
                    "{} banding: residual std {:.2} at or below threshold {:.2}, \
                     skipping correction",
                    axis,
                    det.band_std,
                    plan.detect_threshold
                );
                return Ok(StageReport {
                    axis,
                    applied: false,
                    detection,
                    optimized_window,
                    correction: None,
                });
            }
        }

        let (corrected, correction) = correct_banding::<F>(frame.view(), &params)?;
        *frame = corrected;

        Ok(StageReport {
            axis,
            applied: true,
            detection,
            optimized_window,
            correction: Some(correction),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Frame with independent row and column banding.
    fn doubly_banded_frame() -> Array2<u16> {
        Array2::from_shape_fn((256, 256), |(r, c)| {
            let row_band = 60.0 * (r as f64 * std::f64::consts::PI / 4.0).sin();
            let col_band = 35.0 * (c as f64 * std::f64::consts::PI / 6.0).cos();
            (900.0 + row_band + col_band).round().max(0.0) as u16
        })
    }

    fn fixed_plan(axis: BandAxis) -> AxisPlan {
        let mut plan = match axis {
            BandAxis::Horizontal => AxisPlan::horizontal(),
            BandAxis::Vertical => AxisPlan::vertical(),
        };
        plan.auto_optimize = false;
        plan.params.stripe_width = 8;
        plan.params.smooth_window = 64;
        plan
    }

    #[test]
    fn test_default_pipeline_matches_production_settings() {
        let pipeline = FramePipeline::default();
        assert!(pipeline.horizontal.enabled);
        assert!(pipeline.horizontal.auto_optimize);
        assert!(pipeline.vertical.enabled);
        assert!(!pipeline.vertical.auto_optimize);
        assert!(!pipeline.vertical_first);
    }

    #[test]
    fn test_execution_order_follows_vertical_first() {
        let frame = doubly_banded_frame();

        let mut hv = FramePipeline::new(
            fixed_plan(BandAxis::Horizontal),
            fixed_plan(BandAxis::Vertical),
            false,
        );
        let (out_hv, reports) = hv.process::<f64>(frame.view()).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].axis, BandAxis::Horizontal);
        assert_eq!(reports[1].axis, BandAxis::Vertical);

        let mut vh = FramePipeline::new(
            fixed_plan(BandAxis::Horizontal),
            fixed_plan(BandAxis::Vertical),
            true,
        );
        let (out_vh, reports) = vh.process::<f64>(frame.view()).unwrap();
        assert_eq!(reports[0].axis, BandAxis::Vertical);

        // The second axis re-measures its stripe on the partially corrected
        // frame, so ordering changes the result.
        assert_ne!(out_hv, out_vh);
    }

    #[test]
    fn test_disabled_axes_leave_frame_untouched() {
        let frame = doubly_banded_frame();
        let mut horizontal = fixed_plan(BandAxis::Horizontal);
        horizontal.enabled = false;
        let mut vertical = fixed_plan(BandAxis::Vertical);
        vertical.enabled = false;

        let mut pipeline = FramePipeline::new(horizontal, vertical, false);
        let (out, reports) = pipeline.process::<f64>(frame.view()).unwrap();
        assert!(reports.is_empty());
        assert_eq!(out, frame);
    }

    #[test]
    fn test_auto_detect_short_circuits_on_flat_frame() {
        let frame = Array2::from_elem((256, 64), 700u16);
        let mut horizontal = fixed_plan(BandAxis::Horizontal);
        horizontal.auto_detect = true;
        let mut vertical = fixed_plan(BandAxis::Vertical);
        vertical.auto_detect = true;

        let mut pipeline = FramePipeline::new(horizontal, vertical, false);
        let (out, reports) = pipeline.process::<f64>(frame.view()).unwrap();

        assert_eq!(out, frame);
        for report in &reports {
            assert!(!report.applied);
            assert!(report.correction.is_none());
            let detection = report.detection.expect("detection must have run");
            assert!(!detection.has_banding);
        }
    }

    #[test]
    fn test_auto_detect_applies_on_banded_frame() {
        let frame = doubly_banded_frame();
        let mut horizontal = fixed_plan(BandAxis::Horizontal);
        horizontal.auto_detect = true;
        let mut vertical = fixed_plan(BandAxis::Vertical);
        vertical.enabled = false;

        let mut pipeline = FramePipeline::new(horizontal, vertical, false);
        let (_, reports) = pipeline.process::<f64>(frame.view()).unwrap();
        assert!(reports[0].applied);
        assert!(reports[0].detection.unwrap().has_banding);
        assert!(reports[0].correction.is_some());
    }

    #[test]
    fn test_optimized_window_is_memoized_until_invalidated() {
        let frame = doubly_banded_frame();
        let mut horizontal = fixed_plan(BandAxis::Horizontal);
        horizontal.auto_optimize = true;
        let mut vertical = fixed_plan(BandAxis::Vertical);
        vertical.enabled = false;

        let mut pipeline = FramePipeline::new(horizontal, vertical, false);
        assert_eq!(pipeline.optimized_window(BandAxis::Horizontal), None);

        let (_, reports) = pipeline.process::<f64>(frame.view()).unwrap();
        let first = reports[0].optimized_window.expect("window must be chosen");
        assert_eq!(pipeline.optimized_window(BandAxis::Horizontal), Some(first));

        // A frame with a very different band period would pick another
        // window if re-optimized; the memoized one must be reused instead.
        let other = Array2::from_shape_fn((256, 256), |(r, _)| {
            (900.0 + 60.0 * (r as f64 * std::f64::consts::PI / 32.0).sin())
                .round()
                .max(0.0) as u16
        });
        let (_, reports) = pipeline.process::<f64>(other.view()).unwrap();
        assert_eq!(reports[0].optimized_window, Some(first));

        pipeline.invalidate();
        assert_eq!(pipeline.optimized_window(BandAxis::Horizontal), None);
        let (_, reports) = pipeline.process::<f64>(other.view()).unwrap();
        assert_eq!(
            pipeline.optimized_window(BandAxis::Horizontal),
            reports[0].optimized_window
        );
    }
}
