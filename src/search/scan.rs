//! Single-scale matching of one template against a scene.

use crate::candidate::{Candidate, Peak};
use crate::kernel::scalar::ZnccScalar;
use crate::kernel::{Kernel, ScanParams};
use crate::template::{Template, TemplatePlan};
use crate::trace::{trace_event, trace_skip, trace_span};
use crate::util::{ScaleMatchError, ScaleMatchResult};
use crate::ImageView;

/// Default ZNCC acceptance threshold.
pub const DEFAULT_THRESHOLD: f32 = 0.77;

/// Runs thresholded ZNCC for a template resampled to one scale.
#[derive(Clone, Copy, Debug)]
pub struct ScaleMatcher {
    threshold: f32,
    min_var_i: f32,
}

impl Default for ScaleMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, 1e-6)
    }
}

impl ScaleMatcher {
    /// Creates a matcher emitting placements with `score >= threshold`.
    ///
    /// Image windows whose sum of squared deviations is at most `min_var_i`
    /// are flat and never scored.
    pub fn new(threshold: f32, min_var_i: f32) -> Self {
        Self {
            threshold,
            min_var_i,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Returns every placement of `template` resized by `scale` whose score
    /// reaches the threshold, in row-major order.
    ///
    /// A scale that truncates the template to zero size, makes it larger than
    /// the scene, or flattens it to a constant patch yields no placements.
    pub fn match_at_scale(
        &self,
        template: &Template,
        scene: ImageView<'_, u8>,
        scale: f64,
    ) -> ScaleMatchResult<Vec<Peak>> {
        let (width, height) = template.scaled_size(scale);
        let _span = trace_span!("match_scale", scale = scale, width = width, height = height)
            .entered();

        if width == 0 || height == 0 {
            trace_skip!("scale_empty", template = template.id(), scale = scale);
            return Ok(Vec::new());
        }
        if width > scene.width() || height > scene.height() {
            trace_skip!("scale_too_large", template = template.id(), scale = scale);
            return Ok(Vec::new());
        }

        let Some(scaled) = template.scaled(scale)? else {
            return Ok(Vec::new());
        };
        let plan = match TemplatePlan::from_view(scaled.view()) {
            Ok(plan) => plan,
            Err(ScaleMatchError::DegenerateTemplate { reason }) => {
                trace_skip!("scale_degenerate", template = template.id(), reason = reason);
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let params = ScanParams {
            min_var_i: self.min_var_i,
            min_score: self.threshold,
        };
        let peaks = ZnccScalar::scan_full(scene, &plan, params)?;
        trace_event!("scale_peaks", count = peaks.len());
        Ok(peaks)
    }

    /// Like [`match_at_scale`](Self::match_at_scale) but returns boxes sized to
    /// the scaled template.
    pub fn candidates_at_scale(
        &self,
        template: &Template,
        template_idx: usize,
        scene: ImageView<'_, u8>,
        scale: f64,
    ) -> ScaleMatchResult<Vec<Candidate>> {
        let (width, height) = template.scaled_size(scale);
        let peaks = self.match_at_scale(template, scene, scale)?;
        Ok(peaks
            .into_iter()
            .map(|peak| Candidate::from_peak(peak, width, height, template_idx, scale))
            .collect())
    }
}
