//! Multi-scale detection of template instances in a scene.
//!
//! [`ScaleMatcher`] scores one template at one scale; [`Detector`] walks all
//! templates and scales for a scene in a fixed order and folds the resulting
//! candidates into a single [`DetectionAggregator`].

use crate::aggregate::{
    Canvas, DetectionAggregator, Detections, NoCanvas, DEFAULT_PROXIMITY_RADIUS,
};
use crate::template::Template;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::math::linspace;
use crate::util::{ScaleMatchError, ScaleMatchResult};
use crate::ImageView;

pub(crate) mod scan;

pub use scan::{ScaleMatcher, DEFAULT_THRESHOLD};

/// Ordered, ascending set of scale factors.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleSet {
    scales: Vec<f64>,
}

impl Default for ScaleSet {
    /// Ten evenly spaced factors from 0.8 to 2.0 inclusive.
    fn default() -> Self {
        Self {
            scales: linspace(0.8, 2.0, 10),
        }
    }
}

impl ScaleSet {
    /// Evenly spaced factors over `[start, end]`.
    pub fn linspace(start: f64, end: f64, count: usize) -> ScaleMatchResult<Self> {
        if count == 0 {
            return Err(ScaleMatchError::InvalidConfig("scale count must be at least 1"));
        }
        if end < start {
            return Err(ScaleMatchError::InvalidConfig("scale range is reversed"));
        }
        Self::from_scales(linspace(start, end, count))
    }

    /// Explicit factors; they are sorted ascending.
    pub fn from_scales(mut scales: Vec<f64>) -> ScaleMatchResult<Self> {
        if scales.is_empty() {
            return Err(ScaleMatchError::InvalidConfig("scale set is empty"));
        }
        if scales.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ScaleMatchError::InvalidConfig(
                "scales must be finite and positive",
            ));
        }
        scales.sort_by(f64::total_cmp);
        Ok(Self { scales })
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    pub fn len(&self) -> usize {
        self.scales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }
}

/// Configuration for scene detection.
#[derive(Clone, Debug)]
pub struct DetectConfig {
    /// Minimum ZNCC score for a placement to become a candidate.
    pub threshold: f32,
    /// Scale factors tried for every template, ascending.
    pub scales: ScaleSet,
    /// Candidates closer than this to the last accepted center are dropped.
    pub proximity_radius: f64,
    /// Minimum image-window energy for a placement to be scored.
    pub min_var_i: f32,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            scales: ScaleSet::default(),
            proximity_radius: DEFAULT_PROXIMITY_RADIUS,
            min_var_i: 1e-6,
        }
    }
}

impl DetectConfig {
    /// Checks parameter ranges.
    pub fn validate(&self) -> ScaleMatchResult<()> {
        if !(-1.0..=1.0).contains(&self.threshold) {
            return Err(ScaleMatchError::InvalidConfig(
                "threshold must lie in [-1, 1]",
            ));
        }
        if !self.proximity_radius.is_finite() || self.proximity_radius < 0.0 {
            return Err(ScaleMatchError::InvalidConfig(
                "proximity radius must be finite and non-negative",
            ));
        }
        if !self.min_var_i.is_finite() || self.min_var_i < 0.0 {
            return Err(ScaleMatchError::InvalidConfig(
                "min_var_i must be finite and non-negative",
            ));
        }
        if self.scales.is_empty() {
            return Err(ScaleMatchError::InvalidConfig("scale set is empty"));
        }
        Ok(())
    }
}

/// Counts template instances in a scene across a fixed set of scales.
///
/// All templates and scales of one scene share one aggregator and run
/// sequentially; the acceptance rule depends on that order.
pub struct Detector {
    templates: Vec<Template>,
    cfg: DetectConfig,
}

impl Detector {
    /// Creates a detector with the default configuration.
    pub fn new(templates: Vec<Template>) -> Self {
        Self {
            templates,
            cfg: DetectConfig::default(),
        }
    }

    /// Replaces the detection configuration.
    pub fn with_config(mut self, cfg: DetectConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn config(&self) -> &DetectConfig {
        &self.cfg
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Detects instances without annotating anything.
    pub fn detect(&self, scene: ImageView<'_, u8>) -> ScaleMatchResult<Detections> {
        self.detect_annotated(scene, &mut NoCanvas)
    }

    /// Detects instances and draws each accepted box onto `canvas`.
    ///
    /// Failures inside one template or scale are logged and contribute no
    /// candidates; only an invalid configuration is returned as an error.
    pub fn detect_annotated<C: Canvas + ?Sized>(
        &self,
        scene: ImageView<'_, u8>,
        canvas: &mut C,
    ) -> ScaleMatchResult<Detections> {
        self.cfg.validate()?;
        let _span = trace_span!(
            "detect_scene",
            width = scene.width(),
            height = scene.height(),
            templates = self.templates.len()
        )
        .entered();

        let mut aggregator = DetectionAggregator::new(self.cfg.proximity_radius);
        if self.templates.is_empty() {
            trace_warn!("no_templates", width = scene.width(), height = scene.height());
            return Ok(aggregator.finish());
        }

        let matcher = ScaleMatcher::new(self.cfg.threshold, self.cfg.min_var_i);
        for (template_idx, template) in self.templates.iter().enumerate() {
            let _tpl_span = trace_span!("match_template", template = template.id()).entered();
            let before = aggregator.count();
            for &scale in self.cfg.scales.scales() {
                let candidates =
                    match matcher.candidates_at_scale(template, template_idx, scene, scale) {
                        Ok(candidates) => candidates,
                        Err(err) => {
                            trace_warn!(
                                "scale_failed",
                                template = template.id(),
                                scale = scale,
                                error = err.to_string().as_str()
                            );
                            continue;
                        }
                    };
                for candidate in candidates {
                    aggregator.offer(candidate, canvas);
                }
            }
            trace_event!(
                "template_done",
                accepted = aggregator.count() - before,
                total = aggregator.count()
            );
        }

        Ok(aggregator.finish())
    }
}
