//! Scalematch counts repeated instances of small template images inside a
//! larger scene at unknown scale.
//!
//! Each template is resampled over a fixed ascending set of scale factors and
//! scored against the grayscale scene with zero-mean normalized
//! cross-correlation. Placements above a threshold become candidate boxes,
//! which a greedy first-come-first-served aggregator deduplicates into a
//! non-overlapping result per scene. Scenes can be processed in parallel with
//! the `rayon` feature; work inside one scene is always sequential.

pub mod aggregate;
pub mod batch;
pub mod candidate;
pub mod image;
pub mod kernel;
pub mod search;
pub mod template;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use aggregate::{Canvas, DetectionAggregator, Detections, NoCanvas, Verdict};
pub use batch::{run_batch, BatchReport, SceneOutcome};
pub use candidate::{BoundingBox, Candidate, Peak};
pub use crate::image::resize::resize_u8_bilinear;
pub use crate::image::{ImageView, OwnedImage};
pub use search::{DetectConfig, Detector, ScaleMatcher, ScaleSet, DEFAULT_THRESHOLD};
pub use template::{Template, TemplatePlan};
pub use util::{ScaleMatchError, ScaleMatchResult};
