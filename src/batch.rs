//! Scene-level batch processing with per-scene fault isolation.
//!
//! Every scene gets its own detection run (and so its own aggregator). A scene
//! that fails, or panics, is recorded with a zero count and never affects its
//! siblings. With the `rayon` feature and `parallel` set, scenes are processed
//! on the rayon pool; outcomes keep the input order either way.

use crate::aggregate::Detections;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{ScaleMatchError, ScaleMatchResult};
use std::panic::{self, AssertUnwindSafe};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Result of processing one scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneOutcome {
    /// Caller-supplied scene label (usually a file path).
    pub id: String,
    /// Accepted boxes; empty when the scene failed.
    pub detections: Detections,
    /// Why the scene contributed nothing, if it failed.
    pub error: Option<ScaleMatchError>,
}

impl SceneOutcome {
    pub fn count(&self) -> usize {
        self.detections.count()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcomes for a batch of scenes, in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    pub scenes: Vec<SceneOutcome>,
}

impl BatchReport {
    /// Sum of per-scene counts; failed scenes count as zero.
    pub fn total_count(&self) -> usize {
        self.scenes.iter().map(SceneOutcome::count).sum()
    }

    /// Scenes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &SceneOutcome> {
        self.scenes.iter().filter(|scene| !scene.is_ok())
    }
}

/// Runs `detect` for every scene and collects the outcomes.
///
/// `label` names a scene in the report. `parallel` only has an effect with the
/// `rayon` feature enabled.
pub fn run_batch<S, L, F>(scenes: &[S], parallel: bool, label: L, detect: F) -> BatchReport
where
    S: Sync,
    L: Fn(&S) -> String + Sync,
    F: Fn(&S) -> ScaleMatchResult<Detections> + Sync,
{
    let _span = trace_span!("batch", scenes = scenes.len(), parallel = parallel).entered();
    let process = |scene: &S| run_scene(label(scene), || detect(scene));

    #[cfg(feature = "rayon")]
    let outcomes: Vec<SceneOutcome> = if parallel {
        scenes.par_iter().map(process).collect()
    } else {
        scenes.iter().map(process).collect()
    };
    #[cfg(not(feature = "rayon"))]
    let outcomes: Vec<SceneOutcome> = {
        let _ = parallel;
        scenes.iter().map(process).collect()
    };

    let report = BatchReport { scenes: outcomes };
    trace_event!(
        "batch_done",
        total = report.total_count(),
        failed = report.failures().count()
    );
    report
}

fn run_scene<F>(id: String, detect: F) -> SceneOutcome
where
    F: FnOnce() -> ScaleMatchResult<Detections>,
{
    let result = match panic::catch_unwind(AssertUnwindSafe(detect)) {
        Ok(result) => result,
        Err(payload) => Err(ScaleMatchError::SceneFailed {
            id: id.clone(),
            reason: panic_message(payload.as_ref()),
        }),
    };

    match result {
        Ok(detections) => {
            trace_event!("scene_done", count = detections.count());
            SceneOutcome {
                id,
                detections,
                error: None,
            }
        }
        Err(err) => {
            trace_warn!(
                "scene_failed",
                scene = id.as_str(),
                error = err.to_string().as_str()
            );
            SceneOutcome {
                id,
                detections: Detections::default(),
                error: Some(err),
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic while processing scene".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::run_batch;
    use crate::aggregate::Detections;
    use crate::candidate::{Candidate, Peak};
    use crate::util::ScaleMatchError;

    fn detections(n: usize) -> Detections {
        Detections {
            boxes: (0..n)
                .map(|i| {
                    Candidate::from_peak(
                        Peak {
                            x: i * 50,
                            y: 0,
                            score: 0.9,
                        },
                        10,
                        10,
                        0,
                        1.0,
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn failing_scene_counts_zero_and_siblings_continue() {
        let scenes = [2usize, 0, 3];
        let report = run_batch(&scenes, false, |s| format!("scene-{s}"), |&s| {
            if s == 0 {
                Err(ScaleMatchError::ImageIo {
                    reason: "unreadable".into(),
                })
            } else {
                Ok(detections(s))
            }
        });
        assert_eq!(report.scenes.len(), 3);
        assert_eq!(report.total_count(), 5);
        let failed: Vec<_> = report.failures().map(|s| s.id.as_str()).collect();
        assert_eq!(failed, vec!["scene-0"]);
        assert_eq!(report.scenes[1].count(), 0);
    }

    #[test]
    fn panicking_scene_is_contained() {
        let scenes = [1usize, 7];
        let report = run_batch(&scenes, false, |s| s.to_string(), |&s| {
            if s == 7 {
                panic!("boom");
            }
            Ok(detections(s))
        });
        assert_eq!(report.total_count(), 1);
        match &report.scenes[1].error {
            Some(ScaleMatchError::SceneFailed { id, reason }) => {
                assert_eq!(id, "7");
                assert_eq!(reason, "boom");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
