//! Greedy first-come-first-served deduplication of candidates for one scene.
//!
//! Candidates are offered in scan order (template, ascending scale, row-major
//! placement). Each one is checked against three pieces of state, in this
//! order:
//!
//! 1. distance to the most recently accepted center (`< proximity_radius`
//!    rejects),
//! 2. exact membership in the set of accepted centers,
//! 3. positive-area overlap with any accepted box.
//!
//! A candidate passing all three is accepted and drawn on the canvas. The
//! policy never compares scores, so an earlier weaker candidate wins over a
//! later stronger one. Accepted boxes are pairwise non-overlapping by
//! construction.

use crate::candidate::{BoundingBox, Candidate};
use crate::util::math::distance;
use std::collections::HashSet;

mod canvas;

pub use canvas::{Canvas, NoCanvas};

/// Default radius around the last accepted center that suppresses candidates.
pub const DEFAULT_PROXIMITY_RADIUS: f64 = 20.0;

/// Outcome of offering one candidate to the aggregator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    /// Within the proximity radius of the last accepted center.
    RejectedNearLast,
    /// Center already accepted.
    RejectedDuplicateCenter,
    /// Overlaps an accepted box.
    RejectedOverlap,
}

/// Final deduplicated result for one scene.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Detections {
    /// Accepted candidates in acceptance order.
    pub boxes: Vec<Candidate>,
}

impl Detections {
    /// Number of accepted instances.
    pub fn count(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Per-scene accumulator for accepted boxes and centers.
#[derive(Debug)]
pub struct DetectionAggregator {
    proximity_radius: f64,
    accepted: Vec<Candidate>,
    centers: HashSet<(usize, usize)>,
    last_center: Option<(usize, usize)>,
}

impl Default for DetectionAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_PROXIMITY_RADIUS)
    }
}

impl DetectionAggregator {
    /// Creates an empty aggregator with the given proximity radius.
    pub fn new(proximity_radius: f64) -> Self {
        Self {
            proximity_radius,
            accepted: Vec::new(),
            centers: HashSet::new(),
            last_center: None,
        }
    }

    /// Offers a candidate; on acceptance its box is drawn onto `canvas`.
    pub fn offer<C: Canvas + ?Sized>(&mut self, candidate: Candidate, canvas: &mut C) -> Verdict {
        let verdict = self.judge(&candidate);
        if verdict == Verdict::Accepted {
            canvas.draw_box(&candidate.bbox);
            self.centers.insert(candidate.center);
            self.last_center = Some(candidate.center);
            self.accepted.push(candidate);
        }
        verdict
    }

    fn judge(&self, candidate: &Candidate) -> Verdict {
        if let Some(last) = self.last_center {
            if distance(candidate.center, last) < self.proximity_radius {
                return Verdict::RejectedNearLast;
            }
        }
        if self.centers.contains(&candidate.center) {
            return Verdict::RejectedDuplicateCenter;
        }
        if self.overlaps_accepted(&candidate.bbox) {
            return Verdict::RejectedOverlap;
        }
        Verdict::Accepted
    }

    fn overlaps_accepted(&self, bbox: &BoundingBox) -> bool {
        self.accepted.iter().any(|kept| kept.bbox.overlaps(bbox))
    }

    /// Number of candidates accepted so far.
    pub fn count(&self) -> usize {
        self.accepted.len()
    }

    /// Accepted candidates in acceptance order.
    pub fn boxes(&self) -> &[Candidate] {
        &self.accepted
    }

    /// Center of the most recently accepted candidate.
    pub fn last_center(&self) -> Option<(usize, usize)> {
        self.last_center
    }

    /// Consumes the aggregator and returns the scene result.
    pub fn finish(self) -> Detections {
        Detections {
            boxes: self.accepted,
        }
    }
}
