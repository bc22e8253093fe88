//! Annotation targets for accepted boxes.

use crate::candidate::BoundingBox;

/// Receives one rectangle per accepted candidate.
pub trait Canvas {
    fn draw_box(&mut self, bbox: &BoundingBox);
}

/// Discards all drawing; used when only counts and boxes are needed.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCanvas;

impl Canvas for NoCanvas {
    fn draw_box(&mut self, _bbox: &BoundingBox) {}
}

/// Records drawn boxes in order.
impl Canvas for Vec<BoundingBox> {
    fn draw_box(&mut self, bbox: &BoundingBox) {
        self.push(*bbox);
    }
}
