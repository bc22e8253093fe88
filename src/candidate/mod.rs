//! Match peaks, candidate boxes and the overlap predicate.

/// A scored placement of a (scaled) template in scene coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the template's top-left corner.
    pub x: usize,
    /// Y coordinate (row) of the template's top-left corner.
    pub y: usize,
    /// ZNCC score in `[-1, 1]`.
    pub score: f32,
}

/// Axis-aligned box with exclusive bottom-right corner `(x2, y2)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
}

impl BoundingBox {
    /// Creates a box from its top-left corner and size.
    pub fn from_origin(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    pub fn width(&self) -> usize {
        self.x2 - self.x1
    }

    pub fn height(&self) -> usize {
        self.y2 - self.y1
    }

    /// Center with floor division of the half extents.
    pub fn center(&self) -> (usize, usize) {
        (self.x1 + self.width() / 2, self.y1 + self.height() / 2)
    }

    /// True when the two boxes share a rectangle of positive area.
    ///
    /// Boxes that merely touch along an edge do not overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.x2.min(other.x2) > self.x1.max(other.x1)
            && self.y2.min(other.y2) > self.y1.max(other.y1)
    }
}

/// A peak promoted to a box at one scale, before deduplication.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub bbox: BoundingBox,
    pub center: (usize, usize),
    pub score: f32,
    /// Index of the template in the detector's template list.
    pub template_idx: usize,
    /// Scale factor the template was resampled with.
    pub scale: f64,
}

impl Candidate {
    /// Builds a candidate for a template of `width x height` placed at a peak.
    pub fn from_peak(
        peak: Peak,
        width: usize,
        height: usize,
        template_idx: usize,
        scale: f64,
    ) -> Self {
        let bbox = BoundingBox::from_origin(peak.x, peak.y, width, height);
        Self {
            bbox,
            center: bbox.center(),
            score: peak.score,
            template_idx,
            scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundingBox, Candidate, Peak};

    #[test]
    fn center_uses_floor_division() {
        let bbox = BoundingBox::from_origin(10, 4, 7, 5);
        assert_eq!(bbox.center(), (13, 6));
        let cand = Candidate::from_peak(
            Peak {
                x: 10,
                y: 4,
                score: 0.9,
            },
            7,
            5,
            0,
            1.0,
        );
        assert_eq!(cand.bbox, BoundingBox { x1: 10, y1: 4, x2: 17, y2: 9 });
        assert_eq!(cand.center, (13, 6));
    }

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = BoundingBox::from_origin(0, 0, 10, 10);
        let right = BoundingBox::from_origin(10, 0, 10, 10);
        let below = BoundingBox::from_origin(0, 10, 10, 10);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
        assert!(!right.overlaps(&a));
    }

    #[test]
    fn overlap_requires_both_axes() {
        let a = BoundingBox::from_origin(0, 0, 10, 10);
        assert!(a.overlaps(&BoundingBox::from_origin(9, 9, 5, 5)));
        assert!(a.overlaps(&BoundingBox::from_origin(2, 2, 3, 3)));
        assert!(!a.overlaps(&BoundingBox::from_origin(5, 12, 5, 5)));
        assert!(!a.overlaps(&BoundingBox::from_origin(12, 5, 5, 5)));
    }
}
