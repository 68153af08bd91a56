use serde::{Deserialize, Serialize};

/// Axis-aligned box in page pixel coordinates.
///
/// Width and height are expected to be non-negative; loaders reject
/// anything else before a rectangle is built.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub start_x: i64,
    pub start_y: i64,
    pub width: i64,
    pub height: i64,
}

impl Rectangle {
    pub fn new(start_x: i64, start_y: i64, width: i64, height: i64) -> Self {
        Self {
            start_x,
            start_y,
            width,
            height,
        }
    }

    pub fn end_x(&self) -> i64 {
        self.start_x + self.width
    }

    pub fn end_y(&self) -> i64 {
        self.start_y + self.height
    }

    pub fn area(&self) -> i64 {
        self.width * self.height
    }

    /// Intersection of two rectangles. Boxes that only share an edge or a
    /// corner have no overlap.
    pub fn overlap(&self, other: &Self) -> Option<Self> {
        let sx = self.start_x.max(other.start_x);
        let sy = self.start_y.max(other.start_y);
        let ex = self.end_x().min(other.end_x());
        let ey = self.end_y().min(other.end_y());

        let w = ex - sx;
        let h = ey - sy;
        if w > 0 && h > 0 {
            Some(Self::new(sx, sy, w, h))
        } else {
            None
        }
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.overlap(other).is_some()
    }

    /// Grows the box by `dx` on the left and right and `dy` on the top and
    /// bottom. The origin is clamped at zero but the size always grows by the
    /// full margin, so boxes near the page edge end up shifted right/down.
    pub fn expand(&self, dx: i64, dy: i64) -> Self {
        Self {
            start_x: (self.start_x - dx).max(0),
            start_y: (self.start_y - dy).max(0),
            width: self.width + dx * 2,
            height: self.height + dy * 2,
        }
    }

    /// True when `self` lies entirely within `other`.
    pub fn is_inside(&self, other: &Self) -> bool {
        self.overlap(other).as_ref() == Some(self)
    }

    /// True when `other` lies entirely within `self`.
    pub fn contains(&self, other: &Self) -> bool {
        other.is_inside(self)
    }

    pub fn union(&self, other: &Self) -> Self {
        let sx = self.start_x.min(other.start_x);
        let sy = self.start_y.min(other.start_y);
        Self {
            start_x: sx,
            start_y: sy,
            width: self.end_x().max(other.end_x()) - sx,
            height: self.end_y().max(other.end_y()) - sy,
        }
    }

    /// Squared euclidean distance of the start point from the page origin.
    pub fn origin_distance_sq(&self) -> i64 {
        self.start_x * self.start_x + self.start_y * self.start_y
    }

    /// Harmonic mean of overlap recall (against `reference`) and overlap
    /// precision (against `self`). Zero when the boxes do not overlap.
    pub fn f1_score(&self, reference: &Self) -> f64 {
        let Some(overlap) = self.overlap(reference) else {
            return 0.0;
        };
        let area_o = overlap.area() as f64;
        let recall = area_o / reference.area() as f64;
        let precision = area_o / self.area() as f64;
        2.0 / (1.0 / recall + 1.0 / precision)
    }
}

/// Smallest rectangle enclosing every input, or `None` for an empty input.
pub fn bounding_box<'a, I>(rects: I) -> Option<Rectangle>
where
    I: IntoIterator<Item = &'a Rectangle>,
{
    rects
        .into_iter()
        .fold(None, |acc: Option<Rectangle>, r| match acc {
            Some(b) => Some(b.union(r)),
            None => Some(*r),
        })
}
