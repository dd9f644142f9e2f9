//! Facial landmark types and the fixed mesh indices the engine relies on.

use serde::{Deserialize, Serialize};

/// Minimum number of points for a landmark set to count as a usable face.
pub const MIN_LANDMARKS: usize = 468;

/// Left-eye indices ordered `[corner, lid-top, lid-top, corner, lid-bottom, lid-bottom]`.
pub const LEFT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// Right-eye indices, same ordering as [`LEFT_EYE`].
pub const RIGHT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];

/// Nose-tip index.
pub const NOSE_TIP: usize = 1;

/// A single landmark in normalized frame coordinates (0.0-1.0).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Relative depth. Ignored by every 2D metric.
    #[serde(default)]
    pub z: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// The six points of one eye, ordered as in [`LEFT_EYE`].
pub type EyePoints = [Point; 6];

/// One detected face: an ordered set of landmarks with fixed semantic indices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet(Vec<Point>);

impl LandmarkSet {
    /// Wraps a point list.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the set has enough points to be treated as a face.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.0.len() >= MIN_LANDMARKS
    }

    /// Returns the point at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Point> {
        self.0.get(index)
    }

    /// Returns all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Returns the nose-tip landmark.
    #[must_use]
    pub fn nose_tip(&self) -> Option<&Point> {
        self.get(NOSE_TIP)
    }

    /// Extracts the six eye points at `indices`.
    ///
    /// Returns `None` if any of the six is missing.
    #[must_use]
    pub fn eye(&self, indices: &[usize; 6]) -> Option<EyePoints> {
        let mut eye = [Point::default(); 6];
        for (slot, &index) in eye.iter_mut().zip(indices) {
            *slot = *self.get(index)?;
        }
        Some(eye)
    }

    /// Axis-aligned envelope of every point's x/y.
    ///
    /// Returns `None` for an empty set.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.0.first()?;
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);

        for p in &self.0[1..] {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        Some(BoundingBox {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

impl From<Vec<Point>> for LandmarkSet {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

/// Normalized face bounding box (0.0-1.0 relative to frame size).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}
