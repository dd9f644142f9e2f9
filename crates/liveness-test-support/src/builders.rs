//! Synthetic landmark builders for testing.

use liveness_core::domain::{
    LandmarkSet, Point, LEFT_EYE, MIN_LANDMARKS, NOSE_TIP, RIGHT_EYE,
};

const GRID_COLUMNS: usize = 18;
const GRID_ROWS: usize = 26;
const EYE_WIDTH: f64 = 0.04;
const LEFT_EYE_CENTER: (f64, f64) = (0.44, 0.45);
const RIGHT_EYE_CENTER: (f64, f64) = (0.56, 0.45);

/// Builder for synthetic face landmark sets.
///
/// The default face is a full 468-point mesh spread over
/// x in `[0.35, 0.65]` and y in `[0.3, 0.7]`, with the nose tip at frame
/// center and both eyes open.
#[derive(Debug, Clone)]
pub struct SyntheticFaceBuilder {
    ear: f64,
    nose: Option<(f64, f64)>,
    offset: (f64, f64),
    landmark_count: usize,
}

impl SyntheticFaceBuilder {
    /// EAR of an open eye.
    pub const OPEN_EAR: f64 = 0.3;
    /// EAR of a closed eye.
    pub const CLOSED_EAR: f64 = 0.1;

    /// Creates a builder for a centered face with open eyes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ear: Self::OPEN_EAR,
            nose: None,
            offset: (0.0, 0.0),
            landmark_count: MIN_LANDMARKS,
        }
    }

    /// Sets the EAR of both eyes.
    #[must_use]
    pub const fn with_ear(mut self, ear: f64) -> Self {
        self.ear = ear;
        self
    }

    /// Places the nose tip at an absolute position, leaving the rest in place.
    #[must_use]
    pub const fn with_nose(mut self, x: f64, y: f64) -> Self {
        self.nose = Some((x, y));
        self
    }

    /// Shifts the whole face.
    #[must_use]
    pub const fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.offset = (dx, dy);
        self
    }

    /// Truncates the mesh to `count` points.
    #[must_use]
    pub const fn with_landmark_count(mut self, count: usize) -> Self {
        self.landmark_count = count;
        self
    }

    /// Builds the landmark set.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn build(&self) -> LandmarkSet {
        let mut points: Vec<Point> = (0..MIN_LANDMARKS)
            .map(|i| {
                let col = (i % GRID_COLUMNS) as f64;
                let row = (i / GRID_COLUMNS % GRID_ROWS) as f64;
                Point::new(
                    0.35 + 0.3 * col / (GRID_COLUMNS - 1) as f64,
                    0.3 + 0.4 * row / (GRID_ROWS - 1) as f64,
                    0.0,
                )
            })
            .collect();

        points[NOSE_TIP] = Point::new(0.5, 0.5, 0.0);
        place_eye(&mut points, &LEFT_EYE, LEFT_EYE_CENTER, self.ear);
        place_eye(&mut points, &RIGHT_EYE, RIGHT_EYE_CENTER, self.ear);

        let (dx, dy) = self.offset;
        for p in &mut points {
            p.x += dx;
            p.y += dy;
        }
        if let Some((x, y)) = self.nose {
            points[NOSE_TIP] = Point::new(x, y, 0.0);
        }

        points.truncate(self.landmark_count);
        LandmarkSet::new(points)
    }

    /// A centered face with open eyes.
    #[must_use]
    pub fn open() -> LandmarkSet {
        Self::new().build()
    }

    /// A centered face with closed eyes.
    #[must_use]
    pub fn closed() -> LandmarkSet {
        Self::new().with_ear(Self::CLOSED_EAR).build()
    }

    /// Frames for `blinks` full blinks: open, then closed/open pairs.
    #[must_use]
    pub fn blink_frames(&self, blinks: usize) -> Vec<LandmarkSet> {
        let open = self.clone().with_ear(Self::OPEN_EAR).build();
        let closed = self.clone().with_ear(Self::CLOSED_EAR).build();
        let mut frames = vec![open.clone()];
        for _ in 0..blinks {
            frames.push(closed.clone());
            frames.push(open.clone());
        }
        frames
    }

    /// A full-size set whose points cycle through the given coordinates.
    ///
    /// The envelope is exactly `min..max` of `xs` and `ys`.
    #[must_use]
    pub fn spread(xs: &[f64], ys: &[f64]) -> LandmarkSet {
        if xs.is_empty() || ys.is_empty() {
            return LandmarkSet::default();
        }
        let points = (0..MIN_LANDMARKS)
            .map(|i| Point::new(xs[i % xs.len()], ys[(i / xs.len()) % ys.len()], 0.0))
            .collect();
        LandmarkSet::new(points)
    }
}

impl Default for SyntheticFaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes an eye with corners `EYE_WIDTH` apart and lids opened to `ear`.
fn place_eye(points: &mut [Point], indices: &[usize; 6], center: (f64, f64), ear: f64) {
    let (cx, cy) = center;
    let half_w = EYE_WIDTH / 2.0;
    let lid_x = EYE_WIDTH / 6.0;
    let half_h = ear * EYE_WIDTH / 2.0;

    let eye = [
        Point::new(cx - half_w, cy, 0.0),
        Point::new(cx - lid_x, cy - half_h, 0.0),
        Point::new(cx + lid_x, cy - half_h, 0.0),
        Point::new(cx + half_w, cy, 0.0),
        Point::new(cx + lid_x, cy + half_h, 0.0),
        Point::new(cx - lid_x, cy + half_h, 0.0),
    ];
    for (&index, point) in indices.iter().zip(eye) {
        points[index] = point;
    }
}
