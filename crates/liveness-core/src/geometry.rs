//! Eye-openness and centering metrics computed from landmark geometry.
//!
//! Everything here is pure: no state, no side effects.

use crate::domain::{EyePoints, LandmarkSet, Point, LEFT_EYE, RIGHT_EYE};

/// Maximum distance of the nose tip from frame center, per axis.
pub const CENTER_TOLERANCE: f64 = 0.15;

/// Euclidean distance in the x/y plane. `z` is ignored.
#[must_use]
pub fn distance(p: &Point, q: &Point) -> f64 {
    (p.x - q.x).hypot(p.y - q.y)
}

/// Eye aspect ratio: `(|p1-p5| + |p2-p4|) / (2 * |p0-p3|)`.
///
/// Returns 0.0 when the corners coincide.
#[must_use]
pub fn ear(eye: &EyePoints) -> f64 {
    let vertical_a = distance(&eye[1], &eye[5]);
    let vertical_b = distance(&eye[2], &eye[4]);
    let horizontal = distance(&eye[0], &eye[3]);

    if horizontal == 0.0 {
        return 0.0;
    }
    (vertical_a + vertical_b) / (2.0 * horizontal)
}

/// Mean EAR of both eyes, or `None` if either eye lacks one of its six points.
#[must_use]
pub fn mean_ear(landmarks: &LandmarkSet) -> Option<f64> {
    let left = landmarks.eye(&LEFT_EYE)?;
    let right = landmarks.eye(&RIGHT_EYE)?;
    Some((ear(&left) + ear(&right)) / 2.0)
}

/// True if the nose tip lies strictly within [`CENTER_TOLERANCE`] of frame center on both axes.
#[must_use]
pub fn is_face_centered(landmarks: &LandmarkSet) -> bool {
    landmarks.nose_tip().is_some_and(|nose| {
        (nose.x - 0.5).abs() < CENTER_TOLERANCE && (nose.y - 0.5).abs() < CENTER_TOLERANCE
    })
}
