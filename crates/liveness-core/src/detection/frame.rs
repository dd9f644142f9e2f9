//! Per-frame evaluation of inference results.

use tracing::trace;

use super::BlinkDetector;
use crate::domain::{BlinkState, BoundingBox, LandmarkSet};
use crate::geometry::{is_face_centered, mean_ear};

/// What a frame showed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaceObservation {
    /// No usable face: nothing detected, or too few landmarks.
    Absent,
    /// More than one face candidate.
    Multiple {
        /// Number of candidates.
        count: usize,
    },
    /// Exactly one usable face.
    Single {
        /// Envelope of all of its landmarks.
        bbox: BoundingBox,
    },
}

impl FaceObservation {
    /// The bounding box to surface, if any.
    #[must_use]
    pub const fn bbox(&self) -> Option<BoundingBox> {
        match self {
            Self::Single { bbox } => Some(*bbox),
            Self::Absent | Self::Multiple { .. } => None,
        }
    }
}

/// Values computed for one frame, handed back to the session for applying.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    /// Face presence for this frame.
    pub observation: FaceObservation,
    /// Blink state after this frame.
    pub blink: BlinkState,
    /// Mean EAR fed to the blink detector, if the frame passed both gates.
    pub mean_ear: Option<f64>,
    /// The multiple-faces error should be raised now.
    pub raise_multiple_faces: bool,
}

/// Validates face count, computes the bounding box and drives blink detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameEvaluator {
    detector: BlinkDetector,
}

impl FrameEvaluator {
    /// Creates an evaluator around a blink detector.
    #[must_use]
    pub const fn new(detector: BlinkDetector) -> Self {
        Self { detector }
    }

    /// Evaluates one inference result.
    ///
    /// `multiple_faces_reported` is the one-shot latch: once set, further
    /// multi-face frames in the same attempt do not ask for another error.
    #[must_use]
    pub fn evaluate(
        &self,
        faces: &[LandmarkSet],
        blink: BlinkState,
        required_blinks: u32,
        multiple_faces_reported: bool,
    ) -> FrameOutcome {
        let unchanged = |observation, raise_multiple_faces| FrameOutcome {
            observation,
            blink,
            mean_ear: None,
            raise_multiple_faces,
        };

        if faces.len() > 1 {
            return unchanged(
                FaceObservation::Multiple { count: faces.len() },
                !multiple_faces_reported,
            );
        }

        let Some(face) = faces.first().filter(|f| f.is_complete()) else {
            return unchanged(FaceObservation::Absent, false);
        };
        let Some(bbox) = face.bounding_box() else {
            return unchanged(FaceObservation::Absent, false);
        };

        let mut outcome = unchanged(FaceObservation::Single { bbox }, false);

        if !is_face_centered(face) {
            trace!("Face off-center, skipping blink detection");
            return outcome;
        }
        if let Some(ear) = mean_ear(face) {
            outcome.mean_ear = Some(ear);
            outcome.blink = self.detector.observe(blink, ear, required_blinks);
        }

        outcome
    }
}
