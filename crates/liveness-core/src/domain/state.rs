//! Session state: generations, blink counters, phases and snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{BoundingBox, LivenessError};

/// Identifier of one session attempt.
///
/// Every asynchronous completion is tagged with the generation it was issued
/// under and is dropped if the controller has since moved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    /// Wraps a raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The generation after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Blink counter state for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlinkState {
    /// Eyes are currently below the close threshold.
    pub eye_closed: bool,
    /// Completed blinks. Never decreases within an attempt.
    pub blink_count: u32,
    /// Latched once `blink_count` reaches the required count.
    pub passed: bool,
}

impl BlinkState {
    /// Zeroes every field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Lifecycle phase of a liveness session.
///
/// Face presence lives inside the phases that can observe a face, so an error
/// can never coexist with a detected face.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    /// Nothing requested yet, or torn down.
    #[default]
    Unstarted,
    /// Capture requested, waiting for it to come up.
    Starting,
    /// Capture running, frames being evaluated.
    Active {
        /// Bounding box of the single face in the last processed frame.
        face: Option<BoundingBox>,
    },
    /// Required blinks observed. Capture keeps running for preview.
    Passed {
        /// Bounding box of the single face in the last processed frame.
        face: Option<BoundingBox>,
    },
    /// The attempt failed; capture has been stopped.
    Error(LivenessError),
}

/// Inputs to [`SessionPhase::next`].
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseTransition {
    /// Capture was requested.
    Begin,
    /// Capture came up.
    CaptureReady,
    /// A frame produced a new face observation.
    Face(Option<BoundingBox>),
    /// The blink requirement was met.
    Pass,
    /// The attempt failed.
    Fail(LivenessError),
    /// Back to the initial phase (retry or teardown).
    Reset,
}

/// Coarse phase name used in snapshots and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// See [`SessionPhase::Unstarted`].
    Unstarted,
    /// See [`SessionPhase::Starting`].
    Starting,
    /// See [`SessionPhase::Active`].
    Active,
    /// See [`SessionPhase::Passed`].
    Passed,
    /// See [`SessionPhase::Error`].
    Error,
}

impl SessionPhase {
    /// Applies a transition, returning `None` if it is not legal from here.
    #[must_use]
    pub fn next(&self, transition: PhaseTransition) -> Option<Self> {
        match (self, transition) {
            (_, PhaseTransition::Reset) => Some(Self::Unstarted),
            (Self::Unstarted, PhaseTransition::Begin) => Some(Self::Starting),
            (Self::Starting, PhaseTransition::CaptureReady) => Some(Self::Active { face: None }),
            (Self::Active { .. }, PhaseTransition::Face(face)) => Some(Self::Active { face }),
            (Self::Passed { .. }, PhaseTransition::Face(face)) => Some(Self::Passed { face }),
            (Self::Active { face }, PhaseTransition::Pass) => Some(Self::Passed { face: *face }),
            (Self::Unstarted | Self::Starting | Self::Active { .. }, PhaseTransition::Fail(err)) => {
                Some(Self::Error(err))
            }
            _ => None,
        }
    }

    /// Coarse phase name.
    #[must_use]
    pub const fn kind(&self) -> PhaseKind {
        match self {
            Self::Unstarted => PhaseKind::Unstarted,
            Self::Starting => PhaseKind::Starting,
            Self::Active { .. } => PhaseKind::Active,
            Self::Passed { .. } => PhaseKind::Passed,
            Self::Error(_) => PhaseKind::Error,
        }
    }

    /// True for `Passed` and `Error`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Passed { .. } | Self::Error(_))
    }

    /// True while frames are being evaluated.
    #[must_use]
    pub const fn accepts_frames(&self) -> bool {
        matches!(self, Self::Active { .. } | Self::Passed { .. })
    }

    /// The face seen in the last processed frame, if any.
    #[must_use]
    pub const fn face(&self) -> Option<&BoundingBox> {
        match self {
            Self::Active { face } | Self::Passed { face } => face.as_ref(),
            _ => None,
        }
    }

    /// The error, if the attempt failed.
    #[must_use]
    pub const fn error(&self) -> Option<&LivenessError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Observable session state handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Coarse phase.
    pub phase: PhaseKind,
    /// Current attempt.
    pub generation: Generation,
    /// Blinks counted in this attempt.
    pub blink_count: u32,
    /// Blink requirement met.
    pub passed: bool,
    /// Failure of this attempt, if any.
    pub error: Option<LivenessError>,
    /// Capture is up and frames are flowing.
    pub is_ready: bool,
    /// Exactly one usable face in the last processed frame.
    pub is_face_detected: bool,
    /// Envelope of that face.
    pub face_bounding_box: Option<BoundingBox>,
}

impl SessionSnapshot {
    /// Derives a snapshot from the controller's owned state.
    #[must_use]
    pub fn new(phase: &SessionPhase, blink: &BlinkState, generation: Generation) -> Self {
        let face = phase.face().copied();
        Self {
            phase: phase.kind(),
            generation,
            blink_count: blink.blink_count,
            passed: blink.passed,
            error: phase.error().cloned(),
            is_ready: phase.accepts_frames(),
            is_face_detected: face.is_some(),
            face_bounding_box: face,
        }
    }
}
