//! Session event port for UI integration.

use serde::Serialize;

use crate::domain::{BoundingBox, Generation, LivenessError};

/// Events emitted by a session as it moves through its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Capture requested for a new attempt.
    Starting {
        /// The attempt.
        generation: Generation,
    },
    /// Capture is up and frames are being evaluated.
    Ready,
    /// A single face appeared.
    FaceDetected {
        /// Envelope of its landmarks.
        bbox: BoundingBox,
    },
    /// The face previously seen is gone.
    FaceLost,
    /// A blink was counted.
    Blink {
        /// Blinks so far in this attempt.
        count: u32,
    },
    /// Liveness confirmed. Emitted once per attempt.
    Passed {
        /// Blinks counted when the requirement was met.
        blink_count: u32,
    },
    /// The attempt failed.
    Failed {
        /// What went wrong.
        error: LivenessError,
    },
    /// A retry was requested.
    Retrying,
    /// The session was torn down.
    Stopped,
}

/// Port for receiving session events.
pub trait SessionObserver: Send + Sync {
    /// Called when a session event occurs.
    fn on_event(&self, event: &SessionEvent);
}
