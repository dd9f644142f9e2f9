//! Video capture port.

use crate::classify::MediaError;
use crate::domain::{CameraConfig, Generation};

/// Parameters for one capture attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRequest {
    /// Requested resolution and facing mode.
    pub camera: CameraConfig,
    /// Attempt the frame callback is registered under. Frames delivered back
    /// to the session must carry this value.
    pub generation: Generation,
}

/// Result of asking the capture source to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Capture is up.
    Started,
    /// Start completes later via `SessionController::capture_started`.
    Pending,
    /// Capture could not be started.
    Failed(MediaError),
}

/// Result of asking the capture sink to begin playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Playback running.
    Playing,
    /// Playback completes later via `SessionController::playback_started`.
    Pending,
    /// Playback refused, with the reason if one was given.
    Failed(String),
}

/// Port for the external video capture device.
///
/// The source pushes frames to the session at its own cadence and must not
/// submit a new frame until the previous inference call has settled.
pub trait CaptureSource: Send + Sync {
    /// False if this environment cannot provide capture at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Requests capture with the given parameters.
    fn start(&self, request: &CaptureRequest) -> StartOutcome;

    /// Requests playback on the capture sink for the given attempt.
    fn play(&self, generation: Generation) -> PlayOutcome;

    /// Stops capture. Must be safe to call when nothing is running.
    fn stop(&self);
}
