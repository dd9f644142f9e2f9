//! Stable error taxonomy surfaced to session consumers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes a liveness session can end with.
///
/// Every code is terminal for the attempt it occurs in and recoverable through
/// a consumer-initiated retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LivenessErrorCode {
    /// Capture start was aborted.
    Aborted,
    /// The camera is held by another process or could not be read.
    CameraInUse,
    /// No camera device matched.
    CameraNotFound,
    /// No face appeared before the face-detection timeout.
    FaceNotDetected,
    /// The landmark model failed to load or run.
    ModelLoadFailed,
    /// More than one face was in frame.
    MultipleFaces,
    /// The environment cannot provide camera capture at all.
    NotAllowed,
    /// Requested camera constraints cannot be satisfied.
    Overconstrained,
    /// Camera permission was denied.
    PermissionDenied,
    /// The capture sink refused to start playback.
    PlayFailed,
    /// Anything not otherwise classified.
    Unknown,
}

impl LivenessErrorCode {
    /// All codes, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Aborted,
        Self::CameraInUse,
        Self::CameraNotFound,
        Self::FaceNotDetected,
        Self::ModelLoadFailed,
        Self::MultipleFaces,
        Self::NotAllowed,
        Self::Overconstrained,
        Self::PermissionDenied,
        Self::PlayFailed,
        Self::Unknown,
    ];

    /// Wire name of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aborted => "ABORTED",
            Self::CameraInUse => "CAMERA_IN_USE",
            Self::CameraNotFound => "CAMERA_NOT_FOUND",
            Self::FaceNotDetected => "FACE_NOT_DETECTED",
            Self::ModelLoadFailed => "MODEL_LOAD_FAILED",
            Self::MultipleFaces => "MULTIPLE_FACES",
            Self::NotAllowed => "NOT_ALLOWED",
            Self::Overconstrained => "OVERCONSTRAINED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::PlayFailed => "PLAY_FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Message used when the underlying failure carries none.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::FaceNotDetected => "No face detected in time",
            Self::ModelLoadFailed => "Model failed to load",
            Self::MultipleFaces => "Only one face should be visible",
            Self::NotAllowed => "Camera not supported in this environment",
            Self::PlayFailed => "Video play failed (try allowing autoplay)",
            Self::Aborted
            | Self::CameraInUse
            | Self::CameraNotFound
            | Self::Overconstrained
            | Self::PermissionDenied
            | Self::Unknown => "Camera failed to start",
        }
    }
}

impl fmt::Display for LivenessErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A session error: a stable code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct LivenessError {
    /// Error code.
    pub code: LivenessErrorCode,
    /// Human-readable description.
    pub message: String,
}

impl LivenessError {
    /// Creates an error, falling back to the code's default message when
    /// `message` is empty.
    #[must_use]
    pub fn new(code: LivenessErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.default_message().to_string()
        } else {
            message
        };
        Self { code, message }
    }

    /// Creates an error carrying the code's default message.
    #[must_use]
    pub fn from_code(code: LivenessErrorCode) -> Self {
        Self::new(code, code.default_message())
    }
}
