//! Mapping of capture/media failures onto [`LivenessErrorCode`].

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

use crate::domain::{LivenessError, LivenessErrorCode};

/// A failure reported by a capture backend.
///
/// `name` follows the media-device naming convention (`NotAllowedError`,
/// `NotFoundError`, ...); backends that do not speak it can go through the
/// `From<&io::Error>` conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaError {
    /// Failure identifier.
    pub name: String,
    /// Human-readable detail. May be empty.
    #[serde(default)]
    pub message: String,
}

impl MediaError {
    /// Creates a media error.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}: {}", self.name, self.message)
        }
    }
}

impl std::error::Error for MediaError {}

impl From<&io::Error> for MediaError {
    fn from(err: &io::Error) -> Self {
        let name = match err.kind() {
            io::ErrorKind::PermissionDenied => "NotAllowedError",
            io::ErrorKind::NotFound => "NotFoundError",
            io::ErrorKind::Interrupted => "AbortError",
            io::ErrorKind::AddrInUse | io::ErrorKind::WouldBlock => "NotReadableError",
            io::ErrorKind::InvalidInput => "OverconstrainedError",
            _ => "UnknownError",
        };
        Self::new(name, err.to_string())
    }
}

/// Maps a media failure onto the error taxonomy. Never fails.
#[must_use]
pub fn classify(err: &MediaError) -> LivenessErrorCode {
    match err.name.as_str() {
        "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => {
            LivenessErrorCode::PermissionDenied
        }
        "NotFoundError" | "DevicesNotFoundError" => LivenessErrorCode::CameraNotFound,
        "NotReadableError" | "TrackStartError" => LivenessErrorCode::CameraInUse,
        "OverconstrainedError" | "ConstraintNotSatisfiedError" => {
            LivenessErrorCode::Overconstrained
        }
        "AbortError" => LivenessErrorCode::Aborted,
        _ => LivenessErrorCode::Unknown,
    }
}

/// Classifies a capture-start failure into a session error.
#[must_use]
pub fn to_liveness_error(err: &MediaError) -> LivenessError {
    LivenessError::new(classify(err), err.message.clone())
}
