//! Core domain types for liveness sessions.

mod config;
mod error;
mod landmarks;
mod report;
mod state;

pub use config::{
    BlinkThresholds, CameraConfig, FaceMeshOptions, FacingMode, LivenessConfig,
    DEFAULT_HEIGHT, DEFAULT_REQUIRED_BLINKS, DEFAULT_WIDTH,
};
pub use error::{LivenessError, LivenessErrorCode};
pub use landmarks::{
    BoundingBox, EyePoints, LandmarkSet, Point, LEFT_EYE, MIN_LANDMARKS, NOSE_TIP, RIGHT_EYE,
};
pub use report::SessionReport;
pub use state::{BlinkState, Generation, PhaseKind, PhaseTransition, SessionPhase, SessionSnapshot};
