//! Liveness Core - Domain logic and the session state machine
//!
//! This crate contains the landmark geometry, blink hysteresis, per-frame
//! evaluation, media-error classification, and the session controller that
//! coordinates an external capture source with an external landmark model.
//! It performs no I/O; collaborators plug in through the traits in [`ports`].

pub mod classify;
pub mod detection;
pub mod domain;
pub mod geometry;
pub mod ports;
pub mod session;

pub use classify::MediaError;
pub use detection::{BlinkDetector, FaceObservation, FrameEvaluator, FrameOutcome};
pub use domain::{
    BlinkState, BlinkThresholds, BoundingBox, CameraConfig, FaceMeshOptions, FacingMode,
    Generation, LandmarkSet, LivenessConfig, LivenessError, LivenessErrorCode, PhaseKind, Point,
    SessionPhase, SessionReport, SessionSnapshot,
};
pub use ports::{
    AssetLocator, CaptureRequest, CaptureSource, CdnAssetLocator, LandmarkInference, PlayOutcome,
    ReportOutput, SessionEvent, SessionObserver, StartOutcome, Timer, TimerId,
};
pub use session::SessionController;
