//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the session core and the
//! collaborators it drives: the capture device, the landmark model, timers,
//! and whoever consumes session events and reports.

mod capture;
mod events;
mod inference;
mod report_output;
mod timer;

pub use capture::{CaptureRequest, CaptureSource, PlayOutcome, StartOutcome};
pub use events::{SessionEvent, SessionObserver};
pub use inference::{
    AssetLocator, CdnAssetLocator, LandmarkInference, DEFAULT_ASSET_BASE_URL, FACE_MESH_ASSETS,
};
pub use report_output::ReportOutput;
pub use timer::{Timer, TimerId};
