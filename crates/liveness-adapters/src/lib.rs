//! Liveness Adapters - External adapters for liveness-core.
//!
//! This crate provides adapters for:
//! - Recorded landmark streams (capture source and inference)
//! - A virtual timer driven by recording timestamps
//! - Face-mesh asset location
//! - Replaying a recording through a session

pub mod assets;
pub mod clock;
pub mod recording;
pub mod replay;

pub use assets::{assets_dir, locator_for, DirAssetLocator};
pub use clock::VirtualTimer;
pub use recording::{RecordedFrame, RecordedInference, Recording, RecordingCapture};
pub use replay::{replay, ReplayOptions, ReplaySummary};
