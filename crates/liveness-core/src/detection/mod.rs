//! Frame-level detection: blink hysteresis and per-frame evaluation.

mod blink;
mod frame;

pub use blink::BlinkDetector;
pub use frame::{FaceObservation, FrameEvaluator, FrameOutcome};
