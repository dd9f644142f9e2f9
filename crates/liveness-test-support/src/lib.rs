//! Test support utilities for liveness.
//!
//! Provides mock ports and synthetic landmark builders for testing the
//! liveness session and its adapters.
//!
//! # Example
//!
//! ```
//! use liveness_test_support::{MockInference, SyntheticFaceBuilder};
//!
//! // Script two frames: one open-eyed face, then one closed
//! let inference = MockInference::new();
//! inference.push_faces(vec![SyntheticFaceBuilder::open()]);
//! inference.push_faces(vec![SyntheticFaceBuilder::closed()]);
//! ```

mod builders;
mod mocks;

pub use builders::SyntheticFaceBuilder;
pub use mocks::{MockCaptureSource, MockInference, MockObserver, MockTimer};
