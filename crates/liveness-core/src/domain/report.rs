//! Session report written at the end of a run.

use serde::{Deserialize, Serialize};

use super::SessionSnapshot;

/// Outcome of one liveness run over a frame source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Where the frames came from.
    pub source: String,
    /// Time the report was produced (ISO 8601).
    pub timestamp: String,
    /// Frames delivered to the session.
    pub frames_processed: usize,
    /// Consumer-initiated retries performed.
    pub retries: u32,
    /// Final session state.
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
}
