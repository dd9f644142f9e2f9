//! One-shot timer port.

use std::time::Duration;

use crate::domain::Generation;

/// Handle to a scheduled timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Port for scheduling the face-detection timeout.
///
/// When a scheduled timer fires, the host calls
/// `SessionController::timeout_elapsed` with the generation it was scheduled under.
pub trait Timer: Send + Sync {
    /// Schedules a one-shot timeout.
    fn schedule(&self, delay: Duration, generation: Generation) -> TimerId;

    /// Cancels a scheduled timeout. Unknown or already-fired ids are ignored.
    fn cancel(&self, id: TimerId);
}
