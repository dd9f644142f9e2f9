//! Virtual timer driven by recording timestamps.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use liveness_core::domain::Generation;
use liveness_core::ports::{Timer, TimerId};
use tracing::trace;

#[derive(Debug, Default)]
struct ClockState {
    now_ms: u64,
    next_id: u64,
    pending: Vec<(TimerId, u64, Generation)>,
}

/// A [`Timer`] whose clock only moves when told to.
///
/// Clones share the same clock, so one handle can be given to the session
/// while the replay loop advances another.
#[derive(Debug, Clone, Default)]
pub struct VirtualTimer {
    state: Arc<Mutex<ClockState>>,
}

impl VirtualTimer {
    /// Creates a timer at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.lock().now_ms
    }

    /// Number of timeouts scheduled and not yet fired or cancelled.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Moves the clock forward and returns the generations of every timeout
    /// that came due, earliest first. The clock never moves backwards.
    pub fn advance_to(&self, now_ms: u64) -> Vec<Generation> {
        let mut state = self.lock();
        state.now_ms = state.now_ms.max(now_ms);
        let now = state.now_ms;

        let mut due: Vec<(TimerId, u64, Generation)> = Vec::new();
        state.pending.retain(|entry| {
            if entry.1 <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|(id, deadline, _)| (*deadline, *id));

        for (id, deadline, generation) in &due {
            trace!("Timer {} fired at {now} (deadline {deadline}, generation {generation})", id.0);
        }
        due.into_iter().map(|(_, _, generation)| generation).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Timer for VirtualTimer {
    fn schedule(&self, delay: Duration, generation: Generation) -> TimerId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = TimerId(state.next_id);
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        let deadline = state.now_ms.saturating_add(delay_ms);
        state.pending.push((id, deadline, generation));
        trace!("Timer {} scheduled for {deadline}", id.0);
        id
    }

    fn cancel(&self, id: TimerId) {
        self.lock().pending.retain(|(pending, _, _)| *pending != id);
    }
}
