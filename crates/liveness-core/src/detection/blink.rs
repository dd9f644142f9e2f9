//! Blink counting with a hysteresis band.

use tracing::trace;

use crate::domain::{BlinkState, BlinkThresholds};

/// Turns a continuous EAR signal into discrete blinks.
///
/// A blink is counted only on the opening edge: EAR must first drop below
/// the close threshold, then rise above the open threshold. Readings inside
/// the band never change state.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlinkDetector {
    thresholds: BlinkThresholds,
}

impl BlinkDetector {
    /// Creates a detector with the given band.
    #[must_use]
    pub const fn new(thresholds: BlinkThresholds) -> Self {
        Self { thresholds }
    }

    /// Feeds one mean-EAR reading and returns the next state.
    #[must_use]
    pub fn observe(&self, state: BlinkState, mean_ear: f64, required_blinks: u32) -> BlinkState {
        let mut next = state;

        if mean_ear < self.thresholds.close && !next.eye_closed {
            trace!(mean_ear, "Eyes closed");
            next.eye_closed = true;
        }

        if mean_ear > self.thresholds.open && next.eye_closed {
            next.blink_count = next.blink_count.saturating_add(1);
            if next.blink_count >= required_blinks {
                next.passed = true;
            }
            next.eye_closed = false;
            trace!(mean_ear, blink_count = next.blink_count, "Eyes reopened, blink counted");
        }

        next
    }

    /// Feeds a sequence of readings starting from `state`.
    #[must_use]
    pub fn observe_all(
        &self,
        state: BlinkState,
        readings: &[f64],
        required_blinks: u32,
    ) -> BlinkState {
        readings
            .iter()
            .fold(state, |acc, &ear| self.observe(acc, ear, required_blinks))
    }
}
