//! Drives a session over a recording.

use liveness_core::domain::{PhaseKind, SessionSnapshot};
use liveness_core::SessionController;
use tracing::{debug, info};

use crate::clock::VirtualTimer;
use crate::recording::{RecordedFrame, Recording};

/// How a replay reacts to the session settling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Stop at the first pass instead of playing the rest of the recording.
    pub stop_on_pass: bool,
    /// Retries to perform after errors before giving up.
    pub max_retries: u32,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            stop_on_pass: true,
            max_retries: 0,
        }
    }
}

/// What happened during a replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    /// Frames delivered to the session.
    pub frames_processed: usize,
    /// Retries performed.
    pub retries: u32,
    /// Session state when the replay ended.
    pub snapshot: SessionSnapshot,
}

/// Replays `recording` through `session`.
///
/// The session is started, then for each frame the virtual clock is advanced
/// to the frame's timestamp (firing any due timeout) before the frame is
/// delivered under the current generation. `timer` must be the same clock
/// the session schedules on.
pub fn replay(
    session: &mut SessionController<RecordedFrame>,
    timer: &VirtualTimer,
    recording: &Recording,
    options: &ReplayOptions,
) -> ReplaySummary {
    info!(
        "Replaying {} ({} frames, {} ms)",
        recording.source(),
        recording.frames().len(),
        recording.duration_ms()
    );

    let mut frames_processed = 0;
    let mut retries = 0;

    session.start();

    for frame in recording.frames() {
        for generation in timer.advance_to(frame.t_ms) {
            session.timeout_elapsed(generation);
        }

        match session.snapshot().phase {
            PhaseKind::Error if retries < options.max_retries => {
                retries += 1;
                debug!("Retry {retries}/{} at {} ms", options.max_retries, frame.t_ms);
                session.retry();
            }
            PhaseKind::Error => break,
            PhaseKind::Passed if options.stop_on_pass => break,
            _ => {}
        }

        if !session.phase().accepts_frames() {
            continue;
        }
        let generation = session.generation();
        session.on_frame(generation, frame);
        frames_processed += 1;
    }

    let snapshot = session.snapshot();
    info!(
        "Replay finished: {frames_processed} frames, {} blinks, phase {:?}",
        snapshot.blink_count, snapshot.phase
    );

    ReplaySummary {
        frames_processed,
        retries,
        snapshot,
    }
}
