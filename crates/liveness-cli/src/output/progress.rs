//! Blink progress display using indicatif.

use indicatif::{ProgressBar, ProgressStyle};
use liveness_core::{SessionEvent, SessionObserver};

/// Progress adapter for CLI output.
///
/// With a bar, shows a spinner counting blinks toward the requirement.
/// Without one, prints a status line per notable event.
pub struct BlinkProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl BlinkProgress {
    /// Creates a new progress display.
    ///
    /// # Arguments
    ///
    /// * `required` - Blinks required to pass
    /// * `quiet` - If true, suppress all output
    /// * `show_bar` - If true, show spinner; otherwise show per-event status
    #[must_use]
    pub fn new(required: u32, quiet: bool, show_bar: bool) -> Self {
        if quiet {
            return Self {
                bar: None,
                quiet: true,
            };
        }

        let bar = if show_bar {
            let bar = ProgressBar::new(u64::from(required));
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] blinks {pos}/{len} {msg}")
            {
                bar.set_style(style);
            }
            bar.set_message("starting camera");
            Some(bar)
        } else {
            None
        };

        Self { bar, quiet }
    }
}

impl SessionObserver for BlinkProgress {
    fn on_event(&self, event: &SessionEvent) {
        if self.quiet {
            return;
        }

        match event {
            SessionEvent::Starting { generation } => {
                if let Some(bar) = &self.bar {
                    bar.reset();
                    bar.set_message(format!("starting attempt {generation}"));
                }
            }
            SessionEvent::Ready => {
                if let Some(bar) = &self.bar {
                    bar.set_message("looking for a face");
                }
            }
            SessionEvent::FaceDetected { .. } => {
                if let Some(bar) = &self.bar {
                    bar.set_message("face detected, blink");
                }
            }
            SessionEvent::FaceLost => {
                if let Some(bar) = &self.bar {
                    bar.set_message("face lost");
                }
            }
            SessionEvent::Blink { count } => {
                if let Some(bar) = &self.bar {
                    bar.set_position(u64::from(*count));
                }
            }
            SessionEvent::Passed { blink_count } => {
                if let Some(bar) = &self.bar {
                    bar.set_position(u64::from(*blink_count));
                    bar.finish_with_message("passed");
                } else {
                    eprintln!("Passed after {blink_count} blink(s)");
                }
            }
            SessionEvent::Failed { error } => {
                if let Some(bar) = &self.bar {
                    bar.abandon_with_message(format!("failed: {}", error.code));
                } else {
                    eprintln!("Failed: {error}");
                }
            }
            SessionEvent::Retrying => {
                if self.bar.is_none() {
                    eprintln!("Retrying");
                }
            }
            SessionEvent::Stopped => {
                if let Some(bar) = &self.bar {
                    if !bar.is_finished() {
                        bar.finish_and_clear();
                    }
                }
            }
        }
    }
}
