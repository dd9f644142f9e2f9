//! Mock implementations of core port traits.
//!
//! Every mock is `Clone` and shares its recorded state between clones, so a
//! test can hand one clone to a `SessionController` and assert on another.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use liveness_core::classify::MediaError;
use liveness_core::domain::{FaceMeshOptions, Generation, LandmarkSet, LivenessError};
use liveness_core::ports::{
    AssetLocator, CaptureRequest, CaptureSource, LandmarkInference, PlayOutcome, SessionEvent,
    SessionObserver, StartOutcome, Timer, TimerId,
};

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct CaptureLog {
    requests: Vec<CaptureRequest>,
    plays: Vec<Generation>,
    stops: usize,
}

/// Mock implementation of `CaptureSource` for testing.
///
/// Starts and plays immediately unless told otherwise, and records every call.
#[derive(Debug, Clone)]
pub struct MockCaptureSource {
    supported: Arc<AtomicBool>,
    start_outcome: StartOutcome,
    play_outcome: PlayOutcome,
    log: Arc<Mutex<CaptureLog>>,
}

impl MockCaptureSource {
    /// Creates a source that starts and plays immediately.
    #[must_use]
    pub fn new() -> Self {
        Self {
            supported: Arc::new(AtomicBool::new(true)),
            start_outcome: StartOutcome::Started,
            play_outcome: PlayOutcome::Playing,
            log: Arc::default(),
        }
    }

    /// Creates a source for an environment without capture support.
    #[must_use]
    pub fn unsupported() -> Self {
        let source = Self::new();
        source.set_supported(false);
        source
    }

    /// Switches capture support on or off for every clone.
    pub fn set_supported(&self, supported: bool) {
        self.supported.store(supported, Ordering::SeqCst);
    }

    /// Makes `start` fail with the given media error.
    #[must_use]
    pub fn failing_start(name: &str, message: &str) -> Self {
        Self::new().with_start_outcome(StartOutcome::Failed(MediaError::new(name, message)))
    }

    /// Sets what `start` returns.
    #[must_use]
    pub fn with_start_outcome(mut self, outcome: StartOutcome) -> Self {
        self.start_outcome = outcome;
        self
    }

    /// Sets what `play` returns.
    #[must_use]
    pub fn with_play_outcome(mut self, outcome: PlayOutcome) -> Self {
        self.play_outcome = outcome;
        self
    }

    /// Returns every start request received.
    #[must_use]
    pub fn requests(&self) -> Vec<CaptureRequest> {
        lock(&self.log).requests.clone()
    }

    /// Returns the number of `start` calls.
    #[must_use]
    pub fn start_count(&self) -> usize {
        lock(&self.log).requests.len()
    }

    /// Returns the number of `play` calls.
    #[must_use]
    pub fn play_count(&self) -> usize {
        lock(&self.log).plays.len()
    }

    /// Returns the number of `stop` calls.
    #[must_use]
    pub fn stop_count(&self) -> usize {
        lock(&self.log).stops
    }
}

impl Default for MockCaptureSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSource for MockCaptureSource {
    fn is_supported(&self) -> bool {
        self.supported.load(Ordering::SeqCst)
    }

    fn start(&self, request: &CaptureRequest) -> StartOutcome {
        lock(&self.log).requests.push(*request);
        self.start_outcome.clone()
    }

    fn play(&self, generation: Generation) -> PlayOutcome {
        lock(&self.log).plays.push(generation);
        self.play_outcome.clone()
    }

    fn stop(&self) {
        lock(&self.log).stops += 1;
    }
}

#[derive(Debug, Default)]
struct InferenceState {
    script: VecDeque<Result<Vec<LandmarkSet>, String>>,
    configured: Vec<(FaceMeshOptions, String)>,
    infer_calls: usize,
}

/// Mock implementation of `LandmarkInference` for testing.
///
/// Returns scripted results in order; once the script runs out, every frame
/// yields no faces.
#[derive(Debug, Clone, Default)]
pub struct MockInference {
    configure_error: Option<String>,
    state: Arc<Mutex<InferenceState>>,
}

impl MockInference {
    /// Creates a mock with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `configure` fail.
    #[must_use]
    pub fn failing_configure(message: &str) -> Self {
        Self {
            configure_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Queues a successful result.
    pub fn push_faces(&self, faces: Vec<LandmarkSet>) {
        lock(&self.state).script.push_back(Ok(faces));
    }

    /// Queues a failure.
    pub fn push_error(&self, message: &str) {
        lock(&self.state).script.push_back(Err(message.to_string()));
    }

    /// Returns the options of every `configure` call, with the location the
    /// locator resolved for `face_mesh.binarypb`.
    #[must_use]
    pub fn configured(&self) -> Vec<(FaceMeshOptions, String)> {
        lock(&self.state).configured.clone()
    }

    /// Returns the number of `infer` calls.
    #[must_use]
    pub fn infer_count(&self) -> usize {
        lock(&self.state).infer_calls
    }
}

impl<F> LandmarkInference<F> for MockInference {
    fn configure(&self, options: &FaceMeshOptions, assets: &dyn AssetLocator) -> anyhow::Result<()> {
        lock(&self.state)
            .configured
            .push((*options, assets.locate("face_mesh.binarypb")));
        match &self.configure_error {
            Some(message) => Err(anyhow::anyhow!("{message}")),
            None => Ok(()),
        }
    }

    fn infer(&self, _frame: &F) -> anyhow::Result<Vec<LandmarkSet>> {
        let mut state = lock(&self.state);
        state.infer_calls += 1;
        match state.script.pop_front() {
            Some(Ok(faces)) => Ok(faces),
            Some(Err(message)) => Err(anyhow::anyhow!("{message}")),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Debug, Default)]
struct TimerLog {
    next_id: u64,
    scheduled: Vec<(TimerId, Duration, Generation)>,
    cancelled: Vec<TimerId>,
}

/// Mock implementation of `Timer` for testing.
///
/// Never fires on its own; tests fire timeouts by calling the controller.
#[derive(Debug, Clone, Default)]
pub struct MockTimer {
    log: Arc<Mutex<TimerLog>>,
}

impl MockTimer {
    /// Creates a new mock timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every scheduled timeout.
    #[must_use]
    pub fn scheduled(&self) -> Vec<(TimerId, Duration, Generation)> {
        lock(&self.log).scheduled.clone()
    }

    /// Returns every cancelled id.
    #[must_use]
    pub fn cancelled(&self) -> Vec<TimerId> {
        lock(&self.log).cancelled.clone()
    }

    /// Returns scheduled timeouts that have not been cancelled.
    #[must_use]
    pub fn pending(&self) -> Vec<(TimerId, Duration, Generation)> {
        let log = lock(&self.log);
        log.scheduled
            .iter()
            .filter(|(id, _, _)| !log.cancelled.contains(id))
            .copied()
            .collect()
    }
}

impl Timer for MockTimer {
    fn schedule(&self, delay: Duration, generation: Generation) -> TimerId {
        let mut log = lock(&self.log);
        log.next_id += 1;
        let id = TimerId(log.next_id);
        log.scheduled.push((id, delay, generation));
        id
    }

    fn cancel(&self, id: TimerId) {
        lock(&self.log).cancelled.push(id);
    }
}

/// Mock implementation of `SessionObserver` for testing.
///
/// Captures events for later assertions.
#[derive(Debug, Clone, Default)]
pub struct MockObserver {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl MockObserver {
    /// Creates a new mock observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<SessionEvent> {
        lock(&self.events).clone()
    }

    /// Returns the number of `Passed` events.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SessionEvent::Passed { .. }))
            .count()
    }

    /// Returns every reported error, in order.
    #[must_use]
    pub fn errors(&self) -> Vec<LivenessError> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::Failed { error } => Some(error),
                _ => None,
            })
            .collect()
    }

    /// Returns the counts carried by `Blink` events.
    #[must_use]
    pub fn blink_counts(&self) -> Vec<u32> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Blink { count } => Some(*count),
                _ => None,
            })
            .collect()
    }
}

impl SessionObserver for MockObserver {
    fn on_event(&self, event: &SessionEvent) {
        lock(&self.events).push(event.clone());
    }
}
