//! Session lifecycle: capture, inference, timeout, and the generation guard.
//!
//! The controller is driven entirely by its host. Every asynchronous
//! completion is delivered through a method that takes the [`Generation`] the
//! work was issued under; completions from an older generation are dropped.

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::classify::{self, MediaError};
use crate::detection::{BlinkDetector, FaceObservation, FrameEvaluator, FrameOutcome};
use crate::domain::{
    BlinkState, BoundingBox, Generation, LandmarkSet, LivenessConfig, LivenessError,
    LivenessErrorCode, PhaseTransition, SessionPhase, SessionSnapshot,
};
use crate::ports::{
    AssetLocator, CaptureRequest, CaptureSource, CdnAssetLocator, LandmarkInference, PlayOutcome,
    SessionEvent, SessionObserver, StartOutcome, Timer, TimerId,
};

/// Drives one liveness session over frames of type `F`.
pub struct SessionController<F> {
    config: LivenessConfig,
    capture: Box<dyn CaptureSource>,
    inference: Box<dyn LandmarkInference<F>>,
    timer: Box<dyn Timer>,
    assets: Box<dyn AssetLocator>,
    observers: Vec<Arc<dyn SessionObserver>>,
    generation: Generation,
    phase: SessionPhase,
    blink: BlinkState,
    pending_timeout: Option<TimerId>,
    face_ever_detected: bool,
    multiple_faces_reported: bool,
    success_notified: bool,
    capture_active: bool,
    torn_down: bool,
}

impl<F> SessionController<F> {
    /// Creates an unstarted controller. Assets resolve against the public CDN
    /// until [`with_asset_locator`](Self::with_asset_locator) replaces it.
    #[must_use]
    pub fn new(
        config: LivenessConfig,
        capture: Box<dyn CaptureSource>,
        inference: Box<dyn LandmarkInference<F>>,
        timer: Box<dyn Timer>,
    ) -> Self {
        Self {
            config,
            capture,
            inference,
            timer,
            assets: Box::new(CdnAssetLocator::default()),
            observers: Vec::new(),
            generation: Generation::default(),
            phase: SessionPhase::Unstarted,
            blink: BlinkState::default(),
            pending_timeout: None,
            face_ever_detected: false,
            multiple_faces_reported: false,
            success_notified: false,
            capture_active: false,
            torn_down: false,
        }
    }

    /// Replaces the asset locator handed to the model.
    #[must_use]
    pub fn with_asset_locator(mut self, assets: Box<dyn AssetLocator>) -> Self {
        self.assets = assets;
        self
    }

    /// Attaches an observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Attaches an observer to a controller already in use.
    pub fn add_observer(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &LivenessConfig {
        &self.config
    }

    /// Replaces the configuration.
    ///
    /// Blink requirement and thresholds apply from the next frame; camera and
    /// face-mesh settings from the next attempt.
    pub fn set_config(&mut self, config: LivenessConfig) {
        debug!(required_blinks = config.required_blinks, "Configuration replaced");
        self.config = config;
    }

    /// Current attempt.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Observable state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(&self.phase, &self.blink, self.generation)
    }

    /// Begins a new attempt. Does nothing unless the session is unstarted.
    pub fn start(&mut self) {
        if !matches!(self.phase, SessionPhase::Unstarted) {
            debug!(phase = ?self.phase.kind(), "start() ignored, session already started");
            return;
        }
        self.torn_down = false;
        self.generation = self.generation.next();
        self.blink.reset();
        self.face_ever_detected = false;
        self.multiple_faces_reported = false;
        self.success_notified = false;

        if !self.capture.is_supported() {
            self.fail(LivenessError::from_code(LivenessErrorCode::NotAllowed));
            return;
        }

        self.transition(PhaseTransition::Begin);

        let generation = self.generation;
        info!(%generation, "Starting liveness session");
        self.emit(&SessionEvent::Starting { generation });

        let mut options = self.config.face_mesh;
        options.refine_landmarks = true;
        if let Err(e) = self.inference.configure(&options, self.assets.as_ref()) {
            self.fail(LivenessError::new(
                LivenessErrorCode::ModelLoadFailed,
                format!("{e:#}"),
            ));
            return;
        }

        let request = CaptureRequest {
            camera: self.config.camera,
            generation,
        };
        self.capture_active = true;
        match self.capture.start(&request) {
            StartOutcome::Started => self.capture_started(generation, Ok(())),
            StartOutcome::Pending => trace!(%generation, "Capture start pending"),
            StartOutcome::Failed(err) => self.capture_started(generation, Err(err)),
        }
    }

    /// Completes a capture start issued under `generation`.
    pub fn capture_started(&mut self, generation: Generation, result: Result<(), MediaError>) {
        if self.is_stale(generation, "capture start") {
            return;
        }
        if !matches!(self.phase, SessionPhase::Starting) {
            debug!(phase = ?self.phase.kind(), "Capture start completion ignored");
            return;
        }

        if let Err(err) = result {
            debug!(name = %err.name, "Capture failed to start");
            self.fail(classify::to_liveness_error(&err));
            return;
        }

        self.transition(PhaseTransition::CaptureReady);
        info!(%generation, "Capture ready");
        self.emit(&SessionEvent::Ready);

        self.cancel_timeout();
        if let Some(delay) = self.config.face_detection_timeout() {
            debug!(?delay, "Arming face-detection timeout");
            self.pending_timeout = Some(self.timer.schedule(delay, generation));
        }

        match self.capture.play(generation) {
            PlayOutcome::Playing => {}
            PlayOutcome::Pending => trace!(%generation, "Playback start pending"),
            PlayOutcome::Failed(reason) => self.playback_started(generation, Err(reason)),
        }
    }

    /// Completes a playback start issued under `generation`.
    pub fn playback_started(&mut self, generation: Generation, result: Result<(), String>) {
        if self.is_stale(generation, "playback start") {
            return;
        }
        if let Err(reason) = result {
            self.fail(LivenessError::new(LivenessErrorCode::PlayFailed, reason));
        }
    }

    /// Runs inference on a frame captured under `generation` and applies the result.
    pub fn on_frame(&mut self, generation: Generation, frame: &F) {
        if self.is_stale(generation, "frame") || !self.phase.accepts_frames() {
            return;
        }
        let result = self.inference.infer(frame);
        self.inference_completed(generation, result);
    }

    /// Applies an inference result for a frame captured under `generation`.
    pub fn inference_completed(
        &mut self,
        generation: Generation,
        result: anyhow::Result<Vec<LandmarkSet>>,
    ) {
        if self.is_stale(generation, "inference result") {
            return;
        }
        if !self.phase.accepts_frames() {
            trace!(phase = ?self.phase.kind(), "Dropping inference result");
            return;
        }

        let faces = match result {
            Ok(faces) => faces,
            Err(e) if matches!(self.phase, SessionPhase::Passed { .. }) => {
                warn!(error = %format!("{e:#}"), "Inference failed after pass");
                self.set_face(None);
                return;
            }
            Err(e) => {
                self.fail(LivenessError::new(
                    LivenessErrorCode::ModelLoadFailed,
                    format!("{e:#}"),
                ));
                return;
            }
        };

        let evaluator = FrameEvaluator::new(BlinkDetector::new(self.config.blink));
        let outcome = evaluator.evaluate(
            &faces,
            self.blink,
            self.config.required_blinks,
            self.multiple_faces_reported,
        );
        self.apply(outcome);
    }

    /// Handles the face-detection timeout scheduled under `generation`.
    pub fn timeout_elapsed(&mut self, generation: Generation) {
        if self.is_stale(generation, "timeout") {
            return;
        }
        self.pending_timeout = None;
        if self.face_ever_detected {
            debug!("Timeout elapsed after a face was seen");
            return;
        }
        self.fail(LivenessError::from_code(LivenessErrorCode::FaceNotDetected));
    }

    /// Abandons the current attempt and starts a new one.
    pub fn retry(&mut self) {
        info!(generation = %self.generation, "Retrying liveness session");
        self.emit(&SessionEvent::Retrying);
        self.cancel_timeout();
        self.stop_capture();
        self.transition(PhaseTransition::Reset);
        self.start();
    }

    /// Stops capture, cancels the timeout, and invalidates in-flight work.
    ///
    /// A failed or passed session keeps its phase so it can still be reported.
    /// Calling this again has no effect.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.cancel_timeout();
        self.stop_capture();
        self.generation = self.generation.next();
        if !self.phase.is_terminal() {
            self.transition(PhaseTransition::Reset);
        }
        debug!(generation = %self.generation, "Session torn down");
        self.emit(&SessionEvent::Stopped);
    }

    fn apply(&mut self, outcome: FrameOutcome) {
        if let FaceObservation::Single { .. } = outcome.observation {
            if !self.face_ever_detected {
                debug!("First face detected");
            }
            self.face_ever_detected = true;
            self.cancel_timeout();
        }
        self.set_face(outcome.observation.bbox());

        if outcome.raise_multiple_faces {
            self.multiple_faces_reported = true;
            if matches!(self.phase, SessionPhase::Passed { .. }) {
                warn!("Multiple faces after pass");
            } else {
                self.fail(LivenessError::from_code(LivenessErrorCode::MultipleFaces));
            }
            return;
        }

        let previous = std::mem::replace(&mut self.blink, outcome.blink);
        if self.blink.blink_count > previous.blink_count {
            debug!(count = self.blink.blink_count, "Blink");
            self.emit(&SessionEvent::Blink {
                count: self.blink.blink_count,
            });
        }

        if self.blink.passed && !self.success_notified {
            self.success_notified = true;
            self.transition(PhaseTransition::Pass);
            info!(blink_count = self.blink.blink_count, "Liveness passed");
            self.emit(&SessionEvent::Passed {
                blink_count: self.blink.blink_count,
            });
        }
    }

    fn set_face(&mut self, face: Option<BoundingBox>) {
        let had_face = self.phase.face().is_some();
        if !self.transition(PhaseTransition::Face(face)) {
            return;
        }
        match (had_face, face) {
            (false, Some(bbox)) => self.emit(&SessionEvent::FaceDetected { bbox }),
            (true, None) => self.emit(&SessionEvent::FaceLost),
            _ => {}
        }
    }

    fn fail(&mut self, error: LivenessError) {
        let Some(next) = self.phase.next(PhaseTransition::Fail(error.clone())) else {
            debug!(code = %error.code, phase = ?self.phase.kind(), "Error ignored");
            return;
        };
        warn!(code = %error.code, message = %error.message, generation = %self.generation, "Liveness attempt failed");
        self.cancel_timeout();
        self.stop_capture();
        self.phase = next;
        self.emit(&SessionEvent::Failed { error });
    }

    fn transition(&mut self, transition: PhaseTransition) -> bool {
        match self.phase.next(transition) {
            Some(next) => {
                self.phase = next;
                true
            }
            None => {
                trace!(phase = ?self.phase.kind(), "Transition rejected");
                false
            }
        }
    }

    fn is_stale(&self, generation: Generation, what: &str) -> bool {
        if generation == self.generation {
            return false;
        }
        trace!(%generation, current = %self.generation, "Dropping stale {what}");
        true
    }

    fn cancel_timeout(&mut self) {
        if let Some(id) = self.pending_timeout.take() {
            self.timer.cancel(id);
        }
    }

    fn stop_capture(&mut self) {
        if self.capture_active {
            self.capture_active = false;
            self.capture.stop();
        }
    }

    fn emit(&self, event: &SessionEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

impl<F> Drop for SessionController<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}
