//! Session controller integration tests using mock ports.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::sync::Arc;
use std::time::Duration;

use liveness_core::domain::{
    Generation, LandmarkSet, LivenessConfig, LivenessErrorCode, PhaseKind,
};
use liveness_core::ports::{PlayOutcome, SessionEvent, StartOutcome};
use liveness_core::SessionController;
use liveness_test_support::{
    MockCaptureSource, MockInference, MockObserver, MockTimer, SyntheticFaceBuilder,
};

struct Harness {
    session: SessionController<()>,
    capture: MockCaptureSource,
    inference: MockInference,
    timer: MockTimer,
    observer: Arc<MockObserver>,
}

impl Harness {
    fn new(config: LivenessConfig) -> Self {
        Self::with_parts(config, MockCaptureSource::new(), MockInference::new())
    }

    fn with_parts(
        config: LivenessConfig,
        capture: MockCaptureSource,
        inference: MockInference,
    ) -> Self {
        let timer = MockTimer::new();
        let observer = Arc::new(MockObserver::new());
        let session = SessionController::new(
            config,
            Box::new(capture.clone()),
            Box::new(inference.clone()),
            Box::new(timer.clone()),
        )
        .with_observer(observer.clone());
        Self {
            session,
            capture,
            inference,
            timer,
            observer,
        }
    }

    fn started(config: LivenessConfig) -> Self {
        let mut h = Self::new(config);
        h.session.start();
        h
    }

    fn feed(&mut self, faces: Vec<LandmarkSet>) {
        self.inference.push_faces(faces);
        let generation = self.session.generation();
        self.session.on_frame(generation, &());
    }

    fn feed_all(&mut self, frames: Vec<LandmarkSet>) {
        for face in frames {
            self.feed(vec![face]);
        }
    }
}

fn config(required_blinks: u32) -> LivenessConfig {
    LivenessConfig::default().with_required_blinks(required_blinks)
}

// === Lifecycle ===

#[test]
fn test_start_reaches_active() {
    let h = Harness::started(LivenessConfig::default());

    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.phase, PhaseKind::Active);
    assert!(snapshot.is_ready);
    assert!(!snapshot.is_face_detected);
    assert_eq!(h.session.generation(), Generation::new(1));

    let requests = h.capture.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].generation, Generation::new(1));
    assert_eq!(requests[0].camera.width, 640);
    assert_eq!(h.capture.play_count(), 1);

    let configured = h.inference.configured();
    assert_eq!(configured.len(), 1);
    assert!(configured[0].0.refine_landmarks);
    assert_eq!(
        configured[0].1,
        "https://cdn.jsdelivr.net/npm/@mediapipe/face_mesh/face_mesh.binarypb"
    );

    assert_eq!(
        h.observer.events()[..2].to_vec(),
        vec![
            SessionEvent::Starting {
                generation: Generation::new(1)
            },
            SessionEvent::Ready
        ]
    );
}

#[test]
fn test_start_twice_is_noop() {
    let mut h = Harness::started(LivenessConfig::default());
    h.session.start();
    assert_eq!(h.capture.start_count(), 1);
    assert_eq!(h.session.generation(), Generation::new(1));
}

#[test]
fn test_pending_start_completes_later() {
    let capture = MockCaptureSource::new().with_start_outcome(StartOutcome::Pending);
    let mut h = Harness::with_parts(LivenessConfig::default(), capture, MockInference::new());
    h.session.start();
    assert_eq!(h.session.snapshot().phase, PhaseKind::Starting);
    assert_eq!(h.capture.play_count(), 0);

    // Frames before capture is up are dropped
    h.feed(vec![SyntheticFaceBuilder::open()]);
    assert_eq!(h.inference.infer_count(), 0);

    let generation = h.session.generation();
    h.session.capture_started(generation, Ok(()));
    assert_eq!(h.session.snapshot().phase, PhaseKind::Active);
    assert_eq!(h.capture.play_count(), 1);
}

#[test]
fn test_custom_asset_locator() {
    let inference = MockInference::new();
    let mut session: SessionController<()> = SessionController::new(
        LivenessConfig::default(),
        Box::new(MockCaptureSource::new()),
        Box::new(inference.clone()),
        Box::new(MockTimer::new()),
    )
    .with_asset_locator(Box::new(|file: &str| format!("/models/{file}")));
    session.start();

    assert_eq!(inference.configured()[0].1, "/models/face_mesh.binarypb");
}

// === Frame evaluation ===

#[test]
fn test_blink_passes_and_keeps_capture_running() {
    let mut h = Harness::started(config(1));
    h.feed_all(SyntheticFaceBuilder::new().blink_frames(1));

    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.phase, PhaseKind::Passed);
    assert!(snapshot.passed);
    assert_eq!(snapshot.blink_count, 1);
    assert!(snapshot.is_face_detected);
    assert_eq!(h.observer.success_count(), 1);
    assert_eq!(h.capture.stop_count(), 0);
}

#[test]
fn test_success_fires_once() {
    let mut h = Harness::started(config(1));
    h.feed_all(SyntheticFaceBuilder::new().blink_frames(3));

    assert_eq!(h.session.snapshot().blink_count, 3);
    assert_eq!(h.observer.blink_counts(), vec![1, 2, 3]);
    assert_eq!(h.observer.success_count(), 1);
}

#[test]
fn test_two_blinks_required_by_default() {
    let mut h = Harness::started(LivenessConfig::default());
    h.feed_all(SyntheticFaceBuilder::new().blink_frames(1));
    assert!(!h.session.snapshot().passed);

    h.feed(vec![SyntheticFaceBuilder::closed()]);
    h.feed(vec![SyntheticFaceBuilder::open()]);
    assert!(h.session.snapshot().passed);
}

#[test]
fn test_off_center_face_never_blinks() {
    let mut h = Harness::started(config(1));
    h.feed_all(SyntheticFaceBuilder::new().with_nose(0.9, 0.5).blink_frames(1));

    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.blink_count, 0);
    assert!(!snapshot.passed);
    assert!(snapshot.is_face_detected);
}

#[test]
fn test_bounding_box_envelope() {
    let mut h = Harness::started(LivenessConfig::default());
    h.feed(vec![SyntheticFaceBuilder::spread(&[0.2, 0.4, 0.6], &[0.1, 0.5, 0.9])]);

    let bbox = h.session.snapshot().face_bounding_box.unwrap();
    assert!((bbox.x - 0.2).abs() < 1e-9);
    assert!((bbox.y - 0.1).abs() < 1e-9);
    assert!((bbox.width - 0.4).abs() < 1e-9);
    assert!((bbox.height - 0.8).abs() < 1e-9);
}

#[test]
fn test_incomplete_face_is_not_detected() {
    let mut h = Harness::started(LivenessConfig::default());
    h.feed(vec![SyntheticFaceBuilder::new().with_landmark_count(467).build()]);

    let snapshot = h.session.snapshot();
    assert!(!snapshot.is_face_detected);
    assert!(snapshot.error.is_none());
}

#[test]
fn test_face_lost_clears_presence() {
    let mut h = Harness::started(LivenessConfig::default());
    h.feed(vec![SyntheticFaceBuilder::open()]);
    assert!(h.session.snapshot().is_face_detected);
    h.feed(vec![]);

    let snapshot = h.session.snapshot();
    assert!(!snapshot.is_face_detected);
    assert!(snapshot.face_bounding_box.is_none());
    assert!(h.observer.events().contains(&SessionEvent::FaceLost));
}

#[test]
fn test_multiple_faces_raises_one_error() {
    let mut h = Harness::started(LivenessConfig::default());
    h.feed(vec![SyntheticFaceBuilder::open()]);
    for _ in 0..3 {
        h.feed(vec![SyntheticFaceBuilder::open(), SyntheticFaceBuilder::open()]);
    }

    let snapshot = h.session.snapshot();
    assert!(!snapshot.is_face_detected);
    assert!(snapshot.face_bounding_box.is_none());
    assert_eq!(snapshot.phase, PhaseKind::Error);

    let errors = h.observer.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, LivenessErrorCode::MultipleFaces);
    assert_eq!(errors[0].message, "Only one face should be visible");
    assert_eq!(h.capture.stop_count(), 1);
}

#[test]
fn test_multiple_faces_after_pass_is_not_an_error() {
    let mut h = Harness::started(config(1));
    h.feed_all(SyntheticFaceBuilder::new().blink_frames(1));
    h.feed(vec![SyntheticFaceBuilder::open(), SyntheticFaceBuilder::open()]);

    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.phase, PhaseKind::Passed);
    assert!(!snapshot.is_face_detected);
    assert!(h.observer.errors().is_empty());
}

#[test]
fn test_required_blinks_read_per_frame() {
    let mut h = Harness::started(config(3));
    h.feed_all(SyntheticFaceBuilder::new().blink_frames(1));
    assert!(!h.session.snapshot().passed);

    h.session.set_config(config(2));
    h.feed(vec![SyntheticFaceBuilder::closed()]);
    h.feed(vec![SyntheticFaceBuilder::open()]);
    assert!(h.session.snapshot().passed);
}

// === Errors ===

#[test]
fn test_unsupported_environment() {
    let mut h = Harness::with_parts(
        LivenessConfig::default(),
        MockCaptureSource::unsupported(),
        MockInference::new(),
    );
    h.session.start();

    let error = h.session.snapshot().error.unwrap();
    assert_eq!(error.code, LivenessErrorCode::NotAllowed);
    assert_eq!(error.message, "Camera not supported in this environment");
    assert_eq!(h.capture.start_count(), 0);
    assert!(h.inference.configured().is_empty());
    assert_eq!(h.session.generation(), Generation::new(1));
}

#[test]
fn test_retry_into_unsupported_environment_resets_attempt() {
    let mut h = Harness::started(config(1));
    h.feed_all(SyntheticFaceBuilder::new().blink_frames(1));
    assert!(h.session.snapshot().passed);
    let before = h.session.generation();

    h.capture.set_supported(false);
    h.session.retry();

    let snapshot = h.session.snapshot();
    assert_eq!(h.session.generation(), before.next());
    assert_eq!(snapshot.phase, PhaseKind::Error);
    assert_eq!(snapshot.error.unwrap().code, LivenessErrorCode::NotAllowed);
    assert!(!snapshot.passed);
    assert_eq!(snapshot.blink_count, 0);
    assert!(!snapshot.is_face_detected);
    assert_eq!(h.capture.start_count(), 1);
}

#[test]
fn test_capture_failure_is_classified() {
    let capture = MockCaptureSource::failing_start("NotReadableError", "Device busy");
    let mut h = Harness::with_parts(LivenessConfig::default(), capture, MockInference::new());
    h.session.start();

    let error = h.session.snapshot().error.unwrap();
    assert_eq!(error.code, LivenessErrorCode::CameraInUse);
    assert_eq!(error.message, "Device busy");
    assert!(!h.session.snapshot().is_ready);
}

#[test]
fn test_capture_failure_without_message() {
    let capture = MockCaptureSource::failing_start("NotAllowedError", "");
    let mut h = Harness::with_parts(LivenessConfig::default(), capture, MockInference::new());
    h.session.start();

    let error = h.session.snapshot().error.unwrap();
    assert_eq!(error.code, LivenessErrorCode::PermissionDenied);
    assert_eq!(error.message, "Camera failed to start");
}

#[test]
fn test_play_failure() {
    let capture = MockCaptureSource::new()
        .with_play_outcome(PlayOutcome::Failed("autoplay blocked".to_string()));
    let mut h = Harness::with_parts(LivenessConfig::default(), capture, MockInference::new());
    h.session.start();

    let error = h.session.snapshot().error.unwrap();
    assert_eq!(error.code, LivenessErrorCode::PlayFailed);
    assert_eq!(error.message, "autoplay blocked");
    assert_eq!(h.capture.stop_count(), 1);
}

#[test]
fn test_pending_play_failure_uses_default_message() {
    let capture = MockCaptureSource::new().with_play_outcome(PlayOutcome::Pending);
    let mut h = Harness::with_parts(LivenessConfig::default(), capture, MockInference::new());
    h.session.start();
    assert_eq!(h.session.snapshot().phase, PhaseKind::Active);

    let generation = h.session.generation();
    h.session.playback_started(generation, Err(String::new()));

    let error = h.session.snapshot().error.unwrap();
    assert_eq!(error.message, "Video play failed (try allowing autoplay)");
}

#[test]
fn test_inference_failure() {
    let mut h = Harness::started(LivenessConfig::default());
    h.inference.push_error("wasm crashed");
    let generation = h.session.generation();
    h.session.on_frame(generation, &());

    let error = h.session.snapshot().error.unwrap();
    assert_eq!(error.code, LivenessErrorCode::ModelLoadFailed);
    assert_eq!(error.message, "wasm crashed");
    assert_eq!(h.capture.stop_count(), 1);

    // Capture is stopped; further frames are dropped
    h.session.on_frame(generation, &());
    assert_eq!(h.inference.infer_count(), 1);
}

#[test]
fn test_inference_failure_after_pass_is_ignored() {
    let mut h = Harness::started(config(1));
    h.feed_all(SyntheticFaceBuilder::new().blink_frames(1));
    h.inference.push_error("lost context");
    let generation = h.session.generation();
    h.session.on_frame(generation, &());

    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.phase, PhaseKind::Passed);
    assert!(snapshot.error.is_none());
    assert!(!snapshot.is_face_detected);
}

#[test]
fn test_configure_failure() {
    let mut h = Harness::with_parts(
        LivenessConfig::default(),
        MockCaptureSource::new(),
        MockInference::failing_configure("asset 404"),
    );
    h.session.start();

    let error = h.session.snapshot().error.unwrap();
    assert_eq!(error.code, LivenessErrorCode::ModelLoadFailed);
    assert_eq!(h.capture.start_count(), 0);
}

// === Timeout ===

fn timeout_config() -> LivenessConfig {
    LivenessConfig::default().with_face_detection_timeout(Duration::from_millis(30_000))
}

#[test]
fn test_no_timeout_by_default() {
    let h = Harness::started(LivenessConfig::default());
    assert!(h.timer.scheduled().is_empty());
}

#[test]
fn test_timeout_without_face() {
    let mut h = Harness::started(timeout_config());

    let scheduled = h.timer.scheduled();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].1, Duration::from_millis(30_000));
    assert_eq!(scheduled[0].2, h.session.generation());

    h.session.timeout_elapsed(scheduled[0].2);

    let snapshot = h.session.snapshot();
    let error = snapshot.error.unwrap();
    assert_eq!(error.code, LivenessErrorCode::FaceNotDetected);
    assert_eq!(error.message, "No face detected in time");
    assert!(!snapshot.is_ready);
    assert_eq!(h.capture.stop_count(), 1);
}

#[test]
fn test_face_cancels_timeout() {
    let mut h = Harness::started(timeout_config());
    let (id, _, generation) = h.timer.scheduled()[0];

    h.feed(vec![SyntheticFaceBuilder::open()]);
    assert!(h.timer.pending().is_empty());
    assert_eq!(h.timer.cancelled(), vec![id]);

    // A late firing is harmless once a face has been seen
    h.feed(vec![]);
    h.session.timeout_elapsed(generation);
    assert!(h.session.snapshot().error.is_none());
    assert_eq!(h.session.snapshot().phase, PhaseKind::Active);
}

// === Retry and generations ===

#[test]
fn test_stale_results_ignored_after_retry() {
    let mut h = Harness::started(timeout_config());
    let stale = h.session.generation();
    h.session.retry();
    assert_eq!(h.session.generation(), stale.next());

    let before = h.session.snapshot();
    h.session
        .inference_completed(stale, Ok(vec![SyntheticFaceBuilder::open()]));
    h.inference.push_faces(vec![SyntheticFaceBuilder::open()]);
    h.session.on_frame(stale, &());
    h.session.timeout_elapsed(stale);
    h.session.playback_started(stale, Err("late".to_string()));

    assert_eq!(h.session.snapshot(), before);
    assert_eq!(h.inference.infer_count(), 0);
}

#[test]
fn test_retry_resets_attempt() {
    let mut h = Harness::started(config(1));
    h.feed_all(SyntheticFaceBuilder::new().blink_frames(1));
    assert!(h.session.snapshot().passed);

    h.session.retry();
    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.phase, PhaseKind::Active);
    assert_eq!(snapshot.blink_count, 0);
    assert!(!snapshot.passed);
    assert!(!snapshot.is_face_detected);
    assert_eq!(h.capture.start_count(), 2);
    assert_eq!(h.capture.stop_count(), 1);

    h.feed_all(SyntheticFaceBuilder::new().blink_frames(1));
    assert_eq!(h.observer.success_count(), 2);
}

#[test]
fn test_retry_rearms_multiple_faces_latch() {
    let mut h = Harness::started(LivenessConfig::default());
    let pair = || vec![SyntheticFaceBuilder::open(), SyntheticFaceBuilder::open()];
    h.feed(pair());
    h.session.retry();
    assert!(h.session.snapshot().error.is_none());
    h.feed(pair());

    assert_eq!(h.observer.errors().len(), 2);
}

#[test]
fn test_retry_cancels_pending_timeout() {
    let mut h = Harness::started(timeout_config());
    let (first, _, _) = h.timer.scheduled()[0];
    h.session.retry();

    assert!(h.timer.cancelled().contains(&first));
    let pending = h.timer.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].2, Generation::new(2));
}

#[test]
fn test_retry_after_error_recovers() {
    let mut h = Harness::started(timeout_config());
    let generation = h.session.generation();
    h.session.timeout_elapsed(generation);
    assert!(h.session.snapshot().error.is_some());

    h.session.retry();
    let snapshot = h.session.snapshot();
    assert!(snapshot.error.is_none());
    assert!(snapshot.is_ready);
    assert!(h.observer.events().contains(&SessionEvent::Retrying));
}

// === Teardown ===

#[test]
fn test_teardown_is_idempotent() {
    let mut h = Harness::started(timeout_config());
    h.session.teardown();
    h.session.teardown();

    assert_eq!(h.capture.stop_count(), 1);
    assert!(h.timer.pending().is_empty());
    assert_eq!(h.session.generation(), Generation::new(2));
    assert_eq!(h.session.snapshot().phase, PhaseKind::Unstarted);
    let stopped = h
        .observer
        .events()
        .iter()
        .filter(|e| **e == SessionEvent::Stopped)
        .count();
    assert_eq!(stopped, 1);
}

#[test]
fn test_teardown_keeps_terminal_phase() {
    let mut h = Harness::started(config(1));
    h.feed_all(SyntheticFaceBuilder::new().blink_frames(1));
    h.session.teardown();

    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.phase, PhaseKind::Passed);
    assert_eq!(h.capture.stop_count(), 1);
}

#[test]
fn test_drop_tears_down() {
    let h = Harness::started(LivenessConfig::default());
    let capture = h.capture.clone();
    drop(h);
    assert_eq!(capture.stop_count(), 1);
}
