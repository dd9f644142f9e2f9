//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Blinks required to pass when not configured.
pub const DEFAULT_REQUIRED_BLINKS: u32 = 2;
/// Default capture width in pixels.
pub const DEFAULT_WIDTH: u32 = 640;
/// Default capture height in pixels.
pub const DEFAULT_HEIGHT: u32 = 480;

/// Camera facing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front-facing camera.
    #[default]
    User,
    /// Rear-facing camera.
    Environment,
}

/// Capture constraints handed to the capture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Which camera to open.
    pub facing_mode: FacingMode,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            facing_mode: FacingMode::User,
        }
    }
}

/// Options handed to the landmark inference service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceMeshOptions {
    /// Maximum faces the model reports.
    pub max_num_faces: u32,
    /// Always true: iris-refined landmarks are requested.
    pub refine_landmarks: bool,
    /// Minimum detection confidence (0.0-1.0).
    pub min_detection_confidence: f64,
    /// Minimum tracking confidence (0.0-1.0).
    pub min_tracking_confidence: f64,
}

impl Default for FaceMeshOptions {
    fn default() -> Self {
        Self {
            max_num_faces: 1,
            refine_landmarks: true,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.7,
        }
    }
}

/// EAR thresholds for the blink hysteresis band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkThresholds {
    /// Eyes count as closed below this EAR.
    pub close: f64,
    /// Closed eyes count as reopened above this EAR.
    pub open: f64,
}

impl Default for BlinkThresholds {
    fn default() -> Self {
        Self {
            close: 0.20,
            open: 0.25,
        }
    }
}

/// Configuration for a liveness session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    /// Blinks required to pass.
    pub required_blinks: u32,
    /// Capture constraints.
    pub camera: CameraConfig,
    /// Landmark model options.
    pub face_mesh: FaceMeshOptions,
    /// Milliseconds to wait for a first face before failing. 0 disables.
    pub face_detection_timeout_ms: u64,
    /// Blink hysteresis band.
    pub blink: BlinkThresholds,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            required_blinks: DEFAULT_REQUIRED_BLINKS,
            camera: CameraConfig::default(),
            face_mesh: FaceMeshOptions::default(),
            face_detection_timeout_ms: 0,
            blink: BlinkThresholds::default(),
        }
    }
}

impl LivenessConfig {
    /// Sets the number of blinks required to pass.
    #[must_use]
    pub fn with_required_blinks(mut self, blinks: u32) -> Self {
        self.required_blinks = blinks;
        self
    }

    /// Sets the face-detection timeout. Zero disables it; any non-zero
    /// duration is rounded up to whole milliseconds.
    #[must_use]
    pub fn with_face_detection_timeout(mut self, timeout: Duration) -> Self {
        let mut ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        if timeout.subsec_nanos() % 1_000_000 != 0 {
            ms = ms.saturating_add(1);
        }
        self.face_detection_timeout_ms = ms;
        self
    }

    /// Sets the blink hysteresis band.
    #[must_use]
    pub fn with_blink_thresholds(mut self, blink: BlinkThresholds) -> Self {
        self.blink = blink;
        self
    }

    /// The face-detection timeout, if enabled.
    #[must_use]
    pub const fn face_detection_timeout(&self) -> Option<Duration> {
        if self.face_detection_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.face_detection_timeout_ms))
        }
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        let fm = &self.face_mesh;
        if !(0.0..=1.0).contains(&fm.min_detection_confidence) {
            return Err(format!(
                "face_mesh.min_detection_confidence must be 0.0-1.0, got {}",
                fm.min_detection_confidence
            ));
        }
        if !(0.0..=1.0).contains(&fm.min_tracking_confidence) {
            return Err(format!(
                "face_mesh.min_tracking_confidence must be 0.0-1.0, got {}",
                fm.min_tracking_confidence
            ));
        }
        if fm.max_num_faces == 0 {
            return Err("face_mesh.max_num_faces must be at least 1".to_string());
        }
        if self.blink.close >= self.blink.open {
            return Err(format!(
                "blink.close_threshold ({}) must be below blink.open_threshold ({})",
                self.blink.close, self.blink.open
            ));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(format!(
                "camera resolution must be non-zero, got {}x{}",
                self.camera.width, self.camera.height
            ));
        }
        Ok(())
    }
}
