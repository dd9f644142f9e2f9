//! Configuration file support for liveness.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/liveness/config.toml` (lowest priority)
//! - Project-local: `.liveness.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Session settings.
    pub session: SessionConfig,
    /// Capture settings.
    pub camera: CameraConfig,
    /// Landmark model settings.
    pub face_mesh: FaceMeshConfig,
    /// Blink hysteresis band.
    pub blink: BlinkConfig,
    /// Asset location settings.
    pub assets: AssetsConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// Session configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Blinks required to pass.
    pub required_blinks: Option<u32>,
    /// Face-detection timeout in milliseconds (0 disables).
    pub face_detection_timeout_ms: Option<u64>,
}

/// Capture configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Requested width in pixels.
    pub width: Option<u32>,
    /// Requested height in pixels.
    pub height: Option<u32>,
    /// "user" or "environment".
    pub facing_mode: Option<String>,
}

/// Landmark model configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FaceMeshConfig {
    /// Maximum faces the model reports.
    pub max_num_faces: Option<u32>,
    /// Minimum detection confidence (0.0-1.0).
    pub min_detection_confidence: Option<f64>,
    /// Minimum tracking confidence (0.0-1.0).
    pub min_tracking_confidence: Option<f64>,
}

/// Blink hysteresis configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// EAR below which the eye counts as closed.
    pub close_threshold: Option<f64>,
    /// EAR above which a closed eye counts as reopened.
    pub open_threshold: Option<f64>,
}

/// Asset location configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Base URL assets resolve against.
    pub base_url: Option<String>,
    /// Local assets directory (wins over `base_url`).
    pub dir: Option<PathBuf>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress spinner.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/liveness/config.toml`
    /// 2. Project-local: `.liveness.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are reported as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), String> {
        if self.session.required_blinks == Some(0) {
            return Err("session.required_blinks must be at least 1".to_string());
        }

        if self.camera.width == Some(0) || self.camera.height == Some(0) {
            return Err("camera.width and camera.height must be non-zero".to_string());
        }
        if let Some(ref mode) = self.camera.facing_mode {
            if mode != "user" && mode != "environment" {
                return Err(format!(
                    "camera.facing_mode must be 'user' or 'environment', got '{mode}'"
                ));
            }
        }

        if self.face_mesh.max_num_faces == Some(0) {
            return Err("face_mesh.max_num_faces must be at least 1".to_string());
        }
        for (name, value) in [
            (
                "face_mesh.min_detection_confidence",
                self.face_mesh.min_detection_confidence,
            ),
            (
                "face_mesh.min_tracking_confidence",
                self.face_mesh.min_tracking_confidence,
            ),
            ("blink.close_threshold", self.blink.close_threshold),
            ("blink.open_threshold", self.blink.open_threshold),
        ] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(format!("{name} must be 0.0-1.0, got {v}"));
                }
            }
        }
        if let (Some(close), Some(open)) = (self.blink.close_threshold, self.blink.open_threshold) {
            if close >= open {
                return Err(format!(
                    "blink.close_threshold ({close}) must be below blink.open_threshold ({open})"
                ));
            }
        }

        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                return Err(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // Session
        self.session.required_blinks = other.session.required_blinks.or(self.session.required_blinks);
        self.session.face_detection_timeout_ms = other
            .session
            .face_detection_timeout_ms
            .or(self.session.face_detection_timeout_ms);

        // Camera
        self.camera.width = other.camera.width.or(self.camera.width);
        self.camera.height = other.camera.height.or(self.camera.height);
        self.camera.facing_mode = other
            .camera
            .facing_mode
            .or_else(|| self.camera.facing_mode.take());

        // Face mesh
        self.face_mesh.max_num_faces = other.face_mesh.max_num_faces.or(self.face_mesh.max_num_faces);
        self.face_mesh.min_detection_confidence = other
            .face_mesh
            .min_detection_confidence
            .or(self.face_mesh.min_detection_confidence);
        self.face_mesh.min_tracking_confidence = other
            .face_mesh
            .min_tracking_confidence
            .or(self.face_mesh.min_tracking_confidence);

        // Blink
        self.blink.close_threshold = other.blink.close_threshold.or(self.blink.close_threshold);
        self.blink.open_threshold = other.blink.open_threshold.or(self.blink.open_threshold);

        // Assets
        self.assets.base_url = other.assets.base_url.or_else(|| self.assets.base_url.take());
        self.assets.dir = other.assets.dir.or_else(|| self.assets.dir.take());

        // Output
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("liveness").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.liveness.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".liveness.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
