//! Recorded landmark streams stored as JSON Lines.
//!
//! Each line holds one frame: its capture time, every face candidate the model
//! returned, and optionally an inference error that replaces the result.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use liveness_core::classify::MediaError;
use liveness_core::domain::{FaceMeshOptions, Generation, LandmarkSet};
use liveness_core::ports::{
    AssetLocator, CaptureRequest, CaptureSource, LandmarkInference, PlayOutcome, StartOutcome,
    FACE_MESH_ASSETS,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One recorded frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Capture time in milliseconds since the recording started.
    pub t_ms: u64,
    /// Face candidates returned by the model.
    #[serde(default)]
    pub faces: Vec<LandmarkSet>,
    /// Inference failure for this frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordedFrame {
    /// A frame with the given candidates.
    #[must_use]
    pub const fn new(t_ms: u64, faces: Vec<LandmarkSet>) -> Self {
        Self {
            t_ms,
            faces,
            error: None,
        }
    }

    /// A frame whose inference fails.
    #[must_use]
    pub fn failed(t_ms: u64, error: impl Into<String>) -> Self {
        Self {
            t_ms,
            faces: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// A full recorded stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    source: String,
    frames: Vec<RecordedFrame>,
}

impl Recording {
    /// Wraps frames already in memory.
    #[must_use]
    pub fn from_frames(source: impl Into<String>, frames: Vec<RecordedFrame>) -> Self {
        Self {
            source: source.into(),
            frames,
        }
    }

    /// Loads a recording from a `.jsonl` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is not a valid frame.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open recording: {}", path.display()))?;
        let recording = Self::from_reader(path.to_string_lossy(), BufReader::new(file))?;
        debug!(
            "Loaded {} frames from {}",
            recording.frames.len(),
            path.display()
        );
        Ok(recording)
    }

    /// Parses a recording from JSON Lines. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or on the first malformed line.
    pub fn from_reader(source: impl Into<String>, reader: impl BufRead) -> Result<Self> {
        let source = source.into();
        let mut frames: Vec<RecordedFrame> = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line.with_context(|| format!("Failed to read {source}:{line_no}"))?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let frame: RecordedFrame = serde_json::from_str(trimmed)
                .with_context(|| format!("Invalid frame at {source}:{line_no}"))?;
            if let Some(prev) = frames.last() {
                if frame.t_ms < prev.t_ms {
                    warn!(
                        "Timestamp goes backwards at {source}:{line_no} ({} < {})",
                        frame.t_ms, prev.t_ms
                    );
                }
            }
            frames.push(frame);
        }

        Ok(Self { source, frames })
    }

    /// Where the frames came from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All frames in order.
    #[must_use]
    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    /// Timestamp of the last frame.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.frames.last().map_or(0, |f| f.t_ms)
    }

    /// Writes the recording as JSON Lines.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_jsonl(&self, mut writer: impl Write) -> Result<()> {
        for frame in &self.frames {
            let line = serde_json::to_string(frame).context("Failed to serialize frame")?;
            writeln!(writer, "{line}").context("Failed to write frame")?;
        }
        writer.flush().context("Failed to flush recording")?;
        Ok(())
    }
}

/// Capture source standing in for a camera during replay.
///
/// Starts immediately unless built with a simulated failure.
#[derive(Debug, Clone, Default)]
pub struct RecordingCapture {
    failure: Option<MediaError>,
    running: Arc<AtomicBool>,
}

impl RecordingCapture {
    /// Creates a capture source that always starts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a capture source whose start fails with `failure`.
    #[must_use]
    pub fn failing(failure: MediaError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    /// True between a successful start and the next stop.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl CaptureSource for RecordingCapture {
    fn start(&self, request: &CaptureRequest) -> StartOutcome {
        if let Some(failure) = &self.failure {
            debug!("Simulating capture failure: {failure}");
            return StartOutcome::Failed(failure.clone());
        }
        info!(
            "Replaying capture at {}x{} ({:?}), generation {}",
            request.camera.width, request.camera.height, request.camera.facing_mode, request.generation
        );
        self.running.store(true, Ordering::SeqCst);
        StartOutcome::Started
    }

    fn play(&self, _generation: Generation) -> PlayOutcome {
        PlayOutcome::Playing
    }

    fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            debug!("Replay capture stopped");
        }
    }
}

/// Inference that returns what the recording says the model returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedInference {
    verify_local_assets: bool,
}

impl RecordedInference {
    /// Creates an inference adapter that accepts any asset location.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            verify_local_assets: false,
        }
    }

    /// Makes `configure` fail if an asset resolves to a local path that does
    /// not exist. Remote locations are not checked.
    #[must_use]
    pub const fn verify_local_assets(mut self, verify: bool) -> Self {
        self.verify_local_assets = verify;
        self
    }
}

impl LandmarkInference<RecordedFrame> for RecordedInference {
    fn configure(&self, options: &FaceMeshOptions, assets: &dyn AssetLocator) -> Result<()> {
        debug!(
            "Face mesh: max_num_faces={}, min_detection_confidence={}, min_tracking_confidence={}",
            options.max_num_faces, options.min_detection_confidence, options.min_tracking_confidence
        );
        for file in FACE_MESH_ASSETS {
            let location = assets.locate(file);
            debug!("Asset {file} -> {location}");
            if self.verify_local_assets && !is_remote(&location) && !Path::new(&location).exists() {
                anyhow::bail!("Missing face mesh asset: {location}");
            }
        }
        Ok(())
    }

    fn infer(&self, frame: &RecordedFrame) -> Result<Vec<LandmarkSet>> {
        match &frame.error {
            Some(error) => anyhow::bail!("{error}"),
            None => Ok(frame.faces.clone()),
        }
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_frame() {
        let input = "{\"t_ms\": 0}\n\n{\"t_ms\": 40, \"faces\": [], \"error\": \"boom\"}\n";
        let recording = Recording::from_reader("mem", input.as_bytes()).unwrap();
        assert_eq!(recording.frames().len(), 2);
        assert!(recording.frames()[0].faces.is_empty());
        assert_eq!(recording.frames()[1].error.as_deref(), Some("boom"));
        assert_eq!(recording.duration_ms(), 40);
    }

    #[test]
    fn test_parse_error_names_line() {
        let input = "{\"t_ms\": 0}\nnot json\n";
        let err = Recording::from_reader("mem", input.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("mem:2"));
    }

    #[test]
    fn test_error_frame_fails_inference() {
        let inference = RecordedInference::new();
        assert!(inference.infer(&RecordedFrame::failed(0, "crash")).is_err());
        assert!(inference
            .infer(&RecordedFrame::new(0, Vec::new()))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_remote_assets_not_verified() {
        let inference = RecordedInference::new().verify_local_assets(true);
        let locator = |file: &str| format!("https://example.com/{file}");
        assert!(inference
            .configure(&FaceMeshOptions::default(), &locator)
            .is_ok());
    }

    #[test]
    fn test_missing_local_asset() {
        let inference = RecordedInference::new().verify_local_assets(true);
        let locator = |file: &str| format!("/nonexistent/liveness/{file}");
        let err = inference
            .configure(&FaceMeshOptions::default(), &locator)
            .unwrap_err();
        assert!(err.to_string().contains("face_mesh.binarypb"));
    }

    #[test]
    fn test_capture_running_flag() {
        let capture = RecordingCapture::new();
        let request = CaptureRequest {
            camera: liveness_core::domain::CameraConfig::default(),
            generation: Generation::new(1),
        };
        assert_eq!(capture.start(&request), StartOutcome::Started);
        assert!(capture.is_running());
        capture.stop();
        assert!(!capture.is_running());
    }
}
