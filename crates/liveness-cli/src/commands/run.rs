//! Run command - replay a recorded landmark stream through a liveness session.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use liveness_adapters::{
    locator_for, replay, RecordedInference, Recording, RecordingCapture, ReplayOptions,
    VirtualTimer,
};
use liveness_core::{
    FacingMode, LivenessConfig, MediaError, ReportOutput, SessionController, SessionReport,
};
use tracing::{debug, info};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{BlinkProgress, JsonOutput};

/// Output format for the session report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON document with the final report
    #[default]
    Json,
    /// JSON Lines: one line per session event, then the report
    Jsonl,
}

/// Parse and validate a ratio value (0.0-1.0).
fn parse_ratio(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Parse a facing mode name.
fn parse_facing_mode(s: &str) -> Result<FacingMode, String> {
    match s {
        "user" => Ok(FacingMode::User),
        "environment" => Ok(FacingMode::Environment),
        _ => Err(format!("'{s}' is not 'user' or 'environment'")),
    }
}

/// Shared arguments for a session run.
#[derive(Args, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Recorded landmark stream (.jsonl)
    pub recording: Option<PathBuf>,

    /// Blinks required to pass
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub required_blinks: Option<u32>,

    /// Fail if no face is seen within this many milliseconds (0 disables)
    #[arg(long, value_name = "MS")]
    pub face_timeout: Option<u64>,

    /// Requested capture width in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Requested capture height in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// Camera to request: user or environment
    #[arg(long, value_parser = parse_facing_mode)]
    pub facing_mode: Option<FacingMode>,

    /// Minimum face detection confidence (0.0-1.0)
    #[arg(long, value_parser = parse_ratio)]
    pub min_detection_confidence: Option<f64>,

    /// Minimum face tracking confidence (0.0-1.0)
    #[arg(long, value_parser = parse_ratio)]
    pub min_tracking_confidence: Option<f64>,

    /// Eye aspect ratio below which eyes count as closed (0.0-1.0)
    #[arg(long, value_parser = parse_ratio)]
    pub close_threshold: Option<f64>,

    /// Eye aspect ratio above which closed eyes count as reopened (0.0-1.0)
    #[arg(long, value_parser = parse_ratio)]
    pub open_threshold: Option<f64>,

    /// Base URL face mesh assets resolve against
    #[arg(long, value_name = "URL")]
    pub asset_base_url: Option<String>,

    /// Local face mesh assets directory (overrides --asset-base-url)
    #[arg(long, value_name = "DIR")]
    pub assets_dir: Option<PathBuf>,

    /// Fail if a local face mesh asset is missing
    #[arg(long)]
    pub verify_assets: bool,

    /// Retries after a failed attempt before giving up
    #[arg(long, default_value_t = 0)]
    pub max_retries: u32,

    /// Keep replaying after the session passes
    #[arg(long)]
    pub until_end: bool,

    /// Make capture fail to start with this media error name (e.g. `NotAllowedError`)
    #[arg(long, value_name = "NAME")]
    pub simulate_capture_error: Option<String>,

    /// Show progress spinner
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl RunArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (`LivenessConfig::default()`)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        args.required_blinks = args.required_blinks.or(config.session.required_blinks);
        args.face_timeout = args
            .face_timeout
            .or(config.session.face_detection_timeout_ms);

        args.width = args.width.or(config.camera.width);
        args.height = args.height.or(config.camera.height);
        if args.facing_mode.is_none() {
            args.facing_mode = config
                .camera
                .facing_mode
                .as_deref()
                .and_then(|s| parse_facing_mode(s).ok());
        }

        args.min_detection_confidence = args
            .min_detection_confidence
            .or(config.face_mesh.min_detection_confidence);
        args.min_tracking_confidence = args
            .min_tracking_confidence
            .or(config.face_mesh.min_tracking_confidence);
        args.close_threshold = args.close_threshold.or(config.blink.close_threshold);
        args.open_threshold = args.open_threshold.or(config.blink.open_threshold);

        if args.asset_base_url.is_none() {
            args.asset_base_url.clone_from(&config.assets.base_url);
        }
        if args.assets_dir.is_none() {
            args.assets_dir.clone_from(&config.assets.dir);
        }

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args.config = Some(config.clone());
        args
    }

    /// Builds the session configuration from merged arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration is invalid.
    pub fn liveness_config(&self) -> Result<LivenessConfig> {
        let mut config = LivenessConfig::default();

        if let Some(blinks) = self.required_blinks {
            config.required_blinks = blinks;
        }
        if let Some(ms) = self.face_timeout {
            config.face_detection_timeout_ms = ms;
        }
        if let Some(width) = self.width {
            config.camera.width = width;
        }
        if let Some(height) = self.height {
            config.camera.height = height;
        }
        if let Some(mode) = self.facing_mode {
            config.camera.facing_mode = mode;
        }
        if let Some(max) = self
            .config
            .as_ref()
            .and_then(|c| c.face_mesh.max_num_faces)
        {
            config.face_mesh.max_num_faces = max;
        }
        if let Some(v) = self.min_detection_confidence {
            config.face_mesh.min_detection_confidence = v;
        }
        if let Some(v) = self.min_tracking_confidence {
            config.face_mesh.min_tracking_confidence = v;
        }
        if let Some(v) = self.close_threshold {
            config.blink.close = v;
        }
        if let Some(v) = self.open_threshold {
            config.blink.open = v;
        }

        if config.required_blinks == 0 {
            anyhow::bail!("Invalid configuration: required blinks must be at least 1");
        }
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
        Ok(config)
    }

    /// Get output format with fallback to a single JSON document.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }
}

/// Result of running the run command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct RunResult {
    /// The report that was written.
    pub report: SessionReport,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the run command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &RunArgs) -> Result<RunResult> {
    let Some(path) = args.recording.as_ref() else {
        anyhow::bail!("No recording specified");
    };

    let config = args.liveness_config()?;
    let recording = Recording::load(path)?;
    info!(
        "Running session over {} ({} frames, {} blinks required)",
        path.display(),
        recording.frames().len(),
        config.required_blinks
    );

    let timer = VirtualTimer::new();
    let capture = match args.simulate_capture_error.as_deref() {
        Some(name) => {
            debug!("Capture will fail with {name}");
            RecordingCapture::failing(MediaError::new(name, ""))
        }
        None => RecordingCapture::new(),
    };
    let inference = RecordedInference::new().verify_local_assets(args.verify_assets);
    let locator = locator_for(args.asset_base_url.as_deref(), args.assets_dir.as_deref());

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress = Arc::new(BlinkProgress::new(
        config.required_blinks,
        args.quiet,
        show_progress,
    ));
    let output = Arc::new(JsonOutput::stdout());
    let format = args.format();

    let required_blinks = config.required_blinks;
    let mut session = SessionController::new(
        config,
        Box::new(capture),
        Box::new(inference),
        Box::new(timer.clone()),
    )
    .with_asset_locator(locator)
    .with_observer(progress);
    if format == OutputFormat::Jsonl {
        session.add_observer(output.clone());
    }

    let options = ReplayOptions {
        stop_on_pass: !args.until_end,
        max_retries: args.max_retries,
    };
    let summary = replay(&mut session, &timer, &recording, &options);
    session.teardown();

    let report = SessionReport {
        source: recording.source().to_string(),
        timestamp: iso_timestamp(),
        frames_processed: summary.frames_processed,
        retries: summary.retries,
        snapshot: summary.snapshot,
    };

    match format {
        OutputFormat::Jsonl => output.write(&report)?,
        OutputFormat::Json => output.write_document(&report, args.pretty)?,
    }
    output.flush().context("Failed to flush output")?;

    let exit_code = if report.snapshot.passed {
        ExitCode::Passed
    } else {
        debug!(
            "Session did not pass: {}/{} blinks, error {:?}",
            report.snapshot.blink_count,
            required_blinks,
            report.snapshot.error.as_ref().map(|e| e.code)
        );
        ExitCode::NotPassed
    };

    Ok(RunResult { report, exit_code })
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
