//! CLI argument validation tests.
//!
//! Tests command-line argument parsing, validation, and error handling.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::fs::File;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use liveness_adapters::{RecordedFrame, Recording};
use liveness_test_support::SyntheticFaceBuilder;
use predicates::prelude::*;

/// Command isolated from user and project config files.
fn liveness(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("liveness").unwrap();
    cmd.current_dir(dir).env("XDG_CONFIG_HOME", dir.join("xdg"));
    cmd
}

fn write_blinks(dir: &Path, blinks: usize) -> PathBuf {
    let frames = SyntheticFaceBuilder::new()
        .blink_frames(blinks)
        .into_iter()
        .enumerate()
        .map(|(i, face)| RecordedFrame::new(i as u64 * 33, vec![face]))
        .collect();
    let path = dir.join("blinks.jsonl");
    Recording::from_frames("blinks", frames)
        .write_jsonl(File::create(&path).unwrap())
        .unwrap();
    path
}

// === Missing/Invalid Recording Tests ===

#[test]
fn test_missing_recording_shows_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    liveness(temp_dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No recording specified"));
}

#[test]
fn test_nonexistent_recording_is_operational_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    liveness(temp_dir.path())
        .arg("/nonexistent/path/to/clip.jsonl")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to open recording"));
}

#[test]
fn test_malformed_recording_names_line() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("bad.jsonl");
    std::fs::write(&path, "{\"t_ms\": 0}\n{oops}\n").unwrap();

    liveness(temp_dir.path())
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("bad.jsonl:2"));
}

#[test]
fn test_empty_recording_does_not_pass() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("empty.jsonl");
    std::fs::write(&path, "").unwrap();

    liveness(temp_dir.path()).arg(&path).assert().code(1);
}

// === Value Validation Tests ===

#[test]
fn test_invalid_format_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = write_blinks(temp_dir.path(), 2);

    liveness(temp_dir.path())
        .arg("--format")
        .arg("xml")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_ratio_out_of_range_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = write_blinks(temp_dir.path(), 2);

    liveness(temp_dir.path())
        .arg("--close-threshold")
        .arg("1.5")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("1.5 is not in 0.0..=1.0"));
}

#[test]
fn test_zero_required_blinks_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = write_blinks(temp_dir.path(), 2);

    liveness(temp_dir.path())
        .arg("--required-blinks")
        .arg("0")
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn test_invalid_facing_mode_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = write_blinks(temp_dir.path(), 2);

    liveness(temp_dir.path())
        .arg("--facing-mode")
        .arg("front")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("'front' is not 'user' or 'environment'"));
}

#[test]
fn test_inverted_blink_band_is_operational_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = write_blinks(temp_dir.path(), 2);

    liveness(temp_dir.path())
        .arg("--close-threshold")
        .arg("0.3")
        .arg("--open-threshold")
        .arg("0.2")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid configuration"));
}

// === Help / Version ===

#[test]
fn test_help_lists_subcommands() {
    let temp_dir = tempfile::tempdir().unwrap();
    liveness(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run").and(predicate::str::contains("assets")));
}

#[test]
fn test_version_flag() {
    let temp_dir = tempfile::tempdir().unwrap();
    liveness(temp_dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("liveness"));
}

// === Run Subcommand ===

#[test]
fn test_run_subcommand_matches_default() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = write_blinks(temp_dir.path(), 2);

    liveness(temp_dir.path())
        .arg("run")
        .arg(&path)
        .assert()
        .code(0);
}

#[test]
fn test_verbose_logs_to_stderr() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = write_blinks(temp_dir.path(), 2);

    liveness(temp_dir.path())
        .arg("-v")
        .arg("--quiet")
        .arg(&path)
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Replaying"));
}

// === Assets Subcommand ===

#[test]
fn test_assets_path_uses_config_dir() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join(".liveness.toml"),
        "[assets]\ndir = '/opt/face_mesh'\n",
    )
    .unwrap();

    liveness(temp_dir.path())
        .args(["assets", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/opt/face_mesh"));
}

#[test]
fn test_assets_list_default_cdn() {
    let temp_dir = tempfile::tempdir().unwrap();
    liveness(temp_dir.path())
        .args(["assets", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cdn.jsdelivr.net"))
        .stdout(predicate::str::contains("face_mesh_solution_simd_wasm_bin.wasm"));
}

#[test]
fn test_assets_list_local_dir_reports_missing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let assets = temp_dir.path().join("assets");
    std::fs::create_dir_all(&assets).unwrap();
    std::fs::write(assets.join("face_mesh.binarypb"), b"").unwrap();

    liveness(temp_dir.path())
        .args(["assets", "list", "--dir"])
        .arg(&assets)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ face_mesh.binarypb"))
        .stdout(predicate::str::contains("✗"))
        .stdout(predicate::str::contains("1/7 assets installed"));
}

#[test]
fn test_verify_assets_missing_fails_session() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = write_blinks(temp_dir.path(), 2);

    liveness(temp_dir.path())
        .arg("--verify-assets")
        .arg("--assets-dir")
        .arg(temp_dir.path().join("no-assets"))
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("MODEL_LOAD_FAILED"));
}
