//! CLI argument and failure-path tests.
//!
//! These run the real binary but never need model weights: they exercise
//! argument validation and the graceful missing-models error.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use blinkcheck_test_support::SyntheticImageBuilder;

fn blinkcheck() -> Command {
    Command::cargo_bin("blinkcheck").unwrap()
}

#[test]
fn test_help_lists_subcommands() {
    let output = blinkcheck().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("predict"));
    assert!(stdout.contains("models"));
}

#[test]
fn test_version_flag() {
    blinkcheck().arg("--version").assert().success();
}

#[test]
fn test_iou_threshold_out_of_range_rejected() {
    let output = blinkcheck()
        .arg("--iou-threshold")
        .arg("1.5")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1.5"));
}

#[test]
fn test_confidence_threshold_not_a_number_rejected() {
    let output = blinkcheck()
        .arg("--confidence-threshold")
        .arg("high")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a valid number"));
}

#[test]
fn test_models_path_prints_directory() {
    let output = blinkcheck().arg("models").arg("path").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.trim().is_empty());
}

#[test]
fn test_models_list_reports_status() {
    let output = blinkcheck().arg("models").arg("list").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("face_finder"));
    assert!(stdout.contains("blink"));
}

#[test]
fn test_predict_without_weights_points_at_fetch() {
    let empty_models = tempfile::tempdir().unwrap();

    let output = blinkcheck()
        .arg("--models-dir")
        .arg(empty_models.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("models fetch"));
}

#[test]
fn test_predict_image_argument_without_weights() {
    // The weights check fires before the image is touched, so even a valid
    // image fails with the fetch hint when the models are absent.
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("scene.png");
    SyntheticImageBuilder::portrait(120, 120, 60, 60, 20, 26)
        .image
        .save(&image_path)
        .expect("save test image");

    let empty_models = tempfile::tempdir().unwrap();
    let output = blinkcheck()
        .arg(&image_path)
        .arg("--models-dir")
        .arg(empty_models.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("models fetch"));
}
