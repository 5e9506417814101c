//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn vt_calc() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vt-calc"));
    cmd.env_remove("VT_CALC_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
    image::RgbImage::new(width, height).save(dir.join(name)).expect("save png");
}

#[test]
fn test_cli_version() {
    let mut cmd = vt_calc();
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("vt-calc"));
}

#[test]
fn test_cli_help() {
    let mut cmd = vt_calc();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("vision tokens"))
        .stdout(predicate::str::contains("estimate"))
        .stdout(predicate::str::contains("models"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_estimate_requires_size_or_image() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = vt_calc();
    cmd.current_dir(tmp.path()).arg("estimate");
    cmd.assert().failure().stderr(predicate::str::contains("--size"));
}

#[test]
fn test_estimate_synthetic_size_default_model() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = vt_calc();
    cmd.current_dir(tmp.path()).args(["estimate", "--size", "1920", "1080"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("VISION TOKEN ANALYSIS RESULTS"))
        .stdout(predicate::str::contains("qwen2.5-vl"))
        .stdout(predicate::str::contains("1932 x 1092"))
        .stdout(predicate::str::contains("2,691"));
}

#[test]
fn test_estimate_json_report() {
    let tmp = TempDir::new().expect("tmp");
    let output = vt_calc()
        .current_dir(tmp.path())
        .args(["estimate", "-s", "800", "800", "-m", "InternVL3", "--json", "--no-timestamp"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["model"]["name"], "internvl3");
    assert_eq!(report["result"]["token_count"], 1280);
    assert_eq!(report["result"]["patch_count"], 5);
    assert_eq!(report["result"]["has_global_patch"], true);
    assert!(report.get("generated_at").is_none());
}

#[test]
fn test_estimate_image_file() {
    let tmp = TempDir::new().expect("tmp");
    write_png(tmp.path(), "photo.png", 400, 600);

    let mut cmd = vt_calc();
    cmd.current_dir(tmp.path()).args(["estimate", "--image", "photo.png", "--model", "llava-next"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("photo.png"))
        .stdout(predicate::str::contains("400 x 600"))
        .stdout(predicate::str::contains("2,160"));
}

#[test]
fn test_estimate_directory_batch() {
    let tmp = TempDir::new().expect("tmp");
    write_png(tmp.path(), "a.png", 800, 800);
    write_png(tmp.path(), "b.png", 448, 448);
    fs::write(tmp.path().join("c.jpg"), b"not an image").expect("write");

    let mut cmd = vt_calc();
    cmd.current_dir(tmp.path()).args(["estimate", "--image", ".", "-m", "internvl3"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("BATCH ANALYSIS RESULTS"))
        .stdout(predicate::str::contains("Total Images Processed      : 2"))
        .stdout(predicate::str::contains("Total Images Failed         : 1"))
        .stdout(predicate::str::contains("Average Vision Tokens       : 770.0"))
        .stdout(predicate::str::contains("c.jpg"));
}

#[test]
fn test_estimate_empty_directory_fails() {
    let tmp = TempDir::new().expect("tmp");
    fs::create_dir(tmp.path().join("empty")).expect("mkdir");

    let mut cmd = vt_calc();
    cmd.current_dir(tmp.path()).args(["estimate", "--image", "empty"]);
    cmd.assert().failure().stderr(predicate::str::contains("No image files found"));
}

#[test]
fn test_estimate_rejects_unknown_model() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = vt_calc();
    cmd.current_dir(tmp.path()).args(["estimate", "--size", "10", "10", "--model", "gpt-4v"]);
    cmd.assert().failure().stderr(predicate::str::contains("Unsupported model"));
}

#[test]
fn test_estimate_rejects_extreme_aspect_ratio() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = vt_calc();
    cmd.current_dir(tmp.path()).args(["estimate", "--size", "300", "1", "--model", "qwen2-vl"]);
    cmd.assert().failure().stderr(predicate::str::contains("aspect ratio"));
}

#[test]
fn test_auto_discovered_config_adds_models() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(
        tmp.path().join("vt-calc.toml"),
        r#"
default_model = "tiny-internvl"

[models.tiny-internvl]
family = "internvl3"

[models.tiny-internvl.geometry]
kind = "tiled_canvas"
tile_size = 448
min_tiles = 1
max_tiles = 1
patch_size = 14
pixel_unshuffle_factor = 2
"#,
    )
    .expect("write");

    let mut cmd = vt_calc();
    cmd.current_dir(tmp.path()).args(["estimate", "--size", "1920", "1080"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("tiny-internvl"))
        .stdout(predicate::str::contains("Number of Image Tokens      : 256"));
}

#[test]
fn test_explicit_bad_config_fails_but_discovered_one_is_skipped() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("vt-calc.toml"), "models = 3\n").expect("write");

    let mut discovered = vt_calc();
    discovered.current_dir(tmp.path()).args(["estimate", "--size", "800", "800"]);
    discovered.assert().success().stdout(predicate::str::contains("841"));

    let mut explicit = vt_calc();
    explicit.current_dir(tmp.path()).args(["estimate", "--size", "800", "800", "-c", "vt-calc.toml"]);
    explicit.assert().failure().stderr(predicate::str::contains("Invalid TOML config"));
}

#[test]
fn test_config_from_environment_variable() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("custom.yaml");
    fs::write(&path, "default_model: llava\n").expect("write");

    let mut cmd = vt_calc();
    cmd.current_dir(tmp.path())
        .env("VT_CALC_CONFIG", &path)
        .args(["estimate", "--size", "640", "480"]);
    cmd.assert().success().stdout(predicate::str::contains("llava-hf/llava-1.5-7b-hf"));
}

#[test]
fn test_models_lists_every_family() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = vt_calc();
    cmd.current_dir(tmp.path()).arg("models");
    let mut assert = cmd.assert().success();
    for name in ["qwen2-vl", "qwen2.5-vl", "internvl3", "llava", "llava-next", "llava-onevision"] {
        assert = assert.stdout(predicate::str::contains(name));
    }
    assert.stdout(predicate::str::contains("default: qwen2.5-vl"));
}

#[test]
fn test_models_json() {
    let tmp = TempDir::new().expect("tmp");
    let output = vt_calc().current_dir(tmp.path()).args(["models", "--json"]).output().expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["default_model"], "qwen2.5-vl");
    assert_eq!(value["models"].as_array().map(Vec::len), Some(6));
}

#[test]
fn test_completions_bash() {
    let mut cmd = vt_calc();
    cmd.args(["completions", "bash"]);
    cmd.assert().success().stdout(predicate::str::contains("vt-calc"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = vt_calc();
    cmd.current_dir(tmp.path()).args(["--verbose", "estimate", "--size", "800", "800"]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("selected estimator"))
        .stdout(predicate::str::contains("selected estimator").not());
}
