//! Command-line interface tests
//!
//! These run the real binary and only exercise paths that do not depend
//! on FFmpeg being installed: argument validation, input checks, and the
//! no-op compression path.

use assert_cmd::Command;
use predicates::prelude::*;

fn alphacut() -> Command {
    let mut cmd = Command::cargo_bin("alphacut").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("ALPHACUT_MODEL");
    cmd
}

#[test]
fn test_help_lists_all_commands() {
    alphacut()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("compress"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_version_flag() {
    alphacut()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("alphacut"));
}

#[test]
fn test_no_arguments_shows_usage() {
    alphacut()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_inspect_rejects_missing_file() {
    alphacut()
        .args(["inspect", "--input", "/nonexistent/clip.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_compress_rejects_missing_file() {
    alphacut()
        .args(["compress", "--input", "/nonexistent/clip.mov"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_process_rejects_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, b"not a video").unwrap();

    alphacut()
        .args(["process", "--input", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported format"));
}

#[test]
fn test_process_without_model_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.mp4");
    std::fs::write(&input, b"fake video data").unwrap();

    // Fails in every build flavor: either the model argument is missing
    // or the build carries no inference runtime
    alphacut()
        .args(["process", "--input", input.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_size_cap_rejects_zero() {
    alphacut()
        .args(["plan", "--input", "clip.mp4", "--max-size-mb", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_compress_within_cap_is_a_json_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.mov");
    std::fs::write(&input, vec![0u8; 4096]).unwrap();

    alphacut()
        .args(["compress", "--input", input.to_str().unwrap(), "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"))
        .stdout(predicate::str::contains("\"compression_ratio\": 1.0"));
}
