//! # CLI Tests
//!
//! Runs the `flapwatch` binary against temporary config and log files.

use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn flapwatch() -> Command {
    Command::new(env!("CARGO_BIN_EXE_flapwatch"))
}

#[test]
fn test_replay_json_output() {
    let config = write_temp("default_threshold = 10\n");
    let mut log = String::new();
    for _ in 0..10 {
        log.push_str("test,0,0\n");
    }
    log.push_str("test,0,20\ntest,0,0\ntest,0,20\n");
    let input = write_temp(&log);

    let output = flapwatch()
        .arg("replay")
        .arg("--config")
        .arg(config.path())
        .arg("--input")
        .arg(input.path())
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let kinds: Vec<&str> = events.iter().map(|e| e["kind"].as_str().unwrap()).collect();
    assert_eq!(
        kinds,
        vec!["above_threshold_not_flapping", "below_threshold_not_flapping", "flapping_started"]
    );
    assert_eq!(events[2]["tick"], 13);
    assert_eq!(events[2]["observation"]["name"], "test");
}

#[test]
fn test_check_rejects_invalid_config() {
    let config = write_temp("[flap]\nlow_weight = -2.0\n");
    let output = flapwatch().arg("check").arg("--config").arg(config.path()).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid weight profile"), "stderr: {}", stderr);
}

#[test]
fn test_check_prints_effective_settings() {
    let config = write_temp("default_threshold = 10\n[metrics.heap]\nthreshold = 900\ninterval = 20\n");
    let output = flapwatch().arg("check").arg("--config").arg(config.path()).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("heap: interval=20"), "stdout: {}", stdout);
    assert!(stdout.contains("threshold=900"), "stdout: {}", stdout);
}
