//! End-to-end tests for the gamemaster binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn gamemaster() -> Command {
    Command::cargo_bin("gamemaster").unwrap()
}

/// Writes a config file with 1 ms host ticks so countdowns finish quickly.
fn fast_config(extra: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"host_tick_millis": 1, "step_interval_ticks": 1{}}}"#, extra).unwrap();
    file
}

// ============================================================================
// render
// ============================================================================

#[test]
fn test_render_raw_frame() {
    gamemaster()
        .args(["render", "--remaining", "2.5", "--total", "10", "--raw"])
        .assert()
        .success()
        .stdout("§4§l[§c|||§7|||||||§4§l]\n");
}

#[test]
fn test_render_with_label_and_notches() {
    gamemaster()
        .args([
            "render", "-r", "1", "-t", "2", "-n", "2", "-l", "Grace", "--raw",
        ])
        .assert()
        .success()
        .stdout("§4§l[§c|§7|§4§l] §7-§r Grace\n");
}

#[test]
fn test_render_ansi_has_no_section_signs() {
    gamemaster()
        .args(["render", "-r", "5", "-t", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("§").not())
        .stdout(predicate::str::contains("\x1b["));
}

#[test]
fn test_render_rejects_zero_total() {
    gamemaster()
        .args(["render", "-r", "1", "-t", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive number"));
}

// ============================================================================
// countdown
// ============================================================================

#[test]
fn test_countdown_bar_completes() {
    let config = fast_config("");
    gamemaster()
        .args(["countdown", "--seconds", "0.3", "--raw", "--config"])
        .arg(config.path())
        .args(["--title", "%phase% %time_left%", "--set", "%phase%=Grace"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("100.0% Grace 0.3"))
        .stdout(predicate::str::contains("Grace 0.1"))
        .stdout(predicate::str::contains("countdown complete"));
}

#[test]
fn test_countdown_overlay_pushes_final_frame() {
    let config = fast_config(r#", "notches": 4"#);
    gamemaster()
        .args(["countdown", "-s", "0.2", "--overlay", "--raw", "-c"])
        .arg(config.path())
        .args(["-t", "%time_left%"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("§4§l[§7||||§4§l] §7-§r 0.0"))
        .stdout(predicate::str::contains("countdown complete"));
}

#[test]
fn test_countdown_missing_config_file() {
    gamemaster()
        .args(["countdown", "--config", "/nonexistent/gamemaster.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_countdown_invalid_config_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"step_interval_ticks": 0}}"#).unwrap();
    gamemaster()
        .args(["countdown", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("step_interval_ticks"));
}

#[test]
fn test_countdown_rejects_oversized_host_tick() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"host_tick_millis": 18446744073709551615}}"#).unwrap();
    gamemaster()
        .args(["countdown", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("host_tick_millis"));
}

#[test]
fn test_countdown_accepts_sub_step_duration() {
    let config = fast_config("");
    gamemaster()
        .args(["countdown", "--seconds", "0.04", "--raw", "--config"])
        .arg(config.path())
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("countdown complete"));
}

// ============================================================================
// completions
// ============================================================================

#[test]
fn test_completions_bash() {
    gamemaster()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gamemaster"));
}

#[test]
fn test_no_command_prints_help() {
    gamemaster()
        .assert()
        .success()
        .stdout(predicate::str::contains("countdown"));
}
