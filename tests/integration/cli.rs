//! Integration tests for the `awn` binary's argument handling
//!
//! Every case here fails before a request reaches the network.

use assert_cmd::Command;
use tempfile::TempDir;

fn awn() -> Command {
    let mut cmd = Command::cargo_bin("awn").unwrap();
    cmd.env_remove("AWN_API_KEY")
        .env_remove("AWN_APPLICATION_KEY")
        .env_remove("AWN_BASE_URL")
        .env("AWN_LOG_LEVEL", "error");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let output = awn().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("devices"));
    assert!(stdout.contains("history"));
}

#[test]
fn test_malformed_start_date_exits_with_kind() {
    let output = awn()
        .args([
            "--api-key",
            "k",
            "--app-key",
            "a",
            "history",
            "--mac",
            "00:11:22:33:44:55",
            "--start",
            "11-15-2021",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MalformedDate:"), "stderr: {stderr}");
}

#[test]
fn test_missing_credentials_exit_before_request() {
    let temp_dir = TempDir::new().unwrap();
    let output = awn()
        .current_dir(temp_dir.path())
        .args([
            "--base-url",
            "http://127.0.0.1:9",
            "history",
            "--mac",
            "00:11:22:33:44:55",
            "--start",
            "2024-01-01",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MissingCredential:"), "stderr: {stderr}");
}

#[test]
fn test_failed_run_keeps_existing_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("history.jsonl");
    std::fs::write(&output_path, "previous run\n").unwrap();

    let output = awn()
        .current_dir(temp_dir.path())
        .args([
            "--base-url",
            "http://127.0.0.1:9",
            "history",
            "--mac",
            "00:11:22:33:44:55",
            "--start",
            "2024-01-01",
            "--output",
            "history.jsonl",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        std::fs::read_to_string(&output_path).unwrap(),
        "previous run\n"
    );
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
}

#[test]
fn test_failed_stream_keeps_existing_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("history.jsonl");
    std::fs::write(&output_path, "previous run\n").unwrap();

    let output = awn()
        .current_dir(temp_dir.path())
        .args([
            "--api-key",
            "k",
            "--app-key",
            "a",
            "--base-url",
            "http://127.0.0.1:9",
            "--max-retries",
            "0",
            "history",
            "--mac",
            "00:11:22:33:44:55",
            "--start",
            "2024-01-01",
            "--stream",
            "--output",
            "history.jsonl",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        std::fs::read_to_string(&output_path).unwrap(),
        "previous run\n"
    );
}

#[test]
fn test_out_of_range_limit_is_usage_error() {
    awn()
        .args([
            "history",
            "--mac",
            "00:11:22:33:44:55",
            "--start",
            "2024-01-01",
            "--limit",
            "289",
        ])
        .assert()
        .failure();
}

#[test]
fn test_unreachable_endpoint_reports_transport_failure() {
    let temp_dir = TempDir::new().unwrap();
    let output = awn()
        .current_dir(temp_dir.path())
        .args([
            "--api-key",
            "k",
            "--app-key",
            "a",
            "--base-url",
            "http://127.0.0.1:9",
            "--max-retries",
            "0",
            "devices",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TransportFailure:"), "stderr: {stderr}");
}
