//! Integration tests for the zipweather binary.
//!
//! Each test runs the real binary against a mock weather server and a
//! temporary output directory.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Scratch space: an output dir plus an empty config file so the user's
/// own config is never picked up
struct Sandbox {
    _root: TempDir,
    output_dir: PathBuf,
    config_path: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory");
        let output_dir = root.path().join("out");
        std::fs::create_dir(&output_dir).unwrap();
        let config_path = root.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();
        Self {
            _root: root,
            output_dir,
            config_path,
        }
    }

    fn snapshots(&self) -> Vec<PathBuf> {
        std::fs::read_dir(&self.output_dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }
}

/// Helper to run the CLI with given args, environment and stdin
async fn run_cli(args: &[&str], env: &[(&str, &str)], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_zipweather"))
        .args(args)
        .env_remove("WEATHER_INFO_DIR")
        .env_remove("OPEN_WEATHER_API_KEY")
        .env_remove("OPEN_WEATHER_URL")
        .env("RUST_LOG", "warn")
        .envs(env.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute zipweather");

    if let Some(mut pipe) = child.stdin.take() {
        // The process may exit before reading; a broken pipe is fine
        let _ = pipe.write_all(stdin.as_bytes()).await;
    }

    child.wait_with_output().await.expect("Failed to wait for zipweather")
}

async fn mock_weather(expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("zip", "75081,us"))
        .and(query_param("appid", "test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "main": {"temp": 280.00},
            "name": "Richardson"
        })))
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

fn env_for<'a>(sandbox: &'a Sandbox, server: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("WEATHER_INFO_DIR", path_str(&sandbox.output_dir)),
        ("OPEN_WEATHER_API_KEY", "test_key"),
        ("OPEN_WEATHER_URL", server),
    ]
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path should be UTF-8")
}

#[tokio::test]
async fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"], &[], "").await;
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("zipweather"), "Help should mention zipweather");
    assert!(stdout.contains("--zip"), "Help should mention --zip flag");
}

#[tokio::test]
async fn test_missing_environment_is_fatal() {
    let sandbox = Sandbox::new();
    let output = run_cli(&["--config", path_str(&sandbox.config_path)], &[], "").await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("WEATHER_INFO_DIR"), "stderr: {}", stderr);
}

#[tokio::test]
async fn test_zip_flag_prints_fahrenheit() {
    let sandbox = Sandbox::new();
    let server = mock_weather(1).await;
    let uri = server.uri();

    let output = run_cli(
        &["--zip", "75081", "--config", path_str(&sandbox.config_path)],
        &env_for(&sandbox, &uri),
        "",
    )
    .await;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("44.33"), "stdout: {}", stdout);

    let snapshots = sandbox.snapshots();
    assert_eq!(snapshots.len(), 1);
    let name = snapshots[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("weather_info_75081_"));
}

#[tokio::test]
async fn test_invalid_zip_flag_fails_without_side_effects() {
    let sandbox = Sandbox::new();
    let server = mock_weather(0).await;
    let uri = server.uri();

    let output = run_cli(
        &["--zip", "75o81", "--config", path_str(&sandbox.config_path)],
        &env_for(&sandbox, &uri),
        "",
    )
    .await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid zipcode"), "stderr: {}", stderr);
    assert!(sandbox.snapshots().is_empty());
}

#[tokio::test]
async fn test_prompt_reprompts_then_runs() {
    let sandbox = Sandbox::new();
    let server = mock_weather(1).await;
    let uri = server.uri();

    let output = run_cli(
        &["--config", path_str(&sandbox.config_path)],
        &env_for(&sandbox, &uri),
        "hello\n1234\n75081\n",
    )
    .await;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("Enter 5 digit zipcode").count(), 3);
    assert!(stdout.contains("44.33"), "stdout: {}", stdout);
    assert_eq!(sandbox.snapshots().len(), 1);
}

#[tokio::test]
async fn test_prompt_quit() {
    let sandbox = Sandbox::new();
    let server = mock_weather(0).await;
    let uri = server.uri();

    let output = run_cli(
        &["--config", path_str(&sandbox.config_path)],
        &env_for(&sandbox, &uri),
        "q\n75081\n",
    )
    .await;

    assert!(output.status.success());
    assert!(sandbox.snapshots().is_empty());
}
