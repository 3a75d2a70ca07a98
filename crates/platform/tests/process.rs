//! Process execution against real child processes

#![cfg(unix)]

use flowtidy_errors::{Error, PlatformError};
use flowtidy_platform::{PlatformCommand, ProcessOperations, TokioProcessOperations};
use std::time::{Duration, Instant};

#[tokio::test]
async fn captures_output_and_exit_code() {
    let ops = TokioProcessOperations::new();
    let mut cmd = PlatformCommand::new("sh");
    cmd.args(["-c", "echo out; echo err >&2; exit 3"]);

    let output = ops.execute_command(&cmd).await.unwrap();
    assert!(!output.success);
    assert_eq!(output.code, Some(3));
    assert_eq!(output.stdout.trim(), "out");
    assert_eq!(output.diagnostic(), "err");
}

#[tokio::test]
async fn slow_command_times_out() {
    let ops = TokioProcessOperations::new();
    let mut cmd = PlatformCommand::new("sleep");
    cmd.args(["5"]).timeout(Duration::from_millis(200));

    let start = Instant::now();
    let err = ops.execute_command(&cmd).await.unwrap_err();
    assert!(start.elapsed() < Duration::from_secs(4));
    assert!(matches!(
        err,
        Error::Platform(PlatformError::Timeout {
            timeout_ms: 200,
            ..
        })
    ));
}

#[tokio::test]
async fn missing_program_is_not_found() {
    let ops = TokioProcessOperations::new();
    let cmd = PlatformCommand::new("flowtidy-definitely-not-installed");

    let err = ops.execute_command(&cmd).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Platform(PlatformError::CommandNotFound { .. })
    ));
}

#[tokio::test]
async fn runs_in_working_directory() {
    let temp = tempfile::TempDir::new().unwrap();
    std::fs::write(temp.path().join("marker.json"), "{}").unwrap();

    let ops = TokioProcessOperations::new();
    let mut cmd = PlatformCommand::new("ls");
    cmd.current_dir(temp.path());

    let output = ops.execute_command(&cmd).await.unwrap();
    assert!(output.success);
    assert!(output.stdout.contains("marker.json"));
}
