//! Process supervisor behaviour against real subprocesses.

mod common;

use std::time::Duration;

use watchrun::errors::BuildError;
use watchrun::exec::ProcessSupervisor;

use common::{config, wait_until};

const WAIT: Duration = Duration::from_secs(3);

#[tokio::test(flavor = "multi_thread")]
async fn build_then_run_leaves_a_live_process() {
    let dir = tempfile::tempdir().unwrap();
    let sup = ProcessSupervisor::new(&config(dir.path(), "echo built", "sleep 100"));

    sup.rebuild_and_run().await;

    assert!(sup.is_running());
    assert!(sup.running_pid().is_some());

    sup.kill();
    assert!(wait_until(WAIT, || !sup.is_running()).await);
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_builds_never_start_the_app() {
    let dir = tempfile::tempdir().unwrap();

    for build_cmd in ["exit 1", "false", "definitely-not-a-command-xyz"] {
        let sup = ProcessSupervisor::new(&config(dir.path(), build_cmd, "sleep 100"));
        sup.rebuild_and_run().await;
        assert!(!sup.is_running(), "build '{build_cmd}' must not reach start");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn build_error_carries_captured_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let sup = ProcessSupervisor::new(&config(
        dir.path(),
        "echo 'syntax error' >&2; exit 1",
        "sleep 100",
    ));

    let err = sup.build().await.unwrap_err();
    assert!(err.to_string().contains("syntax error"), "got: {err}");

    sup.rebuild_and_run().await;
    assert!(!sup.is_running());
}

#[tokio::test(flavor = "multi_thread")]
async fn build_error_with_silent_failure_reports_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let sup = ProcessSupervisor::new(&config(dir.path(), "exit 3", "sleep 100"));

    match sup.build().await {
        Err(BuildError::Status(3)) => {}
        other => panic!("expected Status(3), got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn kill_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let sup = ProcessSupervisor::new(&config(dir.path(), "true", "sleep 100"));

    // Never started: both calls are no-ops.
    sup.kill();
    sup.kill();

    sup.rebuild_and_run().await;
    assert!(sup.is_running());

    sup.kill();
    sup.kill();
    assert!(wait_until(WAIT, || !sup.is_running()).await);

    // And again on the already-exited process.
    sup.kill();
}

#[tokio::test(flavor = "multi_thread")]
async fn run_spawn_failure_is_a_run_error() {
    let dir = tempfile::tempdir().unwrap();
    let sup = ProcessSupervisor::new(&config(dir.path(), "true", "/definitely/not/here"));

    assert!(sup.start().is_err());
    assert!(!sup.is_running());

    // rebuild_and_run recovers: logs the error, no panic.
    sup.rebuild_and_run().await;
    assert!(!sup.is_running());
}

#[tokio::test(flavor = "multi_thread")]
async fn self_exit_clears_the_running_slot() {
    let dir = tempfile::tempdir().unwrap();
    let sup = ProcessSupervisor::new(&config(dir.path(), "true", "true"));

    sup.rebuild_and_run().await;
    assert!(wait_until(WAIT, || !sup.is_running()).await);
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn env_overrides_reach_the_run_process() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("env.out");
    let script = dir.path().join("run.sh");
    std::fs::write(
        &script,
        format!("#!/bin/sh\nprintf '%s' \"$GREETING\" > '{}'\nsleep 100\n", out.display()),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let mut cfg = config(dir.path(), "true", script.to_str().unwrap());
    cfg.env.insert("GREETING".into(), "hello".into());

    let sup = ProcessSupervisor::new(&cfg);
    sup.rebuild_and_run().await;

    assert!(
        wait_until(WAIT, || std::fs::read_to_string(&out)
            .map(|s| s == "hello")
            .unwrap_or(false))
        .await
    );

    sup.kill();
    assert!(wait_until(WAIT, || !sup.is_running()).await);
}
