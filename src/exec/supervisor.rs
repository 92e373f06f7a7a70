// src/exec/supervisor.rs

use std::collections::BTreeMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::errors::{BuildError, RunError};

/// Handle to the currently live run subprocess.
///
/// Its presence in the shared slot is the sole signal that the app is
/// running; the reaper task clears the slot when the process exits. The
/// generation tag lets a stale reaper recognise that the slot has since been
/// handed to a newer process.
struct RunHandle {
    generation: u64,
    pid: Option<u32>,
    kill: oneshot::Sender<()>,
}

/// Owns the lifecycle of the build and run subprocesses.
///
/// Cloning is cheap and shares the same running-process slot, so the
/// orchestrator and tests can observe the run state concurrently with the
/// reaper.
#[derive(Clone)]
pub struct ProcessSupervisor {
    app_name: String,
    build_cmd: String,
    run_cmd: String,
    env: BTreeMap<String, String>,
    running: Arc<Mutex<Option<RunHandle>>>,
    generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for ProcessSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field("app_name", &self.app_name)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl ProcessSupervisor {
    pub fn new(cfg: &Config) -> Self {
        Self {
            app_name: cfg.app_name.clone(),
            build_cmd: cfg.build_cmd.clone(),
            run_cmd: cfg.run_cmd.clone(),
            env: cfg.env.clone(),
            running: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Whether a run subprocess is currently alive (not yet reaped).
    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Pid of the current run subprocess, if any.
    pub fn running_pid(&self) -> Option<u32> {
        self.running.lock().as_ref().and_then(|h| h.pid)
    }

    /// Run the build command through the platform shell and wait for it.
    ///
    /// Stdout passes through to the parent; stderr is captured so a failing
    /// build can report its diagnostics. Nonzero exit with captured stderr
    /// becomes [`BuildError::Output`] carrying that text; nonzero with an
    /// empty stderr becomes [`BuildError::Status`].
    pub async fn build(&self) -> Result<(), BuildError> {
        debug!(cmd = %self.build_cmd, "building");

        let mut cmd = shell_command(&self.build_cmd);
        cmd.stdout(Stdio::inherit()).stderr(Stdio::piped());

        let child = cmd.spawn().map_err(BuildError::Spawn)?;
        let output = child.wait_with_output().await.map_err(BuildError::Spawn)?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            Err(BuildError::Status(output.status.code().unwrap_or(-1)))
        } else {
            Err(BuildError::Output(stderr.to_string()))
        }
    }

    /// Launch the run command and track it until it exits.
    ///
    /// The command is executed directly (no shell interpretation), split on
    /// whitespace into program + arguments, with stdout/stderr attached to
    /// the parent's and the parent environment plus configured overrides.
    /// A background reaper waits for the exit, whatever its cause, and clears
    /// the running slot.
    pub fn start(&self) -> Result<(), RunError> {
        debug!(cmd = %self.run_cmd, "starting app");

        let mut parts = self.run_cmd.split_whitespace();
        let program = parts.next().ok_or(RunError::EmptyCommand)?;

        let mut cmd = Command::new(program);
        cmd.args(parts)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|source| RunError::Spawn {
            command: self.run_cmd.clone(),
            source,
        })?;

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let pid = child.id();
        let (kill_tx, kill_rx) = oneshot::channel::<()>();

        *self.running.lock() = Some(RunHandle {
            generation,
            pid,
            kill: kill_tx,
        });

        let running = Arc::clone(&self.running);
        let app_name = self.app_name.clone();
        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => match status {
                    Ok(status) => debug!(app = %app_name, %status, "app exited"),
                    Err(err) => debug!(app = %app_name, error = %err, "failed waiting for app"),
                },
                _ = kill_rx => {
                    if let Err(err) = child.start_kill() {
                        debug!(app = %app_name, error = %err, "kill failed (already exited?)");
                    }
                    let _ = child.wait().await;
                }
            }

            // Only clear the slot if it still belongs to this process.
            let mut slot = running.lock();
            if slot.as_ref().is_some_and(|h| h.generation == generation) {
                *slot = None;
            }
        });

        Ok(())
    }

    /// Forcefully terminate the current run subprocess, if any.
    ///
    /// Non-blocking: the reaper observes the exit asynchronously. Idempotent
    /// and safe when the process has already self-exited.
    pub fn kill(&self) {
        if let Some(handle) = self.running.lock().take() {
            debug!(app = %self.app_name, pid = ?handle.pid, "killing app");
            // Send fails if the reaper already saw the exit; nothing to do.
            let _ = handle.kill.send(());
        }
    }

    /// One full cycle: kill the previous instance, rebuild, start anew.
    ///
    /// Kill comes first so a stale instance never coexists with a build in
    /// progress (file locks, listening sockets). Failures are logged and
    /// short-circuit: a failed build never reaches `start`.
    pub async fn rebuild_and_run(&self) {
        info!(app = %self.app_name, "restarting");
        self.kill();

        if let Err(err) = self.build().await {
            error!(app = %self.app_name, "build failed: {err}");
            return;
        }
        if let Err(err) = self.start() {
            error!(app = %self.app_name, "start failed: {err}");
            return;
        }

        info!(app = %self.app_name, "app is running");
    }
}

/// Build a shell command appropriate for the platform.
fn shell_command(script: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(script);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(script);
        c
    }
}
