// src/errors.rs

//! Structured error types for the watch/build/run pipeline.
//!
//! Only `WatchInitError` is fatal (it aborts startup). Build and run failures
//! are recovered locally: the supervisor logs them and waits for the next
//! trigger.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while setting up the filesystem watch tree. Fatal at startup:
/// a partially-watched tree would give a false sense of coverage, so the
/// first failure aborts instead of continuing.
#[derive(Error, Debug)]
pub enum WatchInitError {
    #[error("failed to create file watcher: {0}")]
    Create(#[source] notify::Error),

    #[error("failed to read directory {path:?}: {source}")]
    Walk {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to watch directory {path:?}: {source}")]
    Register {
        path: PathBuf,
        source: notify::Error,
    },
}

/// Failure of the build command.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("failed to spawn build command: {0}")]
    Spawn(#[source] std::io::Error),

    /// Nonzero exit with captured stderr; the message is the stderr text.
    #[error("{0}")]
    Output(String),

    /// Nonzero exit with nothing on stderr.
    #[error("build command exited with code {0}")]
    Status(i32),
}

/// Failure to launch the run command.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("run_cmd is empty")]
    EmptyCommand,

    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
}
