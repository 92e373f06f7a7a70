// src/watch/tree.rs

use std::fs;
use std::path::{Path, PathBuf};

use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::WatchInitError;
use crate::watch::filter::PathFilter;

/// The set of watched directories plus the live notification source.
///
/// Built once at startup by a pruning walk of the project root; directories
/// created afterwards are not picked up (known limitation). Dropping this
/// stops file watching.
pub struct WatchTree {
    _watcher: RecommendedWatcher,
    events: mpsc::UnboundedReceiver<Event>,
    watched: Vec<PathBuf>,
}

impl std::fmt::Debug for WatchTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchTree")
            .field("watched", &self.watched.len())
            .finish_non_exhaustive()
    }
}

impl WatchTree {
    /// Walk `root` once, registering every directory that passes `filter`.
    ///
    /// Registration is per-directory and non-recursive; many platforms have no
    /// recursive-watch primitive, so the manual walk is the baseline. A
    /// directory rejected by the filter prunes its entire subtree. The first
    /// walk or registration failure aborts initialization: a partially
    /// watched tree would silently miss changes.
    pub fn initialize(root: &Path, filter: &PathFilter) -> Result<Self, WatchInitError> {
        // Channel from the blocking notify callback into the async world.
        let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    // Receiver dropped means we are shutting down.
                    let _ = event_tx.send(event);
                }
                Err(err) => {
                    eprintln!("watchrun: file watch error: {err}");
                }
            },
            NotifyConfig::default(),
        )
        .map_err(WatchInitError::Create)?;

        let mut watched = Vec::new();
        register_tree(&mut watcher, root, filter, &mut watched)?;

        info!(dirs = watched.len(), "file watcher initialized on {:?}", root);

        Ok(Self {
            _watcher: watcher,
            events: event_rx,
            watched,
        })
    }

    /// Receive the next raw change event. `None` once the watcher backend has
    /// shut down.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    /// Absolute paths of all directories registered at startup.
    pub fn watched_dirs(&self) -> &[PathBuf] {
        &self.watched
    }
}

/// Recursive pruning descent: register `dir`, then recurse into child
/// directories that pass the filter. Regular files are never registered;
/// notification granularity is per-directory.
fn register_tree(
    watcher: &mut RecommendedWatcher,
    dir: &Path,
    filter: &PathFilter,
    watched: &mut Vec<PathBuf>,
) -> Result<(), WatchInitError> {
    debug!("watch dir: {:?}", dir);
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|source| WatchInitError::Register {
            path: dir.to_path_buf(),
            source,
        })?;
    watched.push(dir.to_path_buf());

    let entries = fs::read_dir(dir).map_err(|source| WatchInitError::Walk {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| WatchInitError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        let file_type = entry.file_type().map_err(|source| WatchInitError::Walk {
            path: entry.path(),
            source,
        })?;
        if file_type.is_dir() {
            let path = entry.path();
            if filter.should_watch_dir(&path) {
                register_tree(watcher, &path, filter, watched)?;
            }
        }
    }

    Ok(())
}
