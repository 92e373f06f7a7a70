#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;

use watchrun::config::Config;

/// Minimal resolved config for tests: watches `.go` files under `root`.
pub fn config(root: &Path, build_cmd: &str, run_cmd: &str) -> Config {
    Config {
        app_name: "test-app".into(),
        root: root.canonicalize().expect("canonicalize test root"),
        exclude_dirs: HashSet::new(),
        extensions: ["go".to_string()].into_iter().collect(),
        build_cmd: build_cmd.into(),
        run_cmd: run_cmd.into(),
        env: BTreeMap::new(),
        rebuild_on_metadata: false,
    }
}

/// Poll `predicate` every 25ms until it holds or `timeout` elapses.
pub async fn wait_until(timeout: Duration, predicate: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if predicate() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

/// Number of lines in the file, or 0 if it does not exist yet.
pub fn line_count(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .count()
}
