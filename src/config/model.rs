// src/config/model.rs

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

/// Extensions watched when the config leaves `extensions` empty.
pub const DEFAULT_EXTENSIONS: &str = ".rs,.toml,.ini,.yml";

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// app_name = "myapp"
/// root = "./"
/// exclude_dirs = "target,tmp"
/// extensions = ".rs,.toml"
/// build_cmd = "cargo build"
/// run_cmd = "./target/debug/myapp"
///
/// [env]
/// PORT = "8080"
/// ```
///
/// Everything except the two commands is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Display name used in log messages.
    #[serde(default)]
    pub app_name: String,

    /// Project root to watch. Empty means the current working directory.
    #[serde(default)]
    pub root: String,

    /// Comma-separated directory names/paths excluded from watching,
    /// resolved relative to `root`.
    #[serde(default)]
    pub exclude_dirs: String,

    /// Comma-separated file extensions (with or without leading dot) whose
    /// changes trigger a rebuild. Empty means [`DEFAULT_EXTENSIONS`].
    #[serde(default)]
    pub extensions: String,

    /// Build command, run through the platform shell (pipes/globs allowed).
    pub build_cmd: String,

    /// Run command, executed directly with no shell interpretation.
    pub run_cmd: String,

    /// Extra environment variables for the run command. Keys here replace
    /// inherited variables of the same name.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Whether metadata-only events (e.g. chmod) should trigger a rebuild.
    #[serde(default)]
    pub rebuild_on_metadata: bool,
}

/// Resolved configuration record. Created once before the watch loop starts
/// and immutable thereafter.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    /// Absolute, canonicalized project root.
    pub root: PathBuf,
    /// Absolute paths of excluded directories.
    pub exclude_dirs: HashSet<PathBuf>,
    /// Watched extensions, without the leading dot.
    pub extensions: HashSet<String>,
    pub build_cmd: String,
    pub run_cmd: String,
    pub env: BTreeMap<String, String>,
    pub rebuild_on_metadata: bool,
}

impl ConfigFile {
    /// Resolve paths and comma-separated lists into the immutable [`Config`]
    /// record consumed by the watch/build/run pipeline.
    pub fn resolve(self) -> Result<Config> {
        if self.build_cmd.trim().is_empty() {
            return Err(anyhow!("build_cmd must not be empty"));
        }
        if self.run_cmd.trim().is_empty() {
            return Err(anyhow!("run_cmd must not be empty"));
        }

        let root = if self.root.trim().is_empty() {
            std::env::current_dir().context("resolving current directory as project root")?
        } else {
            PathBuf::from(self.root.trim())
        };
        let root = root
            .canonicalize()
            .with_context(|| format!("resolving project root {:?}", root))?;
        if !root.is_dir() {
            return Err(anyhow!("project root {:?} is not a directory", root));
        }

        let exclude_dirs = split_list(&self.exclude_dirs)
            .map(|entry| resolve_under(&root, entry))
            .collect();

        let extensions_src = if self.extensions.trim().is_empty() {
            DEFAULT_EXTENSIONS
        } else {
            self.extensions.as_str()
        };
        let extensions = split_list(extensions_src)
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect();

        Ok(Config {
            app_name: self.app_name,
            root,
            exclude_dirs,
            extensions,
            build_cmd: self.build_cmd,
            run_cmd: self.run_cmd,
            env: self.env,
            rebuild_on_metadata: self.rebuild_on_metadata,
        })
    }
}

/// Split a comma-separated config value, trimming and dropping empties.
fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Resolve an exclusion entry to an absolute path under `root`.
///
/// Canonicalization is best-effort: the directory may not exist yet, in which
/// case the joined path is used as-is.
fn resolve_under(root: &Path, entry: &str) -> PathBuf {
    let path = Path::new(entry);
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };
    joined.canonicalize().unwrap_or(joined)
}
