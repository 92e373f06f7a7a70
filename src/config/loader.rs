// src/config/loader.rs

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use crate::config::model::{Config, ConfigFile};

const CONFIG_TEMPLATE: &str = r#"app_name = "{app_name}"
root = "./"
exclude_dirs = "target"
extensions = ".rs,.toml"
build_cmd = "cargo build"
run_cmd = "./target/debug/{app_name}"
"#;

/// Load a configuration file from a given path and return the raw `ConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// the resolved [`Config`] record.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading config file at {:?}", path))?;

    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML config from {:?}", path))?;

    Ok(config)
}

/// Load a configuration file and resolve it.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (extensions, root = cwd).
/// - Resolves the root and exclusion paths to absolute paths.
/// - Rejects empty build/run commands.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    load_from_path(path)?
        .resolve()
        .with_context(|| format!("validating config from {:?}", path))
}

/// Write a starter config file for `watchrun init`.
///
/// Refuses to overwrite an existing file.
pub fn write_template(path: impl AsRef<Path>, app_name: &str) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Err(anyhow!("{:?} already exists", path));
    }
    let contents = CONFIG_TEMPLATE.replace("{app_name}", app_name);
    fs::write(path, contents).with_context(|| format!("writing config template to {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_round_trips_through_the_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Watchrun.toml");

        write_template(&path, "demo").unwrap();
        let raw = load_from_path(&path).unwrap();
        assert_eq!(raw.app_name, "demo");
        assert_eq!(raw.run_cmd, "./target/debug/demo");
    }

    #[test]
    fn template_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Watchrun.toml");

        write_template(&path, "demo").unwrap();
        assert!(write_template(&path, "other").is_err());
    }

    #[test]
    fn missing_commands_fail_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Watchrun.toml");
        fs::write(&path, "app_name = \"demo\"\n").unwrap();

        assert!(load_and_validate(&path).is_err());
    }
}
