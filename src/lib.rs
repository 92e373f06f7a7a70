// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod watch;

use std::path::Path;

use anyhow::Result;

use crate::cli::{CliArgs, Command};
use crate::engine::Orchestrator;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the watch tree + debouncer + process supervisor
/// - signal handling
pub async fn run(args: CliArgs) -> Result<()> {
    if let Some(Command::Init { name }) = args.command {
        let name = name.unwrap_or_else(cwd_name);
        config::write_template(Path::new(&args.config), &name)?;
        println!("wrote {}", args.config);
        return Ok(());
    }

    let cfg = config::load_and_validate(Path::new(&args.config))?;
    let orchestrator = Orchestrator::new(&cfg)?;
    orchestrator.run().await
}

/// App name default for `init`: the current directory's base name.
fn cwd_name() -> String {
    std::env::current_dir()
        .ok()
        .and_then(|dir| {
            dir.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "app".to_string())
}
