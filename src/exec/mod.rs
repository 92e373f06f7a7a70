// src/exec/mod.rs

//! Process execution layer.
//!
//! [`supervisor`] owns the build and run subprocesses: the build command runs
//! through the platform shell and blocks until completion, the run command is
//! launched directly and tracked until it is killed or self-exits.

pub mod supervisor;

pub use supervisor::ProcessSupervisor;
