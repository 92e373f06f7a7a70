// src/watch/mod.rs

//! Filesystem watching layer.
//!
//! - [`filter`] holds the pure predicates deciding which directories are
//!   watched and which change events are relevant.
//! - [`tree`] walks the project root once and registers every qualifying
//!   directory with `notify`, bridging events into an async channel.
//! - [`debounce`] coalesces bursts of relevant events into a single rebuild
//!   trigger per tick interval.

pub mod debounce;
pub mod filter;
pub mod tree;

pub use debounce::EventDebouncer;
pub use filter::PathFilter;
pub use tree::WatchTree;
