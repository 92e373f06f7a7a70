// src/config/mod.rs

//! Configuration layer.
//!
//! - [`model`] holds the serde structs (`ConfigFile`) and the resolved
//!   [`Config`] record the rest of the application consumes read-only.
//! - [`loader`] reads/validates the TOML file and writes the `init` template.

pub mod loader;
pub mod model;

pub use loader::{load_and_validate, write_template};
pub use model::{Config, ConfigFile};
