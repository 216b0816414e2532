//! Configuration module for stitchbook
//!
//! Provides types and loading for the optional `stitch.toml` file.

pub mod loader;
pub mod schema;

pub use loader::{find_config, find_config_from, load_config, ConfigError, Overrides, CONFIG_FILE};
pub use schema::*;
