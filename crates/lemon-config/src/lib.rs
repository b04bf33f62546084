//! Configuration system for the Lemon console gateway.
//!
//! Provides TOML-based configuration with:
//! - An `[upstream]` section naming the Lemon API base URL and call timeout
//! - A `[server]` section for the listener, cookie environment and CORS
//! - Config file layering (user config dir + project-local overrides)
//!
//! The gateway itself never reads files or environment variables; the
//! binary resolves a [`LemonConfig`] here and hands the gateway plain values.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config, load_config_file, load_config_with_options, user_config_dir,
    user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
