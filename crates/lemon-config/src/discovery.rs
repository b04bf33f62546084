//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/lemon-console/config.toml` (user config)
//! 2. `./lemon.toml` (project-local)
//! 3. CLI arguments and environment (handled by the binary)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{ConfigError, LemonConfig, Result};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "lemon.toml";

/// Default config filename within the user config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for config directory resolution.
const APP_NAME: &str = "lemon-console";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "LEMON_CONFIG_DIR";

/// Tracks where each config layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: LemonConfig,
    /// Sources that were checked, lowest precedence first.
    pub sources: Vec<ConfigSource>,
    /// Warnings generated during loading (e.g. unparseable files).
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }

    /// Merge the file at `path` on top of the current config.
    ///
    /// A missing file is skipped and a file that does not parse becomes a
    /// warning. A file that exists but cannot be read is an error.
    fn layer(&mut self, path: PathBuf) -> Result<()> {
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.sources.push(ConfigSource {
                    path,
                    loaded: false,
                });
                return Ok(());
            }
            Err(source) => {
                return Err(ConfigError::ReadFile {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        let loaded = match LemonConfig::from_toml(&contents) {
            Ok(layer) => {
                self.config.merge(layer);
                true
            }
            Err(e) => {
                self.warnings
                    .push(format!("Failed to load {}: {}", path.display(), e));
                false
            }
        };
        self.sources.push(ConfigSource { path, loaded });
        Ok(())
    }
}

/// Load configuration by discovering and merging all config layers.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Load configuration with explicit control over the user config directory.
///
/// `config_dir` overrides both `LEMON_CONFIG_DIR` and the platform default.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let mut loaded = LoadedConfig::default();
    for path in layer_paths(project_dir, config_dir) {
        loaded.layer(path)?;
    }
    Ok(loaded)
}

/// Candidate config files, lowest precedence first.
fn layer_paths(project_dir: Option<&Path>, config_dir: Option<&Path>) -> Vec<PathBuf> {
    let user = match config_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => user_config_path(),
    };
    let project = project_dir.map_or_else(
        || PathBuf::from(PROJECT_CONFIG_FILE),
        |dir| dir.join(PROJECT_CONFIG_FILE),
    );
    user.into_iter().chain(std::iter::once(project)).collect()
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<LemonConfig> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    LemonConfig::from_toml(&contents)
}

/// Path of the user-level config file.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// User-level config directory.
///
/// Checks `LEMON_CONFIG_DIR` first, then falls back to the platform default.
pub fn user_config_dir() -> Option<PathBuf> {
    match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|d| d.join(APP_NAME)),
    }
}
