//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Upstream base URL is not an absolute http(s) URL.
    #[error("invalid upstream base URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    /// Bind address could not be parsed.
    #[error("invalid bind address '{0}'")]
    InvalidBind(String),
}
