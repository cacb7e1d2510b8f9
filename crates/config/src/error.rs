//! Error types for configuration loading.

use thiserror::Error;

/// Errors that can occur while assembling engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable or CLI value failed validation.
    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    /// A secret entry did not follow the `name=value` syntax.
    #[error("Invalid secret entry {entry:?}: expected name=value")]
    InvalidSecretEntry { entry: String },

    /// A `.env` file was present but could not be read.
    #[error("Failed to load .env file: {0}")]
    DotenvFailed(String),
}
