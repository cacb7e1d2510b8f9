//! Configuration management for fetchboard.
//!
//! This crate provides the shared constants, engine settings, and the secret
//! map consumed by the query engine and the CLI. Query-set snapshots are not
//! loaded here; they come from the config-source collaborator owned by the
//! scheduler.

pub mod constants;
mod env;
mod error;
mod secrets;
mod types;

pub use env::{apply_env, env_var_or_none, load_dotenv};
pub use error::ConfigError;
pub use secrets::SecretMap;
pub use types::EngineSettings;
