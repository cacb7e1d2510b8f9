//! Environment variable parsing for engine settings.
//!
//! Responsibilities:
//! - Read and parse `FETCHBOARD_*` environment variables.
//! - Apply environment variable values to an [`EngineSettings`] instance.
//! - Load a `.env` file before any environment variable is read.
//!
//! Does NOT handle:
//! - CLI flag parsing (the CLI applies its flags after `apply_env`, so flags
//!   take precedence over the environment).
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).
//! - Invalid numeric values return `ConfigError::InvalidValue`.

use std::time::Duration;

use crate::constants::MAX_TIMEOUT_SECS;
use crate::error::ConfigError;
use crate::types::EngineSettings;

/// Read an environment variable, returning None if unset, empty, or
/// whitespace-only. Returns the trimmed value if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Load a `.env` file from the current directory, if one exists.
///
/// A missing file is not an error; a present but unreadable file is.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded .env file");
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::DotenvFailed(e.to_string())),
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        var: key.to_string(),
        message: expected.to_string(),
    })
}

/// Apply `FETCHBOARD_*` environment variable overrides to `settings`.
pub fn apply_env(settings: &mut EngineSettings) -> Result<(), ConfigError> {
    if let Some(timeout) = env_var_or_none("FETCHBOARD_TIMEOUT") {
        let secs: u64 = parse_var("FETCHBOARD_TIMEOUT", &timeout, "must be a number of seconds")?;
        if secs == 0 || secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                var: "FETCHBOARD_TIMEOUT".to_string(),
                message: format!("must be between 1 and {MAX_TIMEOUT_SECS} seconds"),
            });
        }
        settings.timeout = Duration::from_secs(secs);
    }
    if let Some(pages) = env_var_or_none("FETCHBOARD_MAX_PAGES") {
        settings.max_pages = parse_var(
            "FETCHBOARD_MAX_PAGES",
            &pages,
            "must be a positive integer",
        )?;
    }
    if let Some(concurrency) = env_var_or_none("FETCHBOARD_CONCURRENCY") {
        settings.concurrency = parse_var(
            "FETCHBOARD_CONCURRENCY",
            &concurrency,
            "must be a positive integer",
        )?;
    }
    if let Some(grace) = env_var_or_none("FETCHBOARD_SHUTDOWN_GRACE") {
        let secs: u64 = parse_var(
            "FETCHBOARD_SHUTDOWN_GRACE",
            &grace,
            "must be a number of seconds",
        )?;
        settings.shutdown_grace = Duration::from_secs(secs);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_or_none_filters_empty_and_whitespace() {
        temp_env::with_var("FETCHBOARD_TEST_VAR", Some("  "), || {
            assert_eq!(env_var_or_none("FETCHBOARD_TEST_VAR"), None);
        });
        temp_env::with_var("FETCHBOARD_TEST_VAR", Some(" value "), || {
            assert_eq!(
                env_var_or_none("FETCHBOARD_TEST_VAR"),
                Some("value".to_string())
            );
        });
        temp_env::with_var_unset("FETCHBOARD_TEST_VAR", || {
            assert_eq!(env_var_or_none("FETCHBOARD_TEST_VAR"), None);
        });
    }

    #[test]
    fn test_apply_env_overrides_settings() {
        temp_env::with_vars(
            [
                ("FETCHBOARD_TIMEOUT", Some("10")),
                ("FETCHBOARD_MAX_PAGES", Some("3")),
                ("FETCHBOARD_CONCURRENCY", Some("2")),
            ],
            || {
                let mut settings = EngineSettings::default();
                apply_env(&mut settings).unwrap();
                assert_eq!(settings.timeout, Duration::from_secs(10));
                assert_eq!(settings.max_pages, 3);
                assert_eq!(settings.concurrency, 2);
            },
        );
    }

    #[test]
    fn test_apply_env_rejects_bad_numbers() {
        temp_env::with_var("FETCHBOARD_TIMEOUT", Some("soon"), || {
            let mut settings = EngineSettings::default();
            let err = apply_env(&mut settings).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }));
        });
    }

    #[test]
    fn test_apply_env_rejects_zero_timeout() {
        temp_env::with_var("FETCHBOARD_TIMEOUT", Some("0"), || {
            let mut settings = EngineSettings::default();
            assert!(apply_env(&mut settings).is_err());
        });
    }
}
