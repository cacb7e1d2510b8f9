//! The secret map supplied at process startup.
//!
//! Responsibilities:
//! - Parse repeated `name=value` command-line entries into a secret map.
//! - Keep secret values wrapped in [`SecretString`] so they never leak
//!   through `Debug` or log output.
//!
//! Does NOT handle:
//! - Substitution of `$NAME` references inside request specifications
//!   (see the engine crate's resolver).
//!
//! Invariants:
//! - The map is read-only once the engine is running; secrets are supplied
//!   once per process lifetime.
//! - `Debug` output lists secret names only, never values.

use std::collections::HashMap;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// Named secrets available for `$NAME` substitution in query configuration.
#[derive(Clone, Default)]
pub struct SecretMap {
    entries: HashMap<String, SecretString>,
}

impl SecretMap {
    /// Create an empty secret map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `name=value` entries, e.g. CLI `--secret` arguments.
    ///
    /// The value may itself contain `=` characters; only the first one
    /// separates the name.
    pub fn parse_entries<I, T>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut map = Self::new();
        for entry in entries {
            map.insert_entry(entry.as_ref())?;
        }
        Ok(map)
    }

    /// Parse and insert a single `name=value` entry.
    pub fn insert_entry(&mut self, entry: &str) -> Result<(), ConfigError> {
        match entry.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                self.insert(name.trim(), value);
                Ok(())
            }
            _ => Err(ConfigError::InvalidSecretEntry {
                entry: entry.to_string(),
            }),
        }
    }

    /// Insert a secret by name, replacing any previous value.
    pub fn insert(&mut self, name: &str, value: &str) {
        self.entries
            .insert(name.to_string(), SecretString::new(value.into()));
    }

    /// Expose the secret named `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|s| s.expose_secret())
    }

    /// True if a secret with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for SecretMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("SecretMap").field("names", &names).finish()
    }
}
