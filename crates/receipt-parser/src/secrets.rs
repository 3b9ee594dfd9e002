//! Secret resolution for service credentials.
//!
//! Credentials can be supplied three ways, checked in priority order:
//!
//! 1. **Direct value** - for quick local testing (`{"value": "..."}`)
//! 2. **File reference** - Docker secrets pattern (`{"file": "/run/secrets/azure"}`)
//! 3. **Env var reference** - deployment environments (`{"envVar": "AZURE_KEY"}`)

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided for {label} (need one of: direct value, file path, or env var name)")]
    NoSourceProvided { label: String },

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// The three places a credential may come from, as written in the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretSource {
    pub value: Option<String>,
    pub file: Option<String>,
    pub env_var: Option<String>,
}

impl SecretSource {
    pub fn from_env_var(name: &str) -> Self {
        Self {
            env_var: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn from_value(value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
            ..Self::default()
        }
    }

    /// True if at least one non-empty source is configured.
    pub fn is_configured(&self) -> bool {
        [&self.value, &self.file, &self.env_var]
            .iter()
            .any(|s| s.as_deref().is_some_and(|s| !s.is_empty()))
    }

    /// Resolves the secret; `label` names the credential in error messages.
    pub fn resolve(&self, label: &str) -> Result<SecretString> {
        if let Some(value) = non_empty(&self.value) {
            return Ok(SecretString::from(value.to_string()));
        }

        if let Some(path) = non_empty(&self.file) {
            let expanded = expand_home(path);
            return fs::read_to_string(&expanded)
                .map(|content| SecretString::from(content.trim().to_string()))
                .map_err(|source| SecretError::FileReadError {
                    path: expanded,
                    source,
                });
        }

        if let Some(name) = non_empty(&self.env_var) {
            return match std::env::var(name) {
                // Env vars set from files often carry a trailing newline
                Ok(value) => Ok(SecretString::from(value.trim().to_string())),
                Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                    name: name.to_string(),
                }),
                Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                    name: name.to_string(),
                }),
            };
        }

        Err(SecretError::NoSourceProvided {
            label: label.to_string(),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Expands a leading `~` to the user's home directory (HOME, then USERPROFILE).
/// `~user/path` is not supported.
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
