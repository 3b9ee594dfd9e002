use std::path::Path;

use crate::config::schema::{Config, SourceConfig, CONFIG_VERSION};
use crate::error::ConfigError;
use crate::naming;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(invalid(format!(
            "Unsupported config version: {}",
            config.version
        )));
    }

    if config.output_directory.trim().is_empty() {
        return Err(invalid("outputDirectory must not be empty"));
    }

    // The combined table lives next to the per-receipt tables, so it must
    // never be mistaken for one of them.
    let combined = &config.combined_file_name;
    if combined.is_empty() || combined.contains('/') || combined.contains('\\') {
        return Err(invalid(format!(
            "combinedFileName must be a bare file name: '{}'",
            combined
        )));
    }
    if naming::is_output_table_name(combined) {
        return Err(invalid(format!(
            "combinedFileName '{}' collides with the parsed-table pattern '*{}'",
            combined,
            naming::OUTPUT_SUFFIX
        )));
    }

    if config.source.folder_id().trim().is_empty() {
        return Err(invalid("source.folderId must not be empty"));
    }
    match &config.source {
        SourceConfig::Drive(drive) => {
            if drive.api_base.trim().is_empty() {
                return Err(invalid("source.apiBase must not be empty"));
            }
            if !drive.access_token.is_configured() {
                return Err(invalid("source.accessToken must name a value, file, or envVar"));
            }
        }
        SourceConfig::Local(local) => {
            if local.root.trim().is_empty() {
                return Err(invalid("source.root must not be empty"));
            }
        }
    }

    let extraction = &config.extraction;
    if extraction.endpoint.trim().is_empty() {
        return Err(invalid("extraction.endpoint must not be empty"));
    }
    if extraction.model.trim().is_empty() {
        return Err(invalid("extraction.model must not be empty"));
    }
    if !extraction.api_key.is_configured() {
        return Err(invalid("extraction.apiKey must name a value, file, or envVar"));
    }
    if extraction.max_submit_attempts == 0 {
        return Err(invalid("extraction.maxSubmitAttempts must be at least 1"));
    }
    if extraction.max_poll_attempts == 0 {
        return Err(invalid("extraction.maxPollAttempts must be at least 1"));
    }

    Ok(())
}
