use serde::{Deserialize, Serialize};

use crate::secrets::SecretSource;

pub const CONFIG_VERSION: &str = "1.0";
pub const DEFAULT_COMBINED_FILE_NAME: &str = "All_Receipts_Combined.xlsx";
pub const DEFAULT_DRIVE_API_BASE: &str = "https://www.googleapis.com";
pub const DEFAULT_MODEL: &str = "prebuilt-receipt";
pub const DEFAULT_API_VERSION: &str = "2023-07-31";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub version: String,
    pub output_directory: String,
    #[serde(default = "default_combined_file_name")]
    pub combined_file_name: String,
    pub source: SourceConfig,
    pub extraction: ExtractionConfig,
}

fn default_combined_file_name() -> String {
    DEFAULT_COMBINED_FILE_NAME.to_string()
}

/// Where raw receipts are listed and downloaded from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    Drive(DriveSourceConfig),
    Local(LocalSourceConfig),
}

impl SourceConfig {
    pub fn folder_id(&self) -> &str {
        match self {
            SourceConfig::Drive(drive) => &drive.folder_id,
            SourceConfig::Local(local) => &local.folder_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveSourceConfig {
    pub folder_id: String,
    #[serde(default = "default_drive_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub access_token: SecretSource,
}

fn default_drive_api_base() -> String {
    DEFAULT_DRIVE_API_BASE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSourceConfig {
    pub root: String,
    pub folder_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionConfig {
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub api_key: SecretSource,
    #[serde(default = "default_max_submit_attempts")]
    pub max_submit_attempts: u32,
    #[serde(default = "default_retry_after_secs")]
    pub default_retry_after_secs: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_max_submit_attempts() -> u32 {
    3
}

fn default_retry_after_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_max_poll_attempts() -> u32 {
    250
}
