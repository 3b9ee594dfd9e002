use std::path::PathBuf;

use crate::config::Config;

pub struct PipelineConfig {
    pub folder_id: String,
    pub output_directory: PathBuf,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            folder_id: config.source.folder_id().to_string(),
            output_directory: PathBuf::from(&config.output_directory),
        }
    }
}
