use std::path::PathBuf;

use thiserror::Error;

pub use crate::extraction::ExtractionError;
pub use crate::pipeline::PipelineError;
pub use crate::secrets::SecretError;
pub use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ReceiptError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("Cleanup error: {0}")]
    Cleanup(#[from] CleanupError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write table '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode workbook '{path}': {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Failed to read workbook '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Workbook '{0}' contains no worksheet")]
    EmptyWorkbook(PathBuf),
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("No parsed output tables are available")]
    NoOutputsAvailable,

    #[error("Output file '{0}' not found")]
    NotFound(String),

    #[error("Invalid output file name '{0}'")]
    InvalidName(String),

    #[error("Invalid output listing pattern: {0}")]
    Pattern(String),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build archive: {0}")]
    Archive(String),
}

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("No parsed output tables are available")]
    NoOutputsAvailable,

    #[error("Output directory is busy with another operation")]
    Busy,

    #[error(transparent)]
    Outputs(#[from] OutputError),

    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("Output directory is busy with another operation")]
    Busy,

    #[error(transparent)]
    Outputs(#[from] OutputError),
}

pub type Result<T> = std::result::Result<T, ReceiptError>;
