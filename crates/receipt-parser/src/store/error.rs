use std::path::PathBuf;

use thiserror::Error;

use crate::secrets::SecretError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Document store request failed: {0}")]
    Transport(String),

    #[error("Document store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed document store response: {0}")]
    MalformedResponse(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document store credentials unavailable: {0}")]
    Credentials(#[from] SecretError),
}
