//! Read-only access to the folder of source receipts.

pub mod drive;
pub mod error;
pub mod local;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SourceConfig;

pub use drive::DriveStore;
pub use error::StoreError;
pub use local::LocalFolderStore;

pub const GOOGLE_SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A file in the source folder. Enumerated each run, never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocument {
    pub id: String,
    pub name: String,
    pub content_type: String,
}

impl SourceDocument {
    pub fn new(id: impl Into<String>, name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content_type: content_type.into(),
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents directly inside `folder_id`, in the store's listing order.
    async fn list(&self, folder_id: &str) -> Result<Vec<SourceDocument>, StoreError>;

    async fn download(&self, document: &SourceDocument) -> Result<Vec<u8>, StoreError>;

    /// Store name for logging.
    fn name(&self) -> &str;
}

/// Builds the store named by the source configuration.
pub fn store_from_config(config: &SourceConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config {
        SourceConfig::Drive(drive) => Ok(Arc::new(DriveStore::from_config(drive)?)),
        SourceConfig::Local(local) => Ok(Arc::new(LocalFolderStore::new(&local.root))),
    }
}
