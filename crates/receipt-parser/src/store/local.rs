//! Document store over a local directory tree.
//!
//! Folder ids are subdirectories of the root and document ids are file
//! names, so a folder synced from a cloud drive can be processed offline.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use walkdir::WalkDir;

use super::{DocumentStore, SourceDocument, StoreError};

pub struct LocalFolderStore {
    root: PathBuf,
}

impl LocalFolderStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn folder_path(&self, folder_id: &str) -> PathBuf {
        if folder_id.is_empty() || folder_id == "." {
            self.root.clone()
        } else {
            self.root.join(folder_id)
        }
    }
}

#[async_trait]
impl DocumentStore for LocalFolderStore {
    async fn list(&self, folder_id: &str) -> Result<Vec<SourceDocument>, StoreError> {
        let folder = self.folder_path(folder_id);
        if !folder.is_dir() {
            return Err(StoreError::FolderNotFound(folder_id.to_string()));
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(&folder)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                debug!("Skipping non UTF-8 file name in {}", folder.display());
                continue;
            };

            let content_type = mime_guess::from_path(entry.path())
                .first_or_octet_stream()
                .essence_str()
                .to_string();

            let id = match folder_id {
                "" | "." => name.to_string(),
                _ => format!("{}/{}", folder_id, name),
            };
            documents.push(SourceDocument::new(id, name, content_type));
        }

        Ok(documents)
    }

    async fn download(&self, document: &SourceDocument) -> Result<Vec<u8>, StoreError> {
        let path = self.root.join(&document.id);
        if !path.is_file() {
            return Err(StoreError::DocumentNotFound(document.name.clone()));
        }

        tokio::fs::read(&path)
            .await
            .map_err(|e| StoreError::Io { path, source: e })
    }

    fn name(&self) -> &str {
        "local-folder"
    }
}
