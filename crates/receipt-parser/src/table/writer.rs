use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use super::TableCodec;
use crate::error::TableError;
use crate::naming;
use crate::normalize::ReceiptRecord;

/// Persists one output table per source document.
pub struct TableWriter {
    output_directory: PathBuf,
    codec: Arc<dyn TableCodec>,
}

impl TableWriter {
    pub fn new<P: AsRef<Path>>(output_directory: P, codec: Arc<dyn TableCodec>) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
            codec,
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Path the table for `document_name` is written to.
    pub fn output_path(&self, document_name: &str) -> PathBuf {
        self.output_directory
            .join(naming::output_file_name(document_name))
    }

    /// Whether a table for `document_name` is already in the output directory.
    pub fn has_output(&self, document_name: &str) -> bool {
        self.output_path(document_name).is_file()
    }

    /// Writes the record, replacing any table previously written for the same name.
    pub fn write(&self, record: &ReceiptRecord, document_name: &str) -> Result<PathBuf, TableError> {
        self.ensure_directory()?;

        let path = self.output_path(document_name);
        self.codec.write_table(&record.to_table(), &path)?;

        debug!("Wrote {} rows to {}", record.len(), path.display());
        Ok(path)
    }

    fn ensure_directory(&self) -> Result<(), TableError> {
        if !self.output_directory.exists() {
            std::fs::create_dir_all(&self.output_directory).map_err(|e| {
                TableError::CreateDirectory {
                    path: self.output_directory.clone(),
                    source: e,
                }
            })?;
        }
        Ok(())
    }
}
