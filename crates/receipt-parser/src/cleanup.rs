use std::io;
use std::path::Path;

use log::{info, warn};

use crate::error::CleanupError;
use crate::outputs::OutputDirectory;
use crate::sanitize;

/// Deletes every per-document output table.
///
/// Returns the names actually deleted. A file that cannot be removed is
/// logged and left in place; the combined table is never touched.
pub fn cleanup(outputs: &OutputDirectory) -> Result<Vec<String>, CleanupError> {
    cleanup_with(outputs, |path| std::fs::remove_file(path))
}

/// Like [`cleanup`], deleting each table with `remove`.
pub fn cleanup_with<F>(outputs: &OutputDirectory, remove: F) -> Result<Vec<String>, CleanupError>
where
    F: Fn(&Path) -> io::Result<()>,
{
    let mut deleted = Vec::new();

    for path in outputs.list_tables()? {
        let name = sanitize::redact_path(&path);
        match remove(&path) {
            Ok(()) => deleted.push(name),
            Err(e) => warn!("Failed to delete {}: {}", name, e),
        }
    }

    info!("Deleted {} output tables", deleted.len());
    Ok(deleted)
}
