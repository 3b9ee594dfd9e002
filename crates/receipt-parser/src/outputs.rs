//! The output directory: per-document tables plus the combined table.

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::OutputError;
use crate::naming::OUTPUT_SUFFIX;

#[derive(Debug, Clone)]
pub struct OutputDirectory {
    root: PathBuf,
    combined_file_name: String,
}

impl OutputDirectory {
    pub fn new<P: AsRef<Path>>(root: P, combined_file_name: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            combined_file_name: combined_file_name.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn combined_file_name(&self) -> &str {
        &self.combined_file_name
    }

    pub fn combined_path(&self) -> PathBuf {
        self.root.join(&self.combined_file_name)
    }

    /// Paths of all per-document output tables, sorted by file name.
    ///
    /// A missing directory has no tables. The combined table is never
    /// included even if its name happens to match.
    pub fn list_tables(&self) -> Result<Vec<PathBuf>, OutputError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let pattern = format!(
            "{}/*{}",
            Pattern::escape(&self.root.to_string_lossy()),
            OUTPUT_SUFFIX
        );
        let entries = glob::glob(&pattern).map_err(|e| OutputError::Pattern(e.to_string()))?;

        let mut tables = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => {
                    if !path.is_file() {
                        continue;
                    }
                    let is_combined = path
                        .file_name()
                        .map(|n| n == self.combined_file_name.as_str())
                        .unwrap_or(false);
                    if !is_combined {
                        tables.push(path);
                    }
                }
                Err(e) => warn!("Skipping unreadable output entry: {}", e),
            }
        }

        tables.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(tables)
    }

    /// File names of all per-document output tables, sorted.
    pub fn list_names(&self) -> Result<Vec<String>, OutputError> {
        Ok(self
            .list_tables()?
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect())
    }

    /// Resolves a bare file name to an existing file in the directory.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, OutputError> {
        let is_bare = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0']);
        if !is_bare {
            return Err(OutputError::InvalidName(name.to_string()));
        }

        let path = self.root.join(name);
        if !path.is_file() {
            return Err(OutputError::NotFound(name.to_string()));
        }
        Ok(path)
    }

    /// Writes every output table into a ZIP archive under its bare file name.
    ///
    /// Returns the number of archived tables.
    pub fn archive<W: Write + Seek>(&self, writer: W) -> Result<usize, OutputError> {
        let tables = self.list_tables()?;
        if tables.is_empty() {
            return Err(OutputError::NoOutputsAvailable);
        }

        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut buffer = Vec::new();

        for path in &tables {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| OutputError::InvalidName(path.display().to_string()))?;

            buffer.clear();
            File::open(path)
                .and_then(|mut f| f.read_to_end(&mut buffer))
                .map_err(|e| OutputError::Io {
                    path: path.clone(),
                    source: e,
                })?;

            zip.start_file(name, options)
                .map_err(|e| OutputError::Archive(e.to_string()))?;
            zip.write_all(&buffer)
                .map_err(|e| OutputError::Archive(e.to_string()))?;
            debug!("Archived {}", name);
        }

        zip.finish()
            .map_err(|e| OutputError::Archive(e.to_string()))?;
        Ok(tables.len())
    }
}
