//! Test harness for isolated test execution.
//!
//! Each `TestHarness` owns a temporary directory holding the output
//! directory and a config file, and wires a `ReceiptService` to in-memory
//! collaborators.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use receipt_parser::config::{load_config_from_str, Config};
use receipt_parser::table::{Table, TableCodec, XlsxCodec};
use receipt_parser::ReceiptService;

use super::fakes::{MemoryStore, ScriptedExtraction};

pub struct TestHarness {
    temp_dir: TempDir,
    pub output_dir: PathBuf,
    pub config: Config,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let output_dir = temp_dir.path().join("outputs");

        let config_json = json!({
            "version": "1.0",
            "outputDirectory": output_dir.to_string_lossy(),
            "source": {
                "kind": "local",
                "root": temp_dir.path().to_string_lossy(),
                "folderId": "inbox"
            },
            "extraction": {
                "endpoint": "https://example.cognitiveservices.azure.com",
                "apiKey": { "value": "test-key" }
            }
        });
        let config =
            load_config_from_str(&config_json.to_string()).expect("Failed to load test config");

        Self {
            temp_dir,
            output_dir,
            config,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Service over the given collaborators, sharing this harness's directory.
    pub fn service(
        &self,
        store: Arc<MemoryStore>,
        extraction: Arc<ScriptedExtraction>,
    ) -> ReceiptService {
        ReceiptService::with_collaborators(&self.config, store, extraction)
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    pub fn combined_path(&self) -> PathBuf {
        self.output_dir.join(&self.config.combined_file_name)
    }

    pub fn read_table(&self, name: &str) -> Table {
        XlsxCodec::new()
            .read_table(&self.output_path(name))
            .expect("Failed to read output table")
    }

    /// Sorted names of every file in the output directory.
    pub fn output_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.output_dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
