//! Entry point for callers: runs the pipeline and the on-demand operations
//! against one output directory.

use std::io::{Seek, Write};
use std::path::PathBuf;
use std::sync::Arc;

use log::info;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::{CleanupError, MergeError, OutputError, Result};
use crate::extraction::{AzureReceiptService, ExtractionClient, ExtractionService, ExtractionSettings};
use crate::guard::DirectoryGuard;
use crate::merge::{MergeEngine, MergeSummary};
use crate::outputs::OutputDirectory;
use crate::pipeline::{BatchReport, Pipeline, PipelineConfig, PipelineError, ProgressReporter};
use crate::store::{self, DocumentStore};
use crate::table::{TableCodec, TableWriter, XlsxCodec};

pub struct ReceiptService {
    /// Absent when built with [`ReceiptService::outputs_only`].
    pipeline: Option<Arc<Pipeline>>,
    outputs: OutputDirectory,
    merger: MergeEngine,
    codec: Arc<dyn TableCodec>,
    guard: DirectoryGuard,
}

impl ReceiptService {
    /// Builds the service with the document store and extraction service
    /// named by `config`. Credentials are resolved here.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = store::store_from_config(&config.source)?;
        let extraction = Arc::new(AzureReceiptService::from_config(&config.extraction)?);
        Ok(Self::with_collaborators(config, store, extraction))
    }

    pub fn with_collaborators(
        config: &Config,
        store: Arc<dyn DocumentStore>,
        extraction: Arc<dyn ExtractionService>,
    ) -> Self {
        let mut service = Self::outputs_only(config);
        let pipeline_config = Arc::new(PipelineConfig::from_config(config));

        let client = Arc::new(ExtractionClient::new(
            extraction,
            ExtractionSettings::from_config(&config.extraction),
        ));
        let writer = TableWriter::new(&pipeline_config.output_directory, Arc::clone(&service.codec));
        service.pipeline = Some(Arc::new(Pipeline::new(pipeline_config, store, client, writer)));
        service
    }

    /// Builds a service for merge, cleanup and output lookups only. No
    /// credentials are resolved; running the pipeline on it fails with
    /// [`PipelineError::NotConfigured`].
    pub fn outputs_only(config: &Config) -> Self {
        let codec: Arc<dyn TableCodec> = Arc::new(XlsxCodec::new());
        let outputs = OutputDirectory::new(&config.output_directory, &config.combined_file_name);

        Self {
            pipeline: None,
            merger: MergeEngine::new(outputs.clone(), Arc::clone(&codec)),
            codec,
            outputs,
            guard: DirectoryGuard::new(),
        }
    }

    fn pipeline(&self) -> std::result::Result<Arc<Pipeline>, PipelineError> {
        self.pipeline.clone().ok_or(PipelineError::NotConfigured)
    }

    pub fn outputs(&self) -> &OutputDirectory {
        &self.outputs
    }

    /// Runs the pipeline to completion on the current task.
    pub async fn run_pipeline(
        &self,
        progress: &dyn ProgressReporter,
    ) -> std::result::Result<BatchReport, PipelineError> {
        let pipeline = self.pipeline()?;
        let _lease = self
            .guard
            .try_acquire("pipeline run")
            .ok_or(PipelineError::Busy)?;
        pipeline.run(progress).await
    }

    /// Starts a pipeline run on a background task and returns immediately.
    ///
    /// The directory is claimed before returning, so a concurrent merge or
    /// cleanup is refused for as long as the background run lasts.
    pub fn spawn_pipeline(
        &self,
        progress: Arc<dyn ProgressReporter>,
    ) -> std::result::Result<JoinHandle<std::result::Result<BatchReport, PipelineError>>, PipelineError>
    {
        let pipeline = self.pipeline()?;
        let lease = self
            .guard
            .try_acquire("pipeline run")
            .ok_or(PipelineError::Busy)?;

        info!("Starting pipeline run in the background");
        Ok(tokio::spawn(async move {
            let _lease = lease;
            pipeline.run(progress.as_ref()).await
        }))
    }

    pub fn merge(&self) -> std::result::Result<MergeSummary, MergeError> {
        let _lease = self.guard.try_acquire("merge").ok_or(MergeError::Busy)?;
        self.merger.merge()
    }

    pub fn cleanup(&self) -> std::result::Result<Vec<String>, CleanupError> {
        let _lease = self
            .guard
            .try_acquire("cleanup")
            .ok_or(CleanupError::Busy)?;
        crate::cleanup::cleanup(&self.outputs)
    }

    pub fn list_outputs(&self) -> std::result::Result<Vec<String>, OutputError> {
        self.outputs.list_names()
    }

    pub fn output_path(&self, name: &str) -> std::result::Result<PathBuf, OutputError> {
        self.outputs.resolve(name)
    }

    pub fn archive_outputs<W: Write + Seek>(
        &self,
        writer: W,
    ) -> std::result::Result<usize, OutputError> {
        self.outputs.archive(writer)
    }
}
