use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::extraction::ExtractionClient;
use crate::normalize;
use crate::sanitize;
use crate::store::{DocumentStore, SourceDocument};
use crate::table::TableWriter;

use super::config::PipelineConfig;
use super::error::{DocumentError, PipelineError};
use super::filter::{skip_reason, SkipReason};
use super::outcome::{BatchReport, DocumentOutcome};
use super::progress::{DocumentPhase, ProgressEvent, ProgressReporter};

pub struct Pipeline {
    config: Arc<PipelineConfig>,
    store: Arc<dyn DocumentStore>,
    extraction: Arc<ExtractionClient>,
    writer: TableWriter,
}

impl Pipeline {
    pub fn new(
        config: Arc<PipelineConfig>,
        store: Arc<dyn DocumentStore>,
        extraction: Arc<ExtractionClient>,
        writer: TableWriter,
    ) -> Self {
        Self {
            config,
            store,
            extraction,
            writer,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes every unprocessed document in the configured folder.
    ///
    /// A document counts as processed when its output table already exists,
    /// so a re-run only submits documents that have no table yet.
    ///
    /// Documents are handled one at a time in listing order. Only a failure
    /// to list the folder aborts the run; anything that goes wrong with a
    /// single document is recorded in the report and the loop moves on.
    pub async fn run(&self, progress: &dyn ProgressReporter) -> Result<BatchReport, PipelineError> {
        let mut report = BatchReport::start(&self.config.folder_id);
        let span = info_span!("pipeline",
            run_id = %report.run_id,
            folder = %sanitize::hash_id(&self.config.folder_id),
            store = self.store.name(),
        );

        async {
            let documents = self
                .store
                .list(&self.config.folder_id)
                .await
                .map_err(PipelineError::ListFailed)?;
            info!("Found {} documents", documents.len());

            for document in &documents {
                let reason = skip_reason(document).or_else(|| {
                    self.writer
                        .has_output(&document.name)
                        .then_some(SkipReason::AlreadyParsed)
                });
                if let Some(reason) = reason {
                    debug!("Skipping {} ({})", sanitize::redact_name(&document.name), reason);
                    report.skip(&document.name, reason);
                    continue;
                }

                let outcome = self.process_document(document, progress).await;
                report.record(&document.id, &document.name, outcome);
            }

            report.finish();
            info!(
                "Run finished: {} parsed, {} without data, {} failed, {} skipped",
                report.parsed_count(),
                report.no_data_count(),
                report.failed_count(),
                report.skipped_count()
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }

    async fn process_document(
        &self,
        document: &SourceDocument,
        progress: &dyn ProgressReporter,
    ) -> DocumentOutcome {
        let span = info_span!("document",
            id = %sanitize::hash_id(&document.id),
            name = %sanitize::redact_name(&document.name),
        );

        async {
            progress.report(ProgressEvent::Started {
                document_name: document.name.clone(),
            });

            match self.try_process_document(document, progress).await {
                Ok(Some((output_path, rows))) => {
                    progress.report(ProgressEvent::Completed {
                        document_name: document.name.clone(),
                        output_path: Some(sanitize::redact_path(&output_path)),
                        rows,
                    });
                    DocumentOutcome::Parsed { output_path, rows }
                }
                Ok(None) => {
                    progress.report(ProgressEvent::Completed {
                        document_name: document.name.clone(),
                        output_path: None,
                        rows: 0,
                    });
                    DocumentOutcome::NoData
                }
                Err(e) => {
                    let error = e.to_string();
                    warn!("Document failed: {}", error);
                    progress.report(ProgressEvent::Failed {
                        document_name: document.name.clone(),
                        error: error.clone(),
                    });
                    DocumentOutcome::Failed { error }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Returns the written table and its row count, or `None` when the
    /// document has no line items.
    async fn try_process_document(
        &self,
        document: &SourceDocument,
        progress: &dyn ProgressReporter,
    ) -> Result<Option<(PathBuf, usize)>, DocumentError> {
        let enter = |phase| {
            progress.report(ProgressEvent::Phase {
                document_name: document.name.clone(),
                phase,
            })
        };

        enter(DocumentPhase::Downloading);
        let content = self.store.download(document).await?;

        enter(DocumentPhase::Extracting);
        let content_type = Some(document.content_type.as_str()).filter(|t| !t.is_empty());
        let result = self.extraction.submit_and_wait(&content, content_type).await?;

        enter(DocumentPhase::Normalizing);
        let Some(record) = normalize::normalize(&result, &document.name) else {
            return Ok(None);
        };

        enter(DocumentPhase::Writing);
        let output_path = self.writer.write(&record, &document.name)?;
        Ok(Some((output_path, record.len())))
    }
}
