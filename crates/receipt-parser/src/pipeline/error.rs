use thiserror::Error;

use crate::store::StoreError;

/// Batch-level failures. Per-document failures are reported as
/// [`DocumentOutcome::Failed`](super::DocumentOutcome::Failed) instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to list source documents: {0}")]
    ListFailed(#[source] StoreError),

    #[error("Output directory is busy with another run, merge or cleanup")]
    Busy,

    #[error("No document store or extraction service configured for this service")]
    NotConfigured,
}

/// Failure of a single document. Recorded in the batch report, never
/// propagated out of the run.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("download failed: {0}")]
    Download(#[from] StoreError),

    #[error("extraction failed: {0}")]
    Extraction(#[from] crate::extraction::ExtractionError),

    #[error("write failed: {0}")]
    Write(#[from] crate::error::TableError),
}
