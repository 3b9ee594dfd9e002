use log::{debug, info, warn};

/// Processing step a document is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentPhase {
    Downloading,
    Extracting,
    Normalizing,
    Writing,
}

impl DocumentPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentPhase::Downloading => "downloading",
            DocumentPhase::Extracting => "extracting",
            DocumentPhase::Normalizing => "normalizing",
            DocumentPhase::Writing => "writing",
        }
    }
}

/// Events emitted by the pipeline during processing.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started {
        document_name: String,
    },
    Phase {
        document_name: String,
        phase: DocumentPhase,
    },
    Completed {
        document_name: String,
        output_path: Option<String>,
        rows: usize,
    },
    Failed {
        document_name: String,
        error: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests and library callers that don't care.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Writes every event to the log.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { document_name } => info!("Processing {}", document_name),
            ProgressEvent::Phase {
                document_name,
                phase,
            } => debug!("{}: {}", document_name, phase.as_str()),
            ProgressEvent::Completed {
                document_name,
                output_path: Some(path),
                rows,
            } => info!("{}: saved {} rows to {}", document_name, rows, path),
            ProgressEvent::Completed {
                document_name,
                output_path: None,
                ..
            } => info!("{}: no line items found", document_name),
            ProgressEvent::Failed {
                document_name,
                error,
            } => warn!("{}: failed: {}", document_name, error),
        }
    }
}
