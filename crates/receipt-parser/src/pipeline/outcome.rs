use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::filter::SkipReason;

/// What happened to one document in a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DocumentOutcome {
    Parsed { output_path: PathBuf, rows: usize },
    /// Extraction succeeded but found no line items; nothing was written.
    NoData,
    Failed { error: String },
}

impl DocumentOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Parsed { .. } => "parsed",
            Self::NoData => "no data",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReport {
    pub document_id: String,
    pub document_name: String,
    pub outcome: DocumentOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedDocument {
    pub document_name: String,
    pub reason: SkipReason,
}

/// Result of one pipeline run, in listing order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub run_id: Uuid,
    pub folder_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub documents: Vec<DocumentReport>,
    pub skipped: Vec<SkippedDocument>,
}

impl BatchReport {
    pub fn start(folder_id: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            folder_id: folder_id.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            documents: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn record(&mut self, document_id: &str, document_name: &str, outcome: DocumentOutcome) {
        self.documents.push(DocumentReport {
            document_id: document_id.to_string(),
            document_name: document_name.to_string(),
            outcome,
        });
    }

    pub fn skip(&mut self, document_name: &str, reason: SkipReason) {
        self.skipped.push(SkippedDocument {
            document_name: document_name.to_string(),
            reason,
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn parsed_count(&self) -> usize {
        self.documents.iter().filter(|d| d.outcome.is_parsed()).count()
    }

    pub fn no_data_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| d.outcome == DocumentOutcome::NoData)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.documents.iter().filter(|d| d.outcome.is_failed()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Total line items written across all parsed documents.
    pub fn rows_written(&self) -> usize {
        self.documents
            .iter()
            .map(|d| match d.outcome {
                DocumentOutcome::Parsed { rows, .. } => rows,
                _ => 0,
            })
            .sum()
    }

    pub fn outcome_for(&self, document_name: &str) -> Option<&DocumentOutcome> {
        self.documents
            .iter()
            .find(|d| d.document_name == document_name)
            .map(|d| &d.outcome)
    }
}
