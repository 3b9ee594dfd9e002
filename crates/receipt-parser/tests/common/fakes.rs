//! In-memory document store and extraction service.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use receipt_parser::extraction::result::{AnalyzedDocument, DocumentField};
use receipt_parser::extraction::{
    AnalyzeResult, ContentFormat, ExtractionError, ExtractionService, PollResponse,
    SubmitResponse,
};
use receipt_parser::normalize::{
    DESCRIPTION_FIELD, ITEMS_FIELD, QUANTITY_FIELD, TOTAL_PRICE_FIELD, TRANSACTION_DATE_FIELD,
};
use receipt_parser::store::{DocumentStore, SourceDocument, StoreError};

/// PDF-looking content telling `ScriptedExtraction` how many items to return.
pub fn receipt_bytes(items: usize) -> Vec<u8> {
    format!("%PDF-1.4 items={}", items).into_bytes()
}

/// Content `ScriptedExtraction` reports as a failed analysis.
pub const FAILING_RECEIPT: &[u8] = b"%PDF-1.4 fail";

#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<Vec<(SourceDocument, Vec<u8>)>>,
    /// When set, listing waits until the gate is notified.
    gate: Option<Arc<Notify>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            gate: Some(gate),
        }
    }

    pub fn add(&self, name: &str, content_type: &str, content: &[u8]) {
        let id = format!("id-{}", name);
        self.documents
            .lock()
            .unwrap()
            .push((SourceDocument::new(id, name, content_type), content.to_vec()));
    }

    pub fn add_receipt(&self, name: &str, items: usize) {
        self.add(name, "application/pdf", &receipt_bytes(items));
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, _folder_id: &str) -> Result<Vec<SourceDocument>, StoreError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .map(|(d, _)| d.clone())
            .collect())
    }

    async fn download(&self, document: &SourceDocument) -> Result<Vec<u8>, StoreError> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .find(|(d, _)| d.id == document.id)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| StoreError::DocumentNotFound(document.name.clone()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Extraction service whose result is derived from the submitted content.
///
/// Scripted submit responses are replayed first; once they run out every
/// submission is accepted.
#[derive(Default)]
pub struct ScriptedExtraction {
    submits: Mutex<VecDeque<SubmitResponse>>,
    submit_count: Mutex<u32>,
}

impl ScriptedExtraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submits(responses: Vec<SubmitResponse>) -> Self {
        Self {
            submits: Mutex::new(responses.into()),
            submit_count: Mutex::new(0),
        }
    }

    pub fn submit_count(&self) -> u32 {
        *self.submit_count.lock().unwrap()
    }
}

#[async_trait]
impl ExtractionService for ScriptedExtraction {
    async fn submit(
        &self,
        content: &[u8],
        _format: ContentFormat,
    ) -> Result<SubmitResponse, ExtractionError> {
        *self.submit_count.lock().unwrap() += 1;
        if let Some(response) = self.submits.lock().unwrap().pop_front() {
            return Ok(response);
        }

        let text = String::from_utf8_lossy(content);
        let handle = match text.split("items=").nth(1) {
            Some(count) => format!("job-{}", count.trim()),
            None => "job-fail".to_string(),
        };
        Ok(SubmitResponse::Accepted { job_handle: handle })
    }

    async fn poll(&self, job_handle: &str) -> Result<PollResponse, ExtractionError> {
        let Some(count) = job_handle
            .strip_prefix("job-")
            .and_then(|c| c.parse::<usize>().ok())
        else {
            return Ok(PollResponse::failed(Some("InvalidContent".to_string())));
        };

        Ok(PollResponse::succeeded(receipt_result(count)))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn receipt_result(items: usize) -> AnalyzeResult {
    let items = (0..items)
        .map(|i| {
            DocumentField::object([
                (DESCRIPTION_FIELD, DocumentField::string(&format!("Item {}", i + 1))),
                (QUANTITY_FIELD, DocumentField::number(1.0)),
                (TOTAL_PRICE_FIELD, DocumentField::number(10.0 * (i + 1) as f64)),
            ])
        })
        .collect();

    let fields = [
        (ITEMS_FIELD.to_string(), DocumentField::array(items)),
        (
            TRANSACTION_DATE_FIELD.to_string(),
            DocumentField::date("2024-03-18"),
        ),
    ]
    .into_iter()
    .collect();

    AnalyzeResult {
        model_id: Some("prebuilt-receipt".to_string()),
        documents: vec![AnalyzedDocument {
            doc_type: Some("receipt.retailMeal".to_string()),
            fields,
            confidence: Some(0.98),
        }],
    }
}
