//! Integration tests for the ingestion pipeline through `ReceiptService`.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use common::fakes::FAILING_RECEIPT;
use common::{receipt_bytes, MemoryStore, ScriptedExtraction, TestHarness};
use receipt_parser::extraction::SubmitResponse;
use receipt_parser::pipeline::{DocumentOutcome, NoopProgress, SkipReason};
use receipt_parser::table::Cell;
use receipt_parser::{CleanupError, MergeError, PipelineError};

#[tokio::test]
async fn test_output_named_documents_are_not_reprocessed() {
    let harness = TestHarness::new();
    let store = Arc::new(MemoryStore::new());
    store.add_receipt("Acme_01.pdf", 3);
    store.add(
        "Acme_01_parsed.xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        b"PK\x03\x04",
    );
    let extraction = Arc::new(ScriptedExtraction::new());
    let service = harness.service(store, extraction.clone());

    let report = service.run_pipeline(&NoopProgress).await.unwrap();

    assert_eq!(extraction.submit_count(), 1);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.parsed_count(), 1);
    assert_eq!(harness.output_files(), vec!["Acme_01_parsed.xlsx"]);

    let table = harness.read_table("Acme_01_parsed.xlsx");
    assert_eq!(table.len(), 3);
    for row in 0..3 {
        assert_eq!(table.cell(row, "Project").and_then(Cell::as_text), Some("Acme"));
        assert_eq!(table.cell(row, "Date").and_then(Cell::as_text), Some("2024-03-18"));
    }
    assert_eq!(table.cell(2, "Total").and_then(Cell::as_number), Some(30.0));
}

#[tokio::test]
async fn test_google_spreadsheets_are_skipped() {
    let harness = TestHarness::new();
    let store = Arc::new(MemoryStore::new());
    store.add("Budget 2024", "application/vnd.google-apps.spreadsheet", b"");
    store.add_receipt("Cafe.pdf", 1);
    let extraction = Arc::new(ScriptedExtraction::new());
    let service = harness.service(store, extraction.clone());

    let report = service.run_pipeline(&NoopProgress).await.unwrap();

    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.documents.len(), 1);
    assert_eq!(extraction.submit_count(), 1);
}

#[tokio::test]
async fn test_rerun_skips_documents_with_existing_tables() {
    let harness = TestHarness::new();
    let store = Arc::new(MemoryStore::new());
    store.add_receipt("Acme_01.pdf", 3);
    store.add_receipt("Beta_02.pdf", 2);
    let extraction = Arc::new(ScriptedExtraction::new());
    let service = harness.service(store, extraction.clone());

    service.run_pipeline(&NoopProgress).await.unwrap();
    assert_eq!(extraction.submit_count(), 2);
    let first_files = harness.output_files();
    let first_bytes: Vec<Vec<u8>> = first_files
        .iter()
        .map(|name| std::fs::read(harness.output_path(name)).unwrap())
        .collect();

    let second = service.run_pipeline(&NoopProgress).await.unwrap();

    assert_eq!(extraction.submit_count(), 2);
    assert_eq!(second.parsed_count(), 0);
    assert_eq!(second.skipped_count(), 2);
    assert!(second
        .skipped
        .iter()
        .all(|s| s.reason == SkipReason::AlreadyParsed));
    assert_eq!(harness.output_files(), first_files);
    for (name, bytes) in first_files.iter().zip(&first_bytes) {
        assert_eq!(&std::fs::read(harness.output_path(name)).unwrap(), bytes);
    }
}

#[tokio::test]
async fn test_new_document_is_processed_on_rerun() {
    let harness = TestHarness::new();
    let store = Arc::new(MemoryStore::new());
    store.add_receipt("Acme_01.pdf", 1);
    let extraction = Arc::new(ScriptedExtraction::new());
    let service = harness.service(store.clone(), extraction.clone());

    service.run_pipeline(&NoopProgress).await.unwrap();
    store.add_receipt("Beta_02.pdf", 4);
    let second = service.run_pipeline(&NoopProgress).await.unwrap();

    assert_eq!(extraction.submit_count(), 2);
    assert_eq!(second.documents.len(), 1);
    assert_eq!(second.documents[0].document_name, "Beta_02.pdf");
    assert_eq!(
        harness.output_files(),
        vec!["Acme_01_parsed.xlsx", "Beta_02_parsed.xlsx"]
    );
}

#[tokio::test]
async fn test_failures_are_recorded_and_batch_continues() {
    let harness = TestHarness::new();
    let store = Arc::new(MemoryStore::new());
    store.add("Broken.pdf", "application/pdf", FAILING_RECEIPT);
    store.add("notes.txt", "text/plain", b"not a receipt");
    store.add("Blank.pdf", "application/pdf", &receipt_bytes(0));
    store.add_receipt("Acme_01.pdf", 2);
    let service = harness.service(store, Arc::new(ScriptedExtraction::new()));

    let report = service.run_pipeline(&NoopProgress).await.unwrap();

    let names: Vec<&str> = report
        .documents
        .iter()
        .map(|d| d.document_name.as_str())
        .collect();
    assert_eq!(names, vec!["Broken.pdf", "notes.txt", "Blank.pdf", "Acme_01.pdf"]);

    match report.outcome_for("Broken.pdf") {
        Some(DocumentOutcome::Failed { error }) => assert!(error.contains("InvalidContent")),
        other => panic!("Expected failure, got {:?}", other),
    }
    assert!(report.outcome_for("notes.txt").unwrap().is_failed());
    assert_eq!(report.outcome_for("Blank.pdf"), Some(&DocumentOutcome::NoData));
    assert!(report.outcome_for("Acme_01.pdf").unwrap().is_parsed());

    assert_eq!(report.failed_count(), 2);
    assert_eq!(report.rows_written(), 2);
    assert_eq!(harness.output_files(), vec!["Acme_01_parsed.xlsx"]);
    assert!(report.finished_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_submissions_are_retried() {
    let harness = TestHarness::new();
    let store = Arc::new(MemoryStore::new());
    store.add_receipt("Acme_01.pdf", 1);
    let extraction = Arc::new(ScriptedExtraction::with_submits(vec![
        SubmitResponse::RateLimited { retry_after: None },
        SubmitResponse::RateLimited {
            retry_after: Some(Duration::from_secs(1)),
        },
    ]));
    let service = harness.service(store, extraction.clone());

    let report = service.run_pipeline(&NoopProgress).await.unwrap();

    assert_eq!(extraction.submit_count(), 3);
    assert!(report.outcome_for("Acme_01.pdf").unwrap().is_parsed());
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_exhaustion_fails_document() {
    let harness = TestHarness::new();
    let store = Arc::new(MemoryStore::new());
    store.add_receipt("Acme_01.pdf", 1);
    store.add_receipt("Beta_02.pdf", 1);
    let limited = SubmitResponse::RateLimited { retry_after: None };
    let extraction = Arc::new(ScriptedExtraction::with_submits(vec![
        limited.clone(),
        limited.clone(),
        limited,
    ]));
    let service = harness.service(store, extraction.clone());

    let report = service.run_pipeline(&NoopProgress).await.unwrap();

    assert_eq!(extraction.submit_count(), 4);
    assert!(report.outcome_for("Acme_01.pdf").unwrap().is_failed());
    assert!(report.outcome_for("Beta_02.pdf").unwrap().is_parsed());
}

#[tokio::test]
async fn test_directory_is_exclusive_while_run_in_progress() {
    let harness = TestHarness::new();
    let gate = Arc::new(Notify::new());
    let store = Arc::new(MemoryStore::gated(gate.clone()));
    store.add_receipt("Acme_01.pdf", 3);
    let service = harness.service(store, Arc::new(ScriptedExtraction::new()));

    let handle = service.spawn_pipeline(Arc::new(NoopProgress)).unwrap();

    assert!(matches!(service.merge(), Err(MergeError::Busy)));
    assert!(matches!(service.cleanup(), Err(CleanupError::Busy)));
    assert!(matches!(
        service.run_pipeline(&NoopProgress).await,
        Err(PipelineError::Busy)
    ));
    assert!(matches!(
        service.spawn_pipeline(Arc::new(NoopProgress)),
        Err(PipelineError::Busy)
    ));

    gate.notify_one();
    let report = handle.await.unwrap().unwrap();
    assert_eq!(report.parsed_count(), 1);

    let summary = service.merge().unwrap();
    assert_eq!(summary.rows, 3);
}
