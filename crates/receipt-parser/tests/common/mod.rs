//! Shared test utilities for receipt-parser integration tests.
//!
//! - `TestHarness`: temp output directory plus a wired `ReceiptService`
//! - `MemoryStore` / `ScriptedExtraction`: in-memory collaborators

pub mod fakes;
pub mod harness;

pub use fakes::{receipt_bytes, MemoryStore, ScriptedExtraction};
pub use harness::TestHarness;
