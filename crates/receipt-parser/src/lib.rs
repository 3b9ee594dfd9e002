pub mod cleanup;
pub mod config;
pub mod error;
pub mod extraction;
pub mod guard;
pub mod merge;
pub mod naming;
pub mod normalize;
pub mod outputs;
pub mod pipeline;
pub mod sanitize;
pub mod secrets;
pub mod service;
pub mod store;
pub mod table;

pub use config::{load_config, Config};
pub use error::{
    CleanupError, ConfigError, MergeError, OutputError, ReceiptError, Result, TableError,
};
pub use extraction::{AnalyzeResult, ExtractionClient, ExtractionError, ExtractionSettings};
pub use merge::MergeSummary;
pub use normalize::{normalize, LineItem, ReceiptRecord};
pub use pipeline::{BatchReport, DocumentOutcome, Pipeline, PipelineConfig, PipelineError};
pub use secrets::{SecretError, SecretSource};
pub use service::ReceiptService;
pub use store::{DocumentStore, SourceDocument, StoreError};
