pub mod config;
pub mod error;
pub mod filter;
pub mod outcome;
pub mod progress;
pub mod runner;

pub use config::PipelineConfig;
pub use error::{DocumentError, PipelineError};
pub use filter::{skip_reason, SkipReason};
pub use outcome::{BatchReport, DocumentOutcome, DocumentReport, SkippedDocument};
pub use progress::{DocumentPhase, LogProgress, NoopProgress, ProgressEvent, ProgressReporter};
pub use runner::Pipeline;
