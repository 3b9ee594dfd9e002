//! Asynchronous document analysis: submit, poll, collect the result.

pub mod azure;
pub mod client;
pub mod error;
pub mod result;

use std::time::Duration;

use async_trait::async_trait;

pub use azure::AzureReceiptService;
pub use client::{ExtractionClient, ExtractionSettings};
pub use error::ExtractionError;
pub use result::AnalyzeResult;

/// Document formats the analysis service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    Pdf,
    Jpeg,
    Png,
    Tiff,
}

impl ContentFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Tiff => "image/tiff",
        }
    }

    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        let essence = mime_type.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" => Some(Self::Pdf),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/tiff" | "image/tif" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Identifies the format from the leading magic bytes.
    pub fn detect(content: &[u8]) -> Option<Self> {
        if content.starts_with(b"%PDF") {
            Some(Self::Pdf)
        } else if content.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if content.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if content.starts_with(b"II*\0") || content.starts_with(b"MM\0*") {
            Some(Self::Tiff)
        } else {
            None
        }
    }

    /// Uses the declared content type when it names a supported format,
    /// otherwise falls back to sniffing the content.
    pub fn resolve(content: &[u8], declared: Option<&str>) -> Result<Self, ExtractionError> {
        declared
            .and_then(Self::from_mime_type)
            .or_else(|| Self::detect(content))
            .ok_or_else(|| {
                ExtractionError::UnsupportedFormat(
                    declared.unwrap_or("unrecognized content").to_string(),
                )
            })
    }
}

/// Outcome of a single submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResponse {
    /// Queued; poll `job_handle` for the result.
    Accepted { job_handle: String },
    /// Throttled; retry after the server-specified wait, if any.
    RateLimited { retry_after: Option<Duration> },
    /// Refused for any other reason.
    Rejected { status: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollResponse {
    pub status: PollStatus,
    pub result: Option<AnalyzeResult>,
    /// Service-supplied failure detail, when `status` is `Failed`.
    pub error: Option<String>,
}

impl PollResponse {
    pub fn running() -> Self {
        Self {
            status: PollStatus::Running,
            result: None,
            error: None,
        }
    }

    pub fn succeeded(result: AnalyzeResult) -> Self {
        Self {
            status: PollStatus::Succeeded,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: Option<String>) -> Self {
        Self {
            status: PollStatus::Failed,
            result: None,
            error,
        }
    }
}

/// A document-understanding service with an asynchronous submit/poll contract.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn submit(
        &self,
        content: &[u8],
        format: ContentFormat,
    ) -> Result<SubmitResponse, ExtractionError>;

    async fn poll(&self, job_handle: &str) -> Result<PollResponse, ExtractionError>;

    /// Service name for logging.
    fn name(&self) -> &str;
}

/// Lifecycle of one submitted analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Submitted,
    Running,
    Succeeded,
    Failed,
    TimedOut,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::TimedOut)
    }
}

/// In-flight analysis job. Never persisted; a restart re-submits.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    pub handle: String,
    pub status: JobStatus,
    pub polls: u32,
}

impl ExtractionJob {
    pub fn new(handle: String) -> Self {
        Self {
            handle,
            status: JobStatus::Submitted,
            polls: 0,
        }
    }

    /// Records one poll response.
    pub fn observe(&mut self, status: PollStatus) {
        self.polls += 1;
        self.status = match status {
            PollStatus::Running => JobStatus::Running,
            PollStatus::Succeeded => JobStatus::Succeeded,
            PollStatus::Failed => JobStatus::Failed,
        };
    }

    pub fn time_out(&mut self) {
        self.status = JobStatus::TimedOut;
    }
}
