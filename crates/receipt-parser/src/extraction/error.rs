use thiserror::Error;

use crate::secrets::SecretError;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Submission rejected by extraction service (status {status})")]
    SubmissionRejected { status: u16 },

    #[error("Submission still rate-limited after {attempts} attempts")]
    SubmissionExhausted { attempts: u32 },

    #[error("Analysis did not complete after {attempts} polls")]
    PollingTimedOut { attempts: u32 },

    #[error("Analysis failed: {0}")]
    ExtractionFailed(String),

    #[error("Malformed extraction service response: {0}")]
    MalformedResponse(String),

    #[error("Extraction service request failed: {0}")]
    Transport(String),

    #[error("Extraction service credentials unavailable: {0}")]
    Credentials(#[from] SecretError),
}
