use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use super::{
    AnalyzeResult, ContentFormat, ExtractionError, ExtractionJob, ExtractionService, PollStatus,
    SubmitResponse,
};
use crate::config::ExtractionConfig;
use crate::sanitize;

/// Retry and polling bounds. Waits are fixed, attempt counts are exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSettings {
    pub max_submit_attempts: u32,
    /// Wait used when a rate-limited response carries no retry hint.
    pub default_retry_after: Duration,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            max_submit_attempts: 3,
            default_retry_after: Duration::from_secs(30),
            poll_interval: Duration::from_secs(2),
            max_poll_attempts: 250,
        }
    }
}

impl ExtractionSettings {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            max_submit_attempts: config.max_submit_attempts.max(1),
            default_retry_after: Duration::from_secs(config.default_retry_after_secs),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            max_poll_attempts: config.max_poll_attempts.max(1),
        }
    }

    /// Longest time a job may be polled before it is declared timed out.
    pub fn max_poll_wait(&self) -> Duration {
        self.poll_interval * self.max_poll_attempts.saturating_sub(1)
    }
}

/// Drives one document through the service's submit -> poll -> result protocol.
pub struct ExtractionClient {
    service: Arc<dyn ExtractionService>,
    settings: ExtractionSettings,
}

impl ExtractionClient {
    pub fn new(service: Arc<dyn ExtractionService>, settings: ExtractionSettings) -> Self {
        Self { service, settings }
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    /// Submits `content` and waits for the analysis to finish.
    ///
    /// `content_type` is the declared MIME type, if known; the format is
    /// sniffed from the content otherwise.
    pub async fn submit_and_wait(
        &self,
        content: &[u8],
        content_type: Option<&str>,
    ) -> Result<AnalyzeResult, ExtractionError> {
        let format = ContentFormat::resolve(content, content_type)?;
        let handle = self.submit(content, format).await?;
        self.wait_for_result(ExtractionJob::new(handle)).await
    }

    async fn submit(&self, content: &[u8], format: ContentFormat) -> Result<String, ExtractionError> {
        let max_attempts = self.settings.max_submit_attempts;

        for attempt in 1..=max_attempts {
            match self.service.submit(content, format).await? {
                SubmitResponse::Accepted { job_handle } => {
                    debug!(
                        "{} accepted {} ({} bytes) on attempt {} as {}",
                        self.service.name(),
                        format.mime_type(),
                        content.len(),
                        attempt,
                        sanitize::redact_url(&job_handle)
                    );
                    return Ok(job_handle);
                }
                SubmitResponse::RateLimited { retry_after } => {
                    if attempt == max_attempts {
                        break;
                    }
                    let wait = retry_after.unwrap_or(self.settings.default_retry_after);
                    warn!(
                        "{} rate-limited submission (attempt {}/{}), retrying in {:?}",
                        self.service.name(),
                        attempt,
                        max_attempts,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                }
                SubmitResponse::Rejected { status } => {
                    return Err(ExtractionError::SubmissionRejected { status });
                }
            }
        }

        Err(ExtractionError::SubmissionExhausted {
            attempts: max_attempts,
        })
    }

    async fn wait_for_result(&self, mut job: ExtractionJob) -> Result<AnalyzeResult, ExtractionError> {
        let max_attempts = self.settings.max_poll_attempts;

        while job.polls < max_attempts {
            let response = self.service.poll(&job.handle).await?;
            job.observe(response.status);

            match response.status {
                PollStatus::Succeeded => {
                    info!(
                        "{} analysis succeeded after {} polls",
                        self.service.name(),
                        job.polls
                    );
                    return response.result.ok_or_else(|| {
                        ExtractionError::MalformedResponse(
                            "succeeded without an analysis result".to_string(),
                        )
                    });
                }
                PollStatus::Failed => {
                    return Err(ExtractionError::ExtractionFailed(
                        response
                            .error
                            .unwrap_or_else(|| "service reported failure".to_string()),
                    ));
                }
                PollStatus::Running => {
                    if job.polls < max_attempts {
                        tokio::time::sleep(self.settings.poll_interval).await;
                    }
                }
            }
        }

        job.time_out();
        warn!(
            "{} analysis still running after {} polls, giving up",
            self.service.name(),
            job.polls
        );
        Err(ExtractionError::PollingTimedOut {
            attempts: job.polls,
        })
    }
}
