//! Azure Document Intelligence (Form Recognizer) receipt analysis.
//!
//! Submission is a `POST` of the raw document to the model's `:analyze`
//! endpoint. A `202 Accepted` response carries the operation URL in the
//! `Operation-Location` header, which is then polled with `GET` until the
//! operation reports `succeeded` or `failed`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{
    AnalyzeResult, ContentFormat, ExtractionError, ExtractionService, PollResponse, PollStatus,
    SubmitResponse,
};
use crate::config::ExtractionConfig;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION_HEADER: &str = "operation-location";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Error bodies are cut to this length before they reach logs or errors.
const MAX_ERROR_BODY_LENGTH: usize = 200;

pub struct AzureReceiptService {
    client: Client,
    endpoint: String,
    model: String,
    api_version: String,
    api_key: SecretString,
}

impl AzureReceiptService {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_version: &str,
        api_key: SecretString,
    ) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ExtractionError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_version: api_version.to_string(),
            api_key,
        })
    }

    /// Builds the service from configuration, resolving the API key.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let api_key = config.api_key.resolve("extraction.apiKey")?;
        Self::new(&config.endpoint, &config.model, &config.api_version, api_key)
    }

    pub fn analyze_url(&self) -> String {
        format!(
            "{}/formrecognizer/documentModels/{}:analyze?api-version={}",
            self.endpoint, self.model, self.api_version
        )
    }
}

#[async_trait]
impl ExtractionService for AzureReceiptService {
    async fn submit(
        &self,
        content: &[u8],
        format: ContentFormat,
    ) -> Result<SubmitResponse, ExtractionError> {
        let response = self
            .client
            .post(self.analyze_url())
            .header(CONTENT_TYPE, format.mime_type())
            .header(SUBSCRIPTION_KEY_HEADER, self.api_key.expose_secret())
            .body(content.to_vec())
            .send()
            .await
            .map_err(|e| ExtractionError::Transport(e.to_string()))?;

        let status = response.status();
        match status {
            StatusCode::ACCEPTED => {
                let job_handle = operation_location(response.headers()).ok_or_else(|| {
                    ExtractionError::MalformedResponse(
                        "accepted without an Operation-Location header".to_string(),
                    )
                })?;
                Ok(SubmitResponse::Accepted { job_handle })
            }
            StatusCode::TOO_MANY_REQUESTS => Ok(SubmitResponse::RateLimited {
                retry_after: parse_retry_after(response.headers(), Utc::now()),
            }),
            _ => {
                let body = response.text().await.unwrap_or_default();
                warn!(
                    "Analyze request rejected with status {}: {}",
                    status,
                    truncate_error_body(&body)
                );
                Ok(SubmitResponse::Rejected {
                    status: status.as_u16(),
                })
            }
        }
    }

    async fn poll(&self, job_handle: &str) -> Result<PollResponse, ExtractionError> {
        let response = self
            .client
            .get(job_handle)
            .header(SUBSCRIPTION_KEY_HEADER, self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| ExtractionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Transient; the poll budget bounds how long this can go on.
            debug!("Poll returned status {}, treating as still running", status);
            return Ok(PollResponse::running());
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExtractionError::Transport(e.to_string()))?;
        parse_operation(&body)
    }

    fn name(&self) -> &str {
        "azure-form-recognizer"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOperation {
    status: OperationStatus,
    #[serde(default)]
    analyze_result: Option<AnalyzeResult>,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl OperationError {
    fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (Some(code), None) => code.clone(),
            (None, Some(message)) => message.clone(),
            (None, None) => "unknown error".to_string(),
        }
    }
}

fn parse_operation(body: &str) -> Result<PollResponse, ExtractionError> {
    let operation: AnalyzeOperation = serde_json::from_str(body).map_err(|e| {
        ExtractionError::MalformedResponse(format!(
            "{} in {}",
            e,
            truncate_error_body(body)
        ))
    })?;

    Ok(match operation.status {
        OperationStatus::Succeeded => PollResponse {
            status: PollStatus::Succeeded,
            result: operation.analyze_result,
            error: None,
        },
        OperationStatus::Failed => {
            PollResponse::failed(operation.error.as_ref().map(OperationError::describe))
        }
        OperationStatus::NotStarted | OperationStatus::Running | OperationStatus::Unknown => {
            PollResponse::running()
        }
    })
}

fn operation_location(headers: &HeaderMap) -> Option<String> {
    headers
        .get(OPERATION_LOCATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Reads `Retry-After` as delay-seconds or an HTTP date relative to `now`.
fn parse_retry_after(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}

fn truncate_error_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LENGTH {
        let head: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{}... (truncated)", head)
    } else {
        body.to_string()
    }
}
