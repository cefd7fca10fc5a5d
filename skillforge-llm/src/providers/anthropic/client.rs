//! Anthropic HTTP client with a concurrency cap

use super::types::{ApiError, MessageRequest, MessageResponse};
use crate::providers::RequestThrottle;
use reqwest::{Client, StatusCode};
use skillforge_core::GenerationError;
use std::time::Duration;

const PROVIDER: &str = "anthropic";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

/// Anthropic API client with a concurrency cap.
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    throttle: RequestThrottle,
}

impl AnthropicClient {
    /// Create a new Anthropic client.
    ///
    /// # Arguments
    /// * `api_key` - Anthropic API key
    /// * `max_concurrent_requests` - Maximum in-flight requests
    /// * `timeout` - Per-request HTTP timeout
    pub fn new(
        api_key: impl Into<String>,
        max_concurrent_requests: u32,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            throttle: RequestThrottle::new(max_concurrent_requests),
        })
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send a Messages API request.
    pub async fn messages(&self, body: &MessageRequest) -> Result<MessageResponse, GenerationError> {
        let _permit = self.throttle.try_acquire(PROVIDER)?;

        let url = format!("{}/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: format!("HTTP request failed: {}", e),
            })?;

        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| GenerationError::InvalidResponse {
                    provider: PROVIDER.to_string(),
                    reason: format!("Failed to parse response: {}", e),
                })
        } else {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(error_from_status(status, &error_text, retry_after))
        }
    }
}

/// Map a non-success response to a generation error.
pub(crate) fn error_from_status(
    status: StatusCode,
    body: &str,
    retry_after_secs: Option<u64>,
) -> GenerationError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|api_error| api_error.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited {
            provider: PROVIDER.to_string(),
            retry_after_ms: retry_after_secs.unwrap_or(60).saturating_mul(1000),
        },
        _ => GenerationError::RequestFailed {
            provider: PROVIDER.to_string(),
            status: status.as_u16(),
            message,
        },
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
