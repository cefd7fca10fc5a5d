//! Gemini HTTP client with a concurrency cap

use super::types::{ApiError, GenerateContentRequest, GenerateContentResponse};
use crate::providers::RequestThrottle;
use reqwest::{Client, StatusCode};
use skillforge_core::GenerationError;
use std::time::Duration;

const PROVIDER: &str = "gemini";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API client with a concurrency cap.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    throttle: RequestThrottle,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Arguments
    /// * `api_key` - Google AI Studio API key
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

    /// Call `models/{model}:generateContent`.
    pub async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let _permit = self.throttle.try_acquire(PROVIDER)?;

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
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
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(error_from_status(status, &error_text))
        }
    }
}

/// Map a non-success response to a generation error.
pub(crate) fn error_from_status(status: StatusCode, body: &str) -> GenerationError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|api_error| api_error.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited {
            provider: PROVIDER.to_string(),
            retry_after_ms: 60_000,
        },
        _ => GenerationError::RequestFailed {
            provider: PROVIDER.to_string(),
            status: status.as_u16(),
            message,
        },
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let client =
            GeminiClient::new("AIza-secret", 50, Duration::from_secs(5)).expect("client builds");
        let debug = format!("{:?}", client);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("AIza-secret"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GeminiClient::new("k", 50, Duration::from_secs(5))
            .expect("client builds")
            .with_base_url("http://localhost:8089/v1beta/");
        assert_eq!(client.base_url, "http://localhost:8089/v1beta");
    }

    #[test]
    fn test_error_body_message_is_extracted() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        match error_from_status(StatusCode::BAD_REQUEST, body) {
            GenerationError::RequestFailed { status, message, provider } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid.");
                assert_eq!(provider, "gemini");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_quota_exhaustion_is_rate_limited() {
        assert!(matches!(
            error_from_status(StatusCode::TOO_MANY_REQUESTS, "{}"),
            GenerationError::RateLimited { .. }
        ));
    }
}
