//! Gemini task generator

use super::client::GeminiClient;
use super::types::{Content, GenerateContentRequest, GenerationConfig, Part};
use crate::{RoadmapRequest, TaskGenerator};
use async_trait::async_trait;
use skillforge_core::GenerationError;
use std::time::Duration;

/// Default Gemini model for roadmap generation.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Task generator backed by Gemini `generateContent`.
#[derive(Debug)]
pub struct GeminiTaskGenerator {
    client: GeminiClient,
    model: String,
}

impl GeminiTaskGenerator {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_concurrent_requests: u32,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            client: GeminiClient::new(api_key, max_concurrent_requests, timeout)?,
            model: model.into(),
        })
    }

    pub fn with_client(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn build_request(&self, request: &RoadmapRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(request.prompt()),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.4),
                max_output_tokens: Some(4096),
                response_mime_type: Some("application/json".to_string()),
            }),
        }
    }
}

#[async_trait]
impl TaskGenerator for GeminiTaskGenerator {
    fn provider(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &RoadmapRequest) -> Result<String, GenerationError> {
        let response = self
            .client
            .generate_content(&self.model, &self.build_request(request))
            .await?;

        match response.text() {
            Some(text) => Ok(text),
            None => {
                let reason = response
                    .prompt_feedback
                    .as_ref()
                    .and_then(|f| f.block_reason.clone())
                    .or_else(|| {
                        response
                            .candidates
                            .first()
                            .and_then(|c| c.finish_reason.clone())
                    })
                    .unwrap_or_else(|| "no candidates".to_string());
                Err(GenerationError::InvalidResponse {
                    provider: "gemini".to_string(),
                    reason: format!("response contained no text ({})", reason),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_asks_for_json() -> Result<(), GenerationError> {
        let generator =
            GeminiTaskGenerator::new("key", DEFAULT_GEMINI_MODEL, 50, Duration::from_secs(5))?;
        let body = generator.build_request(&RoadmapRequest::new("Docker", "10 days"));
        let config = body.generation_config.expect("generation config");
        assert_eq!(config.response_mime_type.as_deref(), Some("application/json"));
        let prompt = body.contents[0].parts[0].text.as_deref().unwrap_or_default();
        assert!(prompt.contains("\"Docker\""));
        assert!(prompt.contains("\"10 days\""));
        Ok(())
    }
}
