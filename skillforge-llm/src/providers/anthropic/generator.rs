//! Anthropic (Claude) task generator

use super::client::AnthropicClient;
use super::types::{Message, MessageRequest};
use crate::{RoadmapRequest, TaskGenerator};
use async_trait::async_trait;
use skillforge_core::GenerationError;
use std::time::Duration;

/// Default Claude model for roadmap generation.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";

const SYSTEM_PROMPT: &str = "You are a curriculum designer. \
     You answer only with a JSON array of learning tasks, without commentary.";

/// Task generator backed by the Anthropic Messages API.
#[derive(Debug)]
pub struct AnthropicTaskGenerator {
    client: AnthropicClient,
    model: String,
    max_tokens: u32,
}

impl AnthropicTaskGenerator {
    /// Create a new Anthropic task generator.
    ///
    /// # Arguments
    /// * `api_key` - Anthropic API key
    /// * `model` - Model name (e.g., "claude-3-5-sonnet-20241022")
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_concurrent_requests: u32,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            client: AnthropicClient::new(api_key, max_concurrent_requests, timeout)?,
            model: model.into(),
            max_tokens: 4096,
        })
    }

    pub fn with_client(client: AnthropicClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens: 4096,
        }
    }

    fn build_request(&self, request: &RoadmapRequest) -> MessageRequest {
        MessageRequest {
            model: self.model.clone(),
            system: Some(SYSTEM_PROMPT.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: request.prompt(),
            }],
            max_tokens: self.max_tokens,
            temperature: Some(0.4),
        }
    }
}

#[async_trait]
impl TaskGenerator for AnthropicTaskGenerator {
    fn provider(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, request: &RoadmapRequest) -> Result<String, GenerationError> {
        let response = self.client.messages(&self.build_request(request)).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(GenerationError::InvalidResponse {
                provider: "anthropic".to_string(),
                reason: format!(
                    "response contained no text (stop_reason: {})",
                    response.stop_reason.as_deref().unwrap_or("unknown")
                ),
            });
        }
        Ok(text)
    }
}
