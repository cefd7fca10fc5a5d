//! LLM provider implementations
//!
//! Concrete [`TaskGenerator`](crate::TaskGenerator) implementations over the
//! Gemini and Anthropic HTTP APIs.

pub mod anthropic;
pub mod gemini;
mod throttle;

pub use anthropic::{AnthropicClient, AnthropicTaskGenerator};
pub use gemini::{GeminiClient, GeminiTaskGenerator};
pub(crate) use throttle::RequestThrottle;
