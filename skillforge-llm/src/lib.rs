//! SkillForge LLM - Roadmap Task Generation
//!
//! Provider-agnostic trait for turning a skill and a duration into a task
//! list. Providers return raw text; [`parse_task_list`] is the trust boundary
//! that validates the shape before anything is persisted.

pub mod config;
pub mod parse;
pub mod prompt;
pub mod providers;

use async_trait::async_trait;
use skillforge_core::GenerationError;

pub use config::{build_generator, GeneratorConfig, LlmProvider};
pub use parse::{parse_task_list, strip_code_fences};
pub use prompt::build_roadmap_prompt;
pub use providers::{AnthropicTaskGenerator, GeminiTaskGenerator};

// ============================================================================
// GENERATION REQUEST
// ============================================================================

/// Parameters for one roadmap generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadmapRequest {
    pub skill: String,
    pub duration: String,
}

impl RoadmapRequest {
    pub fn new(skill: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            duration: duration.into(),
        }
    }

    /// Prompt sent to the provider for this request.
    pub fn prompt(&self) -> String {
        build_roadmap_prompt(&self.skill, &self.duration)
    }
}

// ============================================================================
// TASK GENERATOR TRAIT
// ============================================================================

/// Content generator that produces a roadmap task list as free text.
///
/// The output is untrusted. It may be wrapped in markdown fences or contain
/// anything at all, so callers run it through [`parse_task_list`].
#[async_trait]
pub trait TaskGenerator: Send + Sync {
    /// Short provider name used in logs, metrics and errors.
    fn provider(&self) -> &str;

    /// Ask the provider for a task list and return its raw text answer.
    async fn generate(&self, request: &RoadmapRequest) -> Result<String, GenerationError>;
}
