//! SkillForge Test Utilities
//!
//! Centralized test infrastructure for the SkillForge workspace:
//! - Scripted content generator and static identity verifier
//! - Proptest generators for entity types
//! - Test fixtures for common scenarios
//! - Custom assertions for SkillForge-specific validation

// Re-export the in-memory store from its source crate
pub use skillforge_storage::{InMemoryStore, StoreHandles};

// Re-export core types for convenience
pub use skillforge_core::{
    AuthError, EntityKind, ForgeError, ForgeResult, GenerationError, IdentityVerifier, Roadmap,
    RoadmapId, StorageError, Task, TaskCategory, TaskDraft, Timestamp, UserProfile, UserUid,
    VerifiedIdentity, MAX_TASK_XP, MIN_TASK_XP,
};
pub use skillforge_llm::{RoadmapRequest, TaskGenerator};

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

// ============================================================================
// SCRIPTED GENERATOR
// ============================================================================

/// Content generator that replays scripted responses.
///
/// Queued responses are returned in order; once the queue is empty every
/// call answers with a valid fenced list of `default_task_count` tasks.
#[derive(Debug)]
pub struct ScriptedTaskGenerator {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    requests: Mutex<Vec<RoadmapRequest>>,
    default_task_count: usize,
}

impl ScriptedTaskGenerator {
    pub fn new() -> Self {
        Self::with_default_task_count(5)
    }

    pub fn with_default_task_count(count: usize) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            default_task_count: count,
        }
    }

    /// Queue a raw text response.
    pub fn push_output(self, raw: impl Into<String>) -> Self {
        self.push(Ok(raw.into()))
    }

    /// Queue a provider failure.
    pub fn push_error(self, error: GenerationError) -> Self {
        self.push(Err(error))
    }

    fn push(self, response: Result<String, GenerationError>) -> Self {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RoadmapRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Default for ScriptedTaskGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskGenerator for ScriptedTaskGenerator {
    fn provider(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &RoadmapRequest) -> Result<String, GenerationError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self
            .responses
            .lock()
            .map_err(|_| GenerationError::InvalidResponse {
                provider: "scripted".to_string(),
                reason: "response queue poisoned".to_string(),
            })?
            .pop_front();

        match next {
            Some(response) => response,
            None => Ok(format!(
                "```json\n{}\n```",
                fixtures::generator_output(self.default_task_count)
            )),
        }
    }
}

// ============================================================================
// STATIC IDENTITY VERIFIER
// ============================================================================

/// Identity verifier backed by a fixed token table.
#[derive(Debug, Default, Clone)]
pub struct StaticIdentityVerifier {
    tokens: HashMap<String, Result<VerifiedIdentity, AuthError>>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as `identity`.
    pub fn with_identity(mut self, token: impl Into<String>, identity: VerifiedIdentity) -> Self {
        self.tokens.insert(token.into(), Ok(identity));
        self
    }

    /// Reject `token` as expired.
    pub fn with_expired(mut self, token: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), Err(AuthError::Expired));
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .unwrap_or_else(|| {
                Err(AuthError::InvalidCredential {
                    reason: "unknown token".to_string(),
                })
            })
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for SkillForge entity types.

    use super::*;
    use proptest::prelude::*;

    /// Generate a TaskCategory variant.
    pub fn arb_task_category() -> impl Strategy<Value = TaskCategory> {
        prop_oneof![
            Just(TaskCategory::Foundation),
            Just(TaskCategory::Implementation),
            Just(TaskCategory::Advanced),
            Just(TaskCategory::Mastery),
        ]
    }

    /// Generate an XP reward inside the generator range.
    pub fn arb_task_xp() -> impl Strategy<Value = u32> {
        MIN_TASK_XP..=MAX_TASK_XP
    }

    /// Generate a valid task draft.
    pub fn arb_task_draft() -> impl Strategy<Value = TaskDraft> {
        (
            "[A-Z][a-z]{2,12}( [a-z]{2,8}){0,3}",
            "[A-Za-z ]{10,60}",
            arb_task_xp(),
            "[1-9] (hours|days|weeks)",
            arb_task_category(),
        )
            .prop_map(|(title, description, xp, estimated_time, category)| TaskDraft {
                title,
                description: description.trim().to_string() + ".",
                xp,
                estimated_time,
                category,
            })
    }

    /// Generate a roadmap with 1..=7 fresh tasks.
    pub fn arb_roadmap(owner: UserUid) -> impl Strategy<Value = Roadmap> {
        (
            "[A-Z][a-z]{2,10}",
            "[1-9] (weeks|months)",
            prop::collection::vec(arb_task_draft(), 1..=7),
        )
            .prop_map(move |(skill, duration, drafts)| {
                Roadmap::new(owner.clone(), skill, duration, drafts)
            })
    }

    /// Generate a sequence of task indices to complete, possibly repeating
    /// and possibly out of range for `task_count`.
    pub fn arb_completion_sequence(task_count: usize) -> impl Strategy<Value = Vec<i64>> {
        prop::collection::vec(-1i64..=(task_count as i64), 0..(task_count * 3 + 1))
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;
    use serde_json::json;

    /// Identity with uid, email and name claims.
    pub fn identity(uid: &str) -> VerifiedIdentity {
        VerifiedIdentity::new(uid)
            .with_email(format!("{}@example.com", uid))
            .with_name(format!("Learner {}", uid))
    }

    /// Fresh profile for `uid`.
    pub fn user_profile(uid: &str) -> UserProfile {
        UserProfile::new(
            UserUid::new(uid),
            format!("Learner {}", uid),
            format!("{}@example.com", uid),
        )
    }

    /// Profile for `uid` with the given XP and level.
    pub fn user_profile_with(uid: &str, xp: u64, level: u32) -> UserProfile {
        let mut profile = user_profile(uid);
        profile.xp = xp;
        profile.level = level;
        profile
    }

    /// Task draft with a fixed shape.
    pub fn task_draft(index: usize, xp: u32) -> TaskDraft {
        let category = TaskCategory::ALL[index.min(TaskCategory::ALL.len() - 1)];
        TaskDraft {
            title: format!("Task {}", index + 1),
            description: format!("Description of task {}.", index + 1),
            xp,
            estimated_time: format!("{} days", index + 1),
            category,
        }
    }

    /// Roadmap owned by `owner` with one task per XP value.
    pub fn roadmap_with_xp(owner: &str, xps: &[u32]) -> Roadmap {
        Roadmap::new(
            UserUid::new(owner),
            "Rust",
            "4 weeks",
            xps.iter()
                .enumerate()
                .map(|(i, xp)| task_draft(i, *xp))
                .collect(),
        )
    }

    /// A valid generator JSON array with `count` tasks (no fences).
    pub fn generator_output(count: usize) -> String {
        let tasks: Vec<_> = (0..count)
            .map(|i| {
                let draft = task_draft(i, MIN_TASK_XP + (i as u32 * 25) % (MAX_TASK_XP - MIN_TASK_XP + 1));
                json!({
                    "title": draft.title,
                    "description": draft.description,
                    "xp": draft.xp,
                    "estimatedTime": draft.estimated_time,
                    "category": draft.category.to_string(),
                })
            })
            .collect();
        serde_json::Value::Array(tasks).to_string()
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion helpers for SkillForge errors.

    use super::*;

    /// Assert that a ForgeResult is a NotFound error for `entity`.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &ForgeResult<T>, entity: EntityKind) {
        match result {
            Err(ForgeError::NotFound { entity: e, .. }) => {
                assert_eq!(*e, entity, "Wrong entity in NotFound error");
            }
            other => panic!("Expected NotFound error for {:?}, got: {:?}", entity, other),
        }
    }

    /// Assert that a ForgeResult is a Forbidden error.
    #[track_caller]
    pub fn assert_forbidden<T: std::fmt::Debug>(result: &ForgeResult<T>) {
        match result {
            Err(ForgeError::Forbidden { .. }) => {}
            other => panic!("Expected Forbidden error, got: {:?}", other),
        }
    }

    /// Assert that a ForgeResult is an InvalidArgument error on `field`.
    #[track_caller]
    pub fn assert_invalid_argument<T: std::fmt::Debug>(result: &ForgeResult<T>, field: &str) {
        match result {
            Err(ForgeError::InvalidArgument { field: f, .. }) => {
                assert_eq!(f, field, "Wrong field in InvalidArgument error");
            }
            other => panic!("Expected InvalidArgument on {}, got: {:?}", field, other),
        }
    }

    /// Assert that a ForgeResult is an InvalidState error.
    #[track_caller]
    pub fn assert_invalid_state<T: std::fmt::Debug>(result: &ForgeResult<T>) {
        match result {
            Err(ForgeError::InvalidState { .. }) => {}
            other => panic!("Expected InvalidState error, got: {:?}", other),
        }
    }

    /// Assert that a ForgeResult is a Generation error.
    #[track_caller]
    pub fn assert_generation_error<T: std::fmt::Debug>(result: &ForgeResult<T>) {
        match result {
            Err(ForgeError::Generation(_)) => {}
            other => panic!("Expected Generation error, got: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_generator_replays_then_falls_back() {
        let generator = ScriptedTaskGenerator::with_default_task_count(3)
            .push_output("not json")
            .push_error(GenerationError::ProviderNotConfigured);
        let request = RoadmapRequest::new("Rust", "1 week");

        assert_eq!(generator.generate(&request).await, Ok("not json".to_string()));
        assert_eq!(
            generator.generate(&request).await,
            Err(GenerationError::ProviderNotConfigured)
        );

        let fallback = generator.generate(&request).await.expect("default output");
        let drafts = skillforge_llm::parse_task_list(&fallback).expect("valid default output");
        assert_eq!(drafts.len(), 3);
        assert_eq!(generator.requests().len(), 3);
    }

    #[test]
    fn test_generator_output_stays_in_xp_range() {
        let drafts = skillforge_llm::parse_task_list(&fixtures::generator_output(7))
            .expect("fixture output parses");
        assert_eq!(drafts.len(), 7);
        assert!(drafts.iter().all(|d| (MIN_TASK_XP..=MAX_TASK_XP).contains(&d.xp)));
    }

    #[tokio::test]
    async fn test_static_verifier() {
        let verifier = StaticIdentityVerifier::new()
            .with_identity("good", fixtures::identity("u1"))
            .with_expired("old");

        assert_eq!(verifier.verify("good").await.map(|i| i.uid), Ok(UserUid::new("u1")));
        assert_eq!(verifier.verify("old").await, Err(AuthError::Expired));
        assert!(matches!(
            verifier.verify("other").await,
            Err(AuthError::InvalidCredential { .. })
        ));
    }
}
