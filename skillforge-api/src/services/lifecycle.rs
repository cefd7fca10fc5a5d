//! Roadmap Lifecycle Service
//!
//! Generation, retrieval, task completion and roadmap completion, plus the
//! user profile upsert that every other operation depends on.

use std::sync::Arc;
use std::time::Instant;

use skillforge_core::{
    apply_xp, EntityKind, ForgeError, ForgeResult, Roadmap, RoadmapId, StorageError, UserProfile,
    VerifiedIdentity,
};
use skillforge_llm::{parse_task_list, RoadmapRequest, TaskGenerator};
use skillforge_storage::{RoadmapStore, UserStore};

use crate::telemetry::metrics;

const ROADMAP_ACCESS_DENIED: &str = "You do not have access to this roadmap.";
const SKILL_AND_DURATION_REQUIRED: &str = "Skill and duration are required.";

// ============================================================================
// OUTCOMES
// ============================================================================

/// Result of completing one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCompletion {
    pub roadmap: Roadmap,
    pub user: UserProfile,
    /// True only on the call that completed the last open task.
    pub roadmap_newly_completed: bool,
    /// False when the task had already been completed; nothing changed.
    pub task_newly_completed: bool,
    pub levels_gained: u32,
}

/// Result of explicitly marking a roadmap completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadmapCompletion {
    pub roadmap: Roadmap,
    pub already_completed: bool,
}

/// Result of the register upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredProfile {
    pub user: UserProfile,
    pub was_created: bool,
}

// ============================================================================
// LIFECYCLE SERVICE
// ============================================================================

/// Orchestrates the content generator and both stores.
#[derive(Clone)]
pub struct RoadmapLifecycle {
    generator: Arc<dyn TaskGenerator>,
    roadmaps: Arc<dyn RoadmapStore>,
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for RoadmapLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoadmapLifecycle")
            .field("generator", &self.generator.provider())
            .finish_non_exhaustive()
    }
}

impl RoadmapLifecycle {
    pub fn new(
        generator: Arc<dyn TaskGenerator>,
        roadmaps: Arc<dyn RoadmapStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            generator,
            roadmaps,
            users,
        }
    }

    /// Generate and persist a new roadmap for `owner`.
    ///
    /// Nothing is persisted unless the generator output passes validation.
    pub async fn generate(
        &self,
        owner: &VerifiedIdentity,
        skill: &str,
        duration: &str,
    ) -> ForgeResult<Roadmap> {
        let skill = skill.trim();
        let duration = duration.trim();
        if skill.is_empty() {
            return Err(ForgeError::invalid_argument("skill", SKILL_AND_DURATION_REQUIRED));
        }
        if duration.is_empty() {
            return Err(ForgeError::invalid_argument("duration", SKILL_AND_DURATION_REQUIRED));
        }

        self.require_profile(owner).await?;

        let request = RoadmapRequest::new(skill, duration);
        let provider = self.generator.provider().to_string();
        let started = Instant::now();
        let generated = self
            .generator
            .generate(&request)
            .await
            .and_then(|raw| {
                tracing::debug!(provider = %provider, raw = %raw, "Generator raw output");
                parse_task_list(&raw)
            });

        if let Some(metrics) = metrics() {
            metrics.record_generation(
                &provider,
                generated.is_ok(),
                started.elapsed().as_secs_f64(),
            );
        }

        let drafts = generated.map_err(|e| {
            tracing::warn!(provider = %provider, skill, error = %e, "Roadmap generation rejected");
            e
        })?;

        let roadmap = Roadmap::new(owner.uid.clone(), skill, duration, drafts);
        self.roadmaps.roadmap_insert(&roadmap).await?;

        tracing::info!(
            roadmap_id = %roadmap.id,
            owner = %owner.uid,
            skill,
            tasks = roadmap.tasks.len(),
            "Roadmap generated"
        );
        Ok(roadmap)
    }

    /// All of `owner`'s roadmaps, newest first.
    pub async fn list(&self, owner: &VerifiedIdentity) -> ForgeResult<Vec<Roadmap>> {
        self.require_profile(owner).await?;
        Ok(self.roadmaps.roadmap_list_by_owner(&owner.uid).await?)
    }

    /// Fetch one roadmap, enforcing ownership.
    pub async fn get(&self, owner: &VerifiedIdentity, id: RoadmapId) -> ForgeResult<Roadmap> {
        let roadmap = self
            .roadmaps
            .roadmap_get(id)
            .await?
            .ok_or_else(|| ForgeError::not_found(EntityKind::Roadmap, id))?;

        if !roadmap.is_owned_by(&owner.uid) {
            tracing::debug!(roadmap_id = %id, requester = %owner.uid, "Roadmap access denied");
            return Err(ForgeError::forbidden(ROADMAP_ACCESS_DENIED));
        }
        Ok(roadmap)
    }

    pub async fn delete(&self, owner: &VerifiedIdentity, id: RoadmapId) -> ForgeResult<()> {
        let roadmap = self.get(owner, id).await?;
        if !self.roadmaps.roadmap_delete(roadmap.id).await? {
            return Err(ForgeError::not_found(EntityKind::Roadmap, id));
        }
        tracing::info!(roadmap_id = %id, owner = %owner.uid, "Roadmap deleted");
        Ok(())
    }

    /// Complete the task at `task_index` and award its XP.
    ///
    /// Completing an already completed task changes nothing. The roadmap is
    /// flagged complete on the call that finishes its last task.
    pub async fn complete_task(
        &self,
        owner: &VerifiedIdentity,
        id: RoadmapId,
        task_index: i64,
    ) -> ForgeResult<TaskCompletion> {
        let mut roadmap = self.get(owner, id).await?;
        let mut user = self.require_profile(owner).await?;

        let task = usize::try_from(task_index)
            .ok()
            .and_then(|i| roadmap.tasks.get_mut(i))
            .ok_or_else(|| ForgeError::invalid_argument("taskIndex", "Invalid task index."))?;
        if task.completed {
            return Ok(TaskCompletion {
                roadmap,
                user,
                roadmap_newly_completed: false,
                task_newly_completed: false,
                levels_gained: 0,
            });
        }

        task.completed = true;
        let reward = u64::from(task.xp);
        let levels_gained = apply_xp(&mut user, reward);
        user.touch();

        // No transaction spans these writes; a failure between them leaves
        // the task flagged without the XP.
        self.roadmaps.roadmap_update(&roadmap).await?;
        self.users.user_update(&user).await?;

        let mut roadmap_newly_completed = false;
        if roadmap.all_tasks_completed() && !roadmap.is_completed {
            roadmap.is_completed = true;
            self.roadmaps.roadmap_update(&roadmap).await?;
            roadmap_newly_completed = true;
        }

        if let Some(metrics) = metrics() {
            metrics.record_task_completed(levels_gained);
        }
        tracing::info!(
            roadmap_id = %id,
            owner = %owner.uid,
            task_index,
            xp = reward,
            total_xp = user.xp,
            "Task completed"
        );
        if levels_gained > 0 {
            tracing::info!(owner = %owner.uid, level = user.level, levels_gained, "Level up");
        }
        if roadmap_newly_completed {
            tracing::info!(roadmap_id = %id, owner = %owner.uid, "Roadmap completed");
        }

        Ok(TaskCompletion {
            roadmap,
            user,
            roadmap_newly_completed,
            task_newly_completed: true,
            levels_gained,
        })
    }

    /// Flag a roadmap completed once every task is done. Never grants XP.
    pub async fn mark_completed(
        &self,
        owner: &VerifiedIdentity,
        id: RoadmapId,
    ) -> ForgeResult<RoadmapCompletion> {
        let mut roadmap = self.get(owner, id).await?;

        if !roadmap.all_tasks_completed() {
            return Err(ForgeError::invalid_state(
                "Cannot mark roadmap completed: Not all tasks are finished.",
            ));
        }
        if roadmap.is_completed {
            return Ok(RoadmapCompletion {
                roadmap,
                already_completed: true,
            });
        }

        roadmap.is_completed = true;
        self.roadmaps.roadmap_update(&roadmap).await?;
        tracing::info!(roadmap_id = %id, owner = %owner.uid, "Roadmap completed");

        Ok(RoadmapCompletion {
            roadmap,
            already_completed: false,
        })
    }

    /// Create the caller's profile if it does not exist yet.
    ///
    /// An existing profile is returned untouched. Email falls back to the
    /// token claim; name falls back to the claim, then to the email local
    /// part.
    pub async fn ensure_user_profile(
        &self,
        identity: &VerifiedIdentity,
        email: Option<&str>,
        name: Option<&str>,
    ) -> ForgeResult<EnsuredProfile> {
        if let Some(user) = self.users.user_get(&identity.uid).await? {
            return Ok(EnsuredProfile {
                user,
                was_created: false,
            });
        }

        let email = non_blank(email)
            .or_else(|| non_blank(identity.email.as_deref()))
            .ok_or_else(|| ForgeError::invalid_argument("email", "Email is required."))?;
        let name = non_blank(name)
            .or_else(|| non_blank(identity.name.as_deref()))
            .unwrap_or_else(|| email_local_part(email));

        let profile = UserProfile::new(identity.uid.clone(), name, email);
        match self.users.user_insert(&profile).await {
            Ok(()) => {
                tracing::info!(uid = %identity.uid, "User registered");
                Ok(EnsuredProfile {
                    user: profile,
                    was_created: true,
                })
            }
            // Lost a race with a concurrent register for the same uid.
            Err(StorageError::AlreadyExists { .. }) => {
                match self.users.user_get(&identity.uid).await? {
                    Some(user) => Ok(EnsuredProfile {
                        user,
                        was_created: false,
                    }),
                    None => Err(StorageError::AlreadyExists {
                        entity: EntityKind::User,
                        key: email.to_string(),
                    }
                    .into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_user_profile(&self, identity: &VerifiedIdentity) -> ForgeResult<UserProfile> {
        self.require_profile(identity).await
    }

    async fn require_profile(&self, identity: &VerifiedIdentity) -> ForgeResult<UserProfile> {
        self.users
            .user_get(&identity.uid)
            .await?
            .ok_or_else(|| ForgeError::not_found(EntityKind::User, &identity.uid))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn email_local_part(email: &str) -> &str {
    email.split('@').next().filter(|s| !s.is_empty()).unwrap_or(email)
}
