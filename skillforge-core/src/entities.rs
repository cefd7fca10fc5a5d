//! Core entity structures

use crate::{RoadmapId, RoadmapProgress, TaskCategory, Timestamp, UserUid, STARTING_LEVEL};
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ============================================================================
// USER PROFILE
// ============================================================================

/// Per-user progression state, keyed by the verified identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: UserUid,
    pub name: String,
    pub email: String,
    /// Accumulated experience points. Never decreases.
    pub xp: u64,
    /// Current level, starting at 1.
    pub level: u32,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl UserProfile {
    /// Fresh profile with no XP at the starting level.
    pub fn new(uid: UserUid, name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            uid,
            name: name.into(),
            email: email.into(),
            xp: 0,
            level: STARTING_LEVEL,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// TASKS
// ============================================================================

/// Validated task descriptor produced from generator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub xp: u32,
    pub estimated_time: String,
    pub category: TaskCategory,
}

/// One unit of work inside a roadmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub title: String,
    pub description: String,
    pub xp: u32,
    pub estimated_time: String,
    pub category: TaskCategory,
    /// Once set, never reset.
    #[serde(default)]
    pub completed: bool,
}

impl From<TaskDraft> for Task {
    fn from(draft: TaskDraft) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            xp: draft.xp,
            estimated_time: draft.estimated_time,
            category: draft.category,
            completed: false,
        }
    }
}

// ============================================================================
// ROADMAP
// ============================================================================

/// Generated study plan owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub id: RoadmapId,
    pub owner: UserUid,
    pub skill: String,
    pub duration: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub is_completed: bool,
}

impl Roadmap {
    /// Build a new roadmap from validated drafts. Every task starts incomplete.
    pub fn new(
        owner: UserUid,
        skill: impl Into<String>,
        duration: impl Into<String>,
        drafts: Vec<TaskDraft>,
    ) -> Self {
        Self {
            id: RoadmapId::now_v7(),
            owner,
            skill: skill.into(),
            duration: duration.into(),
            created_at: Utc::now(),
            tasks: drafts.into_iter().map(Task::from).collect(),
            is_completed: false,
        }
    }

    pub fn is_owned_by(&self, uid: &UserUid) -> bool {
        &self.owner == uid
    }

    pub fn completed_task_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// True when there is at least one task and every task is completed.
    pub fn all_tasks_completed(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|t| t.completed)
    }

    pub fn progress(&self) -> RoadmapProgress {
        RoadmapProgress::new(self.completed_task_count(), self.tasks.len())
    }
}
