//! Roadmap-related API types

use serde::{Deserialize, Serialize};
use skillforge_core::{Roadmap, RoadmapProgress, UserProfile};

/// Request to generate a roadmap.
///
/// Both fields are checked by the lifecycle service, so a missing field
/// and a blank field are reported the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenerateRoadmapRequest {
    /// Skill to learn, e.g. "Rust"
    #[serde(default)]
    pub skill: Option<String>,
    /// Free-text time frame, e.g. "4 weeks"
    #[serde(default)]
    pub duration: Option<String>,
}

/// Request to complete one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskRequest {
    /// Zero-based position in the roadmap's task list
    pub task_index: i64,
}

/// Roadmap with its progress summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RoadmapResponse {
    #[serde(flatten)]
    pub roadmap: Roadmap,
    pub progress: RoadmapProgress,
}

impl From<Roadmap> for RoadmapResponse {
    fn from(roadmap: Roadmap) -> Self {
        let progress = roadmap.progress();
        Self { roadmap, progress }
    }
}

/// `{ message, roadmap }` envelope used by generate and mark-completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RoadmapMessageResponse {
    pub message: String,
    pub roadmap: RoadmapResponse,
}

impl RoadmapMessageResponse {
    pub fn new(message: impl Into<String>, roadmap: Roadmap) -> Self {
        Self {
            message: message.into(),
            roadmap: roadmap.into(),
        }
    }
}

/// Response for complete-task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskResponse {
    pub message: String,
    pub roadmap: RoadmapResponse,
    pub user: UserProfile,
    /// True only on the call that completed the last open task
    pub roadmap_newly_completed: bool,
}
