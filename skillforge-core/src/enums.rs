//! Enum types for SkillForge entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// TASK CATEGORY
// ============================================================================

/// Fixed task taxonomy, ordered from introductory to capstone work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum TaskCategory {
    /// Core concepts and setup.
    Foundation,
    /// Hands-on practice building things.
    Implementation,
    /// Complex patterns and deeper theory.
    Advanced,
    /// Expert-level or capstone projects.
    Mastery,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 4] = [
        TaskCategory::Foundation,
        TaskCategory::Implementation,
        TaskCategory::Advanced,
        TaskCategory::Mastery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Foundation => "Foundation",
            TaskCategory::Implementation => "Implementation",
            TaskCategory::Advanced => "Advanced",
            TaskCategory::Mastery => "Mastery",
        }
    }
}

/// Error returned when a category label is not part of the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid TaskCategory: {0}")]
pub struct TaskCategoryParseError(pub String);

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskCategory {
    type Err = TaskCategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "foundation" | "foundations" => Ok(TaskCategory::Foundation),
            "implementation" => Ok(TaskCategory::Implementation),
            "advanced" => Ok(TaskCategory::Advanced),
            "mastery" => Ok(TaskCategory::Mastery),
            _ => Err(TaskCategoryParseError(s.to_string())),
        }
    }
}

// ============================================================================
// ENTITY KIND
// ============================================================================

/// Entity discriminator used in not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EntityKind {
    User,
    Roadmap,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            EntityKind::User => "User",
            EntityKind::Roadmap => "Roadmap",
        };
        write!(f, "{}", value)
    }
}

fn normalize_token(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
