//! SkillForge Core - Entity Types
//!
//! Pure data structures and progression rules. All other crates depend on this.
//! This crate performs no I/O: persistence lives in skillforge-storage and
//! content generation lives in skillforge-llm.

pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod progression;

pub use entities::{Roadmap, Task, TaskDraft, UserProfile};
pub use enums::{EntityKind, TaskCategory, TaskCategoryParseError};
pub use error::{
    AuthError, ConfigError, ForgeError, ForgeResult, GenerationError, StorageError,
};
pub use identity::{
    new_entity_id, IdentityVerifier, RoadmapId, Timestamp, UserUid, VerifiedIdentity,
};
pub use progression::{
    apply_xp, xp_threshold, LevelProgress, RoadmapProgress, MAX_TASK_XP, MIN_TASK_XP,
    STARTING_LEVEL, XP_PER_LEVEL,
};
