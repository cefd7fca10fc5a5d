//! SkillForge Storage - Document Store Traits
//!
//! Async traits for persisting user profiles and roadmaps, with an in-memory
//! implementation and a PostgreSQL JSONB document store.
//!
//! Stores are plain read-modify-write: there is no version token, so
//! concurrent updates to the same document resolve as last write wins.

pub mod config;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use skillforge_core::{Roadmap, RoadmapId, StorageError, UserProfile, UserUid};
use std::sync::Arc;

pub use config::{DbConfig, StoreBackend, StoreConfig};
pub use memory::InMemoryStore;
pub use postgres::PgDocumentStore;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StorageError>;

// ============================================================================
// USER PROFILE STORE
// ============================================================================

/// Persistence for per-user progression state.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get a profile by its identity.
    async fn user_get(&self, uid: &UserUid) -> StoreResult<Option<UserProfile>>;

    /// Insert a new profile.
    ///
    /// Fails with `AlreadyExists` when the uid or the email is taken.
    async fn user_insert(&self, profile: &UserProfile) -> StoreResult<()>;

    /// Replace an existing profile. Fails with `NotFound` if absent.
    async fn user_update(&self, profile: &UserProfile) -> StoreResult<()>;
}

// ============================================================================
// ROADMAP STORE
// ============================================================================

/// Persistence for roadmap documents.
#[async_trait]
pub trait RoadmapStore: Send + Sync {
    /// Insert a new roadmap together with its full task list.
    async fn roadmap_insert(&self, roadmap: &Roadmap) -> StoreResult<()>;

    /// Get a roadmap by ID.
    async fn roadmap_get(&self, id: RoadmapId) -> StoreResult<Option<Roadmap>>;

    /// Replace an existing roadmap. Fails with `NotFound` if absent.
    async fn roadmap_update(&self, roadmap: &Roadmap) -> StoreResult<()>;

    /// List an owner's roadmaps, newest first.
    async fn roadmap_list_by_owner(&self, owner: &UserUid) -> StoreResult<Vec<Roadmap>>;

    /// Delete a roadmap. Returns false when nothing was deleted.
    async fn roadmap_delete(&self, id: RoadmapId) -> StoreResult<bool>;
}

/// Backend reachability check used by readiness probes.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;
}

// ============================================================================
// STORE HANDLES
// ============================================================================

/// Shared handles to one backing store, viewed through each trait.
#[derive(Clone)]
pub struct StoreHandles {
    pub users: Arc<dyn UserStore>,
    pub roadmaps: Arc<dyn RoadmapStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl StoreHandles {
    /// Expose a single store through all three handles.
    pub fn from_store<S>(store: S) -> Self
    where
        S: UserStore + RoadmapStore + StoreHealth + 'static,
    {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            roadmaps: store.clone(),
            health: store,
        }
    }

    /// Build the configured backend.
    ///
    /// The PostgreSQL backend creates its pool and ensures its schema before
    /// returning, so a bad connection fails at startup.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        match config.backend {
            StoreBackend::Memory => Ok(Self::from_store(InMemoryStore::new())),
            StoreBackend::Postgres => {
                let store = PgDocumentStore::from_config(&config.db)?;
                store.ensure_schema().await?;
                Ok(Self::from_store(store))
            }
        }
    }
}

/// Order roadmaps newest first. Ties on `created_at` fall back to the id,
/// which is itself time-ordered.
pub(crate) fn sort_newest_first(roadmaps: &mut [Roadmap]) {
    roadmaps.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
