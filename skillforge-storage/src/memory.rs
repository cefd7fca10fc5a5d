//! In-memory document store.

use crate::{sort_newest_first, RoadmapStore, StoreHealth, StoreResult, UserStore};
use async_trait::async_trait;
use skillforge_core::{EntityKind, Roadmap, RoadmapId, StorageError, UserProfile, UserUid};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory store for tests and local development.
///
/// Cloning shares the underlying maps.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    users: Arc<RwLock<HashMap<UserUid, UserProfile>>>,
    roadmaps: Arc<RwLock<HashMap<RoadmapId, Roadmap>>>,
}

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| StorageError::LockPoisoned)
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| StorageError::LockPoisoned)
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored user profiles.
    pub fn user_count(&self) -> StoreResult<usize> {
        Ok(read(&self.users)?.len())
    }

    /// Number of stored roadmaps.
    pub fn roadmap_count(&self) -> StoreResult<usize> {
        Ok(read(&self.roadmaps)?.len())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn user_get(&self, uid: &UserUid) -> StoreResult<Option<UserProfile>> {
        Ok(read(&self.users)?.get(uid).cloned())
    }

    async fn user_insert(&self, profile: &UserProfile) -> StoreResult<()> {
        let mut users = write(&self.users)?;
        if users.contains_key(&profile.uid) {
            return Err(StorageError::AlreadyExists {
                entity: EntityKind::User,
                key: profile.uid.to_string(),
            });
        }
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&profile.email))
        {
            return Err(StorageError::AlreadyExists {
                entity: EntityKind::User,
                key: profile.email.clone(),
            });
        }
        users.insert(profile.uid.clone(), profile.clone());
        Ok(())
    }

    async fn user_update(&self, profile: &UserProfile) -> StoreResult<()> {
        let mut users = write(&self.users)?;
        let slot = users.get_mut(&profile.uid).ok_or_else(|| StorageError::NotFound {
            entity: EntityKind::User,
            id: profile.uid.to_string(),
        })?;
        *slot = profile.clone();
        Ok(())
    }
}

#[async_trait]
impl RoadmapStore for InMemoryStore {
    async fn roadmap_insert(&self, roadmap: &Roadmap) -> StoreResult<()> {
        let mut roadmaps = write(&self.roadmaps)?;
        if roadmaps.contains_key(&roadmap.id) {
            return Err(StorageError::AlreadyExists {
                entity: EntityKind::Roadmap,
                key: roadmap.id.to_string(),
            });
        }
        roadmaps.insert(roadmap.id, roadmap.clone());
        Ok(())
    }

    async fn roadmap_get(&self, id: RoadmapId) -> StoreResult<Option<Roadmap>> {
        Ok(read(&self.roadmaps)?.get(&id).cloned())
    }

    async fn roadmap_update(&self, roadmap: &Roadmap) -> StoreResult<()> {
        let mut roadmaps = write(&self.roadmaps)?;
        let slot = roadmaps.get_mut(&roadmap.id).ok_or_else(|| StorageError::NotFound {
            entity: EntityKind::Roadmap,
            id: roadmap.id.to_string(),
        })?;
        *slot = roadmap.clone();
        Ok(())
    }

    async fn roadmap_list_by_owner(&self, owner: &UserUid) -> StoreResult<Vec<Roadmap>> {
        let mut owned: Vec<Roadmap> = read(&self.roadmaps)?
            .values()
            .filter(|r| r.is_owned_by(owner))
            .cloned()
            .collect();
        sort_newest_first(&mut owned);
        Ok(owned)
    }

    async fn roadmap_delete(&self, id: RoadmapId) -> StoreResult<bool> {
        Ok(write(&self.roadmaps)?.remove(&id).is_some())
    }
}

#[async_trait]
impl StoreHealth for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        read(&self.users).map(|_| ())
    }
}
