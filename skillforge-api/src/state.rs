//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use skillforge_llm::TaskGenerator;
use skillforge_storage::{StoreHandles, StoreHealth};

use crate::services::RoadmapLifecycle;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<RoadmapLifecycle>,
    /// Backing store reachability, used by the readiness probe.
    pub store_health: Arc<dyn StoreHealth>,
    pub start_time: Instant,
}

impl AppState {
    /// Wire the lifecycle service to one set of store handles.
    pub fn new(generator: Arc<dyn TaskGenerator>, stores: StoreHandles) -> Self {
        let lifecycle = RoadmapLifecycle::new(generator, stores.roadmaps, stores.users);
        Self {
            lifecycle: Arc::new(lifecycle),
            store_health: stores.health,
            start_time: Instant::now(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("lifecycle", &self.lifecycle)
            .field("start_time", &self.start_time)
            .finish_non_exhaustive()
    }
}

crate::impl_from_ref!(Arc<RoadmapLifecycle>, lifecycle);
crate::impl_from_ref!(Arc<dyn StoreHealth>, store_health);
crate::impl_from_ref!(Instant, start_time);
