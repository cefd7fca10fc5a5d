//! PostgreSQL document store.
//!
//! Profiles and roadmaps are stored as JSONB documents. A few fields are
//! lifted into columns (uid, email, owner, created_at) for uniqueness and
//! the owner listing index; the document stays the source of truth.

use crate::{DbConfig, RoadmapStore, StoreHealth, StoreResult, UserStore};
use async_trait::async_trait;
use deadpool_postgres::Pool;
use serde_json::Value as JsonValue;
use skillforge_core::{EntityKind, Roadmap, RoadmapId, StorageError, UserProfile, UserUid};
use tokio_postgres::error::SqlState;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS skillforge_users (
    uid         TEXT PRIMARY KEY,
    email       TEXT NOT NULL,
    doc         JSONB NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL,
    CONSTRAINT skillforge_users_email_key UNIQUE (email)
);

CREATE TABLE IF NOT EXISTS skillforge_roadmaps (
    id          UUID PRIMARY KEY,
    owner_uid   TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL,
    doc         JSONB NOT NULL
);

CREATE INDEX IF NOT EXISTS skillforge_roadmaps_owner_created_idx
    ON skillforge_roadmaps (owner_uid, created_at DESC);
";

/// Document store over a deadpool-postgres pool.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: Pool,
}

impl PgDocumentStore {
    /// Create a new store with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new store from configuration.
    pub fn from_config(config: &DbConfig) -> StoreResult<Self> {
        Ok(Self::new(config.create_pool()?))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Create tables and indexes if they do not exist.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        let conn = self.get_conn().await?;
        conn.batch_execute(SCHEMA).await.map_err(backend)
    }

    async fn get_conn(&self) -> StoreResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| StorageError::Backend {
            reason: format!("Failed to get connection: {}", e),
        })
    }
}

impl std::fmt::Debug for PgDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgDocumentStore")
            .field("pool_size", &self.pool_size())
            .finish()
    }
}

fn backend(e: tokio_postgres::Error) -> StorageError {
    StorageError::Backend {
        reason: e.to_string(),
    }
}

fn to_doc<T: serde::Serialize>(value: &T) -> StoreResult<JsonValue> {
    serde_json::to_value(value).map_err(|e| StorageError::Serialization {
        reason: e.to_string(),
    })
}

fn from_doc<T: serde::de::DeserializeOwned>(doc: JsonValue) -> StoreResult<T> {
    serde_json::from_value(doc).map_err(|e| StorageError::Serialization {
        reason: e.to_string(),
    })
}

/// Translate unique violations on the users table into `AlreadyExists`.
fn user_insert_error(e: tokio_postgres::Error, profile: &UserProfile) -> StorageError {
    let unique_constraint = e
        .as_db_error()
        .filter(|db| *db.code() == SqlState::UNIQUE_VIOLATION)
        .map(|db| db.constraint().unwrap_or_default().to_string());

    match unique_constraint {
        Some(constraint) if constraint.contains("email") => StorageError::AlreadyExists {
            entity: EntityKind::User,
            key: profile.email.clone(),
        },
        Some(_) => StorageError::AlreadyExists {
            entity: EntityKind::User,
            key: profile.uid.to_string(),
        },
        None => backend(e),
    }
}

// ============================================================================
// USER OPERATIONS
// ============================================================================

#[async_trait]
impl UserStore for PgDocumentStore {
    async fn user_get(&self, uid: &UserUid) -> StoreResult<Option<UserProfile>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt("SELECT doc FROM skillforge_users WHERE uid = $1", &[&uid.as_str()])
            .await
            .map_err(backend)?;

        row.map(|r| from_doc(r.get::<_, JsonValue>(0))).transpose()
    }

    async fn user_insert(&self, profile: &UserProfile) -> StoreResult<()> {
        let conn = self.get_conn().await?;
        let doc = to_doc(profile)?;
        conn.execute(
            "INSERT INTO skillforge_users (uid, email, doc, created_at, updated_at)
             VALUES ($1, lower($2), $3, $4, $5)",
            &[
                &profile.uid.as_str(),
                &profile.email,
                &doc,
                &profile.created_at,
                &profile.updated_at,
            ],
        )
        .await
        .map_err(|e| user_insert_error(e, profile))?;
        Ok(())
    }

    async fn user_update(&self, profile: &UserProfile) -> StoreResult<()> {
        let conn = self.get_conn().await?;
        let doc = to_doc(profile)?;
        let updated = conn
            .execute(
                "UPDATE skillforge_users SET doc = $2, updated_at = $3 WHERE uid = $1",
                &[&profile.uid.as_str(), &doc, &profile.updated_at],
            )
            .await
            .map_err(backend)?;

        if updated == 0 {
            return Err(StorageError::NotFound {
                entity: EntityKind::User,
                id: profile.uid.to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// ROADMAP OPERATIONS
// ============================================================================

#[async_trait]
impl RoadmapStore for PgDocumentStore {
    async fn roadmap_insert(&self, roadmap: &Roadmap) -> StoreResult<()> {
        let conn = self.get_conn().await?;
        let doc = to_doc(roadmap)?;
        conn.execute(
            "INSERT INTO skillforge_roadmaps (id, owner_uid, created_at, doc)
             VALUES ($1, $2, $3, $4)",
            &[
                &roadmap.id.as_uuid(),
                &roadmap.owner.as_str(),
                &roadmap.created_at,
                &doc,
            ],
        )
        .await
        .map_err(|e| match e.code() {
            Some(code) if *code == SqlState::UNIQUE_VIOLATION => StorageError::AlreadyExists {
                entity: EntityKind::Roadmap,
                key: roadmap.id.to_string(),
            },
            _ => backend(e),
        })?;
        Ok(())
    }

    async fn roadmap_get(&self, id: RoadmapId) -> StoreResult<Option<Roadmap>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "SELECT doc FROM skillforge_roadmaps WHERE id = $1",
                &[&id.as_uuid()],
            )
            .await
            .map_err(backend)?;

        row.map(|r| from_doc(r.get::<_, JsonValue>(0))).transpose()
    }

    async fn roadmap_update(&self, roadmap: &Roadmap) -> StoreResult<()> {
        let conn = self.get_conn().await?;
        let doc = to_doc(roadmap)?;
        let updated = conn
            .execute(
                "UPDATE skillforge_roadmaps SET doc = $2 WHERE id = $1",
                &[&roadmap.id.as_uuid(), &doc],
            )
            .await
            .map_err(backend)?;

        if updated == 0 {
            return Err(StorageError::NotFound {
                entity: EntityKind::Roadmap,
                id: roadmap.id.to_string(),
            });
        }
        Ok(())
    }

    async fn roadmap_list_by_owner(&self, owner: &UserUid) -> StoreResult<Vec<Roadmap>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT doc FROM skillforge_roadmaps
                 WHERE owner_uid = $1
                 ORDER BY created_at DESC, id DESC",
                &[&owner.as_str()],
            )
            .await
            .map_err(backend)?;

        rows.into_iter()
            .map(|r| from_doc(r.get::<_, JsonValue>(0)))
            .collect()
    }

    async fn roadmap_delete(&self, id: RoadmapId) -> StoreResult<bool> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM skillforge_roadmaps WHERE id = $1", &[&id.as_uuid()])
            .await
            .map_err(backend)?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl StoreHealth for PgDocumentStore {
    async fn ping(&self) -> StoreResult<()> {
        let conn = self.get_conn().await?;
        conn.simple_query("SELECT 1").await.map_err(backend)?;
        Ok(())
    }
}
