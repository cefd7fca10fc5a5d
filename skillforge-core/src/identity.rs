//! Identity types for SkillForge entities

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AuthError;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn new_entity_id() -> Uuid {
    Uuid::now_v7()
}

// ============================================================================
// ROADMAP ID
// ============================================================================

/// System-generated roadmap identifier.
///
/// Backed by a UUIDv7, so ids sort by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
#[serde(transparent)]
pub struct RoadmapId(Uuid);

impl RoadmapId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh time-ordered id.
    pub fn now_v7() -> Self {
        Self(new_entity_id())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RoadmapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoadmapId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Uuid> for RoadmapId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

// ============================================================================
// USER UID
// ============================================================================

/// Stable external user identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", schema(value_type = String))]
#[serde(transparent)]
pub struct UserUid(String);

impl UserUid {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UserUid {
    fn from(uid: String) -> Self {
        Self(uid)
    }
}

impl From<&str> for UserUid {
    fn from(uid: &str) -> Self {
        Self(uid.to_string())
    }
}

impl AsRef<str> for UserUid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// IDENTITY VERIFIER
// ============================================================================

/// Result of verifying a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Stable user identifier (token subject).
    pub uid: UserUid,
    /// Email claim, when the provider includes one.
    pub email: Option<String>,
    /// Display name claim, when the provider includes one.
    pub name: Option<String>,
}

impl VerifiedIdentity {
    pub fn new(uid: impl Into<UserUid>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Verifies bearer credentials issued by the external identity provider.
///
/// One instance is built at process start and shared read-only; tests swap
/// in a static implementation.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Validate `token` and return the identity it carries.
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError>;
}
