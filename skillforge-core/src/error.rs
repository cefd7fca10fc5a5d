//! Error types for SkillForge operations

use crate::EntityKind;
use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity:?} with id {id}")]
    NotFound { entity: EntityKind, id: String },

    #[error("Entity already exists: {entity:?} with key {key}")]
    AlreadyExists { entity: EntityKind, key: String },

    #[error("Storage backend failure: {reason}")]
    Backend { reason: String },

    #[error("Document serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Content generator errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("No content generator configured")]
    ProviderNotConfigured,

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Rate limited by {provider}, retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: u64,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Generated task list rejected: {reason}")]
    MalformedOutput { reason: String },
}

/// Bearer credential errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("No token provided")]
    MissingCredential,

    #[error("Malformed authorization header")]
    MalformedCredential,

    #[error("Invalid token: {reason}")]
    InvalidCredential { reason: String },

    #[error("Token expired. Please re-authenticate.")]
    Expired,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Provider not supported: {provider}")]
    ProviderNotSupported { provider: String },
}

/// Master error type for all SkillForge errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForgeError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl ForgeError {
    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }
}

/// Result type alias for SkillForge operations.
pub type ForgeResult<T> = Result<T, ForgeError>;

// =============================================================================
// TESTS
// =============================================================================
