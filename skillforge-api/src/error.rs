//! Error Types for SkillForge API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//! - Conversions from the core `ForgeError` taxonomy
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use skillforge_core::{AuthError, EntityKind, ForgeError, GenerationError, StorageError};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur during API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication Errors (401, 403)
    // ========================================================================
    /// Request lacks valid authentication credentials
    Unauthorized,

    /// Request is authenticated but the resource belongs to someone else
    Forbidden,

    /// Authentication token is invalid or malformed
    InvalidToken,

    /// Authentication token has expired
    TokenExpired,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    /// Field value is out of valid range
    InvalidRange,

    /// Body is not well-formed JSON
    InvalidFormat,

    /// Operation is not allowed in the entity's current state
    InvalidState,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested user profile does not exist
    UserNotFound,

    /// Requested roadmap does not exist
    RoadmapNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// Entity with the same identifier already exists
    EntityAlreadyExists,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Database operation failed
    DatabaseError,

    /// Content generator failed or returned an unusable task list
    GenerationFailed,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized | ErrorCode::InvalidToken | ErrorCode::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            ErrorCode::Forbidden => StatusCode::FORBIDDEN,

            ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::InvalidRange
            | ErrorCode::InvalidFormat
            | ErrorCode::InvalidState => StatusCode::BAD_REQUEST,

            ErrorCode::UserNotFound | ErrorCode::RoadmapNotFound => StatusCode::NOT_FOUND,

            ErrorCode::EntityAlreadyExists => StatusCode::CONFLICT,

            ErrorCode::InternalError | ErrorCode::DatabaseError | ErrorCode::GenerationFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::Forbidden => "Access forbidden",
            ErrorCode::InvalidToken => "Invalid authentication token",
            ErrorCode::TokenExpired => "Token expired. Please re-authenticate.",

            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::InvalidRange => "Value is out of valid range",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::InvalidState => "Operation not allowed in current state",

            ErrorCode::UserNotFound => "User not found",
            ErrorCode::RoadmapNotFound => "Roadmap not found",

            ErrorCode::EntityAlreadyExists => "Entity already exists",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::GenerationFailed => "Failed to generate roadmap",
        }
    }

    /// Not-found code for an entity kind.
    pub fn not_found_for(entity: EntityKind) -> Self {
        match entity {
            EntityKind::User => ErrorCode::UserNotFound,
            EntityKind::Roadmap => ErrorCode::RoadmapNotFound,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
///
/// This type is returned by all API endpoints when an error occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (offending field, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn with_field(self, field: &str) -> Self {
        self.with_details(serde_json::json!({ "field": field }))
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    pub fn token_expired() -> Self {
        Self::from_code(ErrorCode::TokenExpired)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Missing or blank required field; `details.field` names it.
    pub fn missing_field(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingField, message).with_field(field)
    }

    /// Out-of-range value; `details.field` names it.
    pub fn invalid_range(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRange, message).with_field(field)
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFormat, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidState, message)
    }

    pub fn roadmap_not_found() -> Self {
        Self::from_code(ErrorCode::RoadmapNotFound)
    }

    pub fn entity_already_exists(entity_type: &str, key: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityAlreadyExists,
            format!("{} with key {} already exists", entity_type, key),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GenerationFailed, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

/// Fields whose absence is reported as MISSING_FIELD rather than INVALID_INPUT.
const REQUIRED_FIELDS: &[&str] = &["skill", "duration", "email"];

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential | AuthError::MalformedCredential => {
                ApiError::unauthorized(err.to_string())
            }
            AuthError::InvalidCredential { .. } => ApiError::invalid_token(err.to_string()),
            AuthError::Expired => ApiError::token_expired(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, .. } => {
                ApiError::from_code(ErrorCode::not_found_for(entity))
            }
            StorageError::AlreadyExists { entity, key } => {
                ApiError::entity_already_exists(&entity.to_string(), key)
            }
            other => {
                // Log the full error, return a generic message
                tracing::error!(error = %other, "Storage error");
                ApiError::database_error("Database operation failed")
            }
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        tracing::error!(error = %err, "Roadmap generation failed");
        ApiError::generation_failed(format!("Failed to generate roadmap: {}", err))
    }
}

impl From<ForgeError> for ApiError {
    fn from(err: ForgeError) -> Self {
        match err {
            ForgeError::NotFound { entity, .. } => {
                ApiError::from_code(ErrorCode::not_found_for(entity))
            }
            ForgeError::Forbidden { reason } => ApiError::forbidden(reason),
            ForgeError::InvalidArgument { field, reason } => {
                if field == "taskIndex" {
                    ApiError::invalid_range(&field, reason)
                } else if REQUIRED_FIELDS.contains(&field.as_str()) {
                    ApiError::missing_field(&field, reason)
                } else {
                    ApiError::invalid_input(reason).with_field(&field)
                }
            }
            ForgeError::InvalidState { reason } => ApiError::invalid_state(reason),
            ForgeError::Auth(e) => e.into(),
            ForgeError::Generation(e) => e.into(),
            ForgeError::Storage(e) => e.into(),
            ForgeError::Config(e) => {
                tracing::error!(error = %e, "Configuration error");
                ApiError::internal_error("Server configuration error")
            }
        }
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::debug!("JSON error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

/// Rejections from the `Json` extractor are client errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonSyntaxError(e) => {
                ApiError::invalid_format(format!("Malformed JSON body: {}", e.body_text()))
            }
            other => ApiError::invalid_input(other.body_text()),
        }
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
