//! SkillForge API - REST Layer
//!
//! Axum server for the SkillForge learning roadmap service. Every `/api`
//! route acts on behalf of the caller identified by a bearer token; the
//! lifecycle service enforces ownership and applies the progression rules
//! from skillforge-core.

#[macro_use]
pub mod macros;

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use auth::{
    issue_jwt_token, validate_jwt_token, AuthConfig, Claims, JwtClock, JwtIdentityVerifier,
    JwtSecret, SystemClock,
};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{auth_middleware, AuthExtractor, AuthMiddlewareState};
pub use openapi::ApiDoc;
pub use routes::{create_api_router, SecureRouterBuilder};
pub use services::{EnsuredProfile, RoadmapCompletion, RoadmapLifecycle, TaskCompletion};
pub use state::AppState;
pub use types::*;
