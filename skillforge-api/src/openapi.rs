//! OpenAPI Specification for the SkillForge API
//!
//! Generated with utoipa from the route annotations and wire types.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{health, roadmap, user};
use crate::telemetry::metrics;
use crate::types::*;

use skillforge_core::{
    LevelProgress, Roadmap, RoadmapId, RoadmapProgress, Task, TaskCategory, UserProfile, UserUid,
};

/// OpenAPI document for the SkillForge API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SkillForge API",
        version = "0.1.0",
        description = "Generated learning roadmaps with task completion, XP and levels",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local Development")
    ),
    tags(
        (name = "Users", description = "Registration and profile progress"),
        (name = "Roadmaps", description = "Roadmap generation, retrieval and completion"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        // === User Routes ===
        user::register_user,
        user::get_profile,

        // === Roadmap Routes ===
        roadmap::generate_roadmap,
        roadmap::list_roadmaps,
        roadmap::get_roadmap,
        roadmap::delete_roadmap,
        roadmap::complete_task,
        roadmap::mark_roadmap_completed,

        // === Health & Metrics ===
        health::ping,
        health::liveness,
        health::readiness,
        metrics::metrics_handler,
    ),
    components(
        schemas(
            // Errors
            ApiError,
            ErrorCode,

            // Domain types
            Roadmap,
            RoadmapId,
            Task,
            TaskCategory,
            UserProfile,
            UserUid,
            LevelProgress,
            RoadmapProgress,

            // Request/response types
            RegisterUserRequest,
            RegisterUserResponse,
            UserProfileResponse,
            GenerateRoadmapRequest,
            CompleteTaskRequest,
            CompleteTaskResponse,
            RoadmapResponse,
            RoadmapMessageResponse,
            MessageResponse,

            // Health
            HealthResponse,
            HealthStatus,
            HealthDetails,
            ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Identity provider ID token"))
                        .build(),
                ),
            );
        }
    }
}

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
