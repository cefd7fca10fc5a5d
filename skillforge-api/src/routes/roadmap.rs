//! Roadmap REST API Routes
//!
//! Generation, listing, retrieval, deletion and completion of roadmaps.
//! Every handler acts on behalf of the verified caller; ownership is
//! enforced by the lifecycle service.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing, Json, Router};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, RoadmapPath},
    middleware::AuthExtractor,
    services::RoadmapLifecycle,
    state::AppState,
    types::{
        CompleteTaskRequest, CompleteTaskResponse, GenerateRoadmapRequest, MessageResponse,
        RoadmapMessageResponse, RoadmapResponse,
    },
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/roadmap/generate - Generate a new learning roadmap
#[utoipa::path(
    post,
    path = "/api/roadmap/generate",
    tag = "Roadmaps",
    request_body = GenerateRoadmapRequest,
    responses(
        (status = 201, description = "Roadmap generated", body = RoadmapMessageResponse),
        (status = 400, description = "Skill or duration missing", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "User not registered", body = ApiError),
        (status = 500, description = "Generation failed", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn generate_roadmap(
    State(lifecycle): State<Arc<RoadmapLifecycle>>,
    AuthExtractor(identity): AuthExtractor,
    ApiJson(req): ApiJson<GenerateRoadmapRequest>,
) -> ApiResult<impl IntoResponse> {
    let roadmap = lifecycle
        .generate(
            &identity,
            req.skill.as_deref().unwrap_or_default(),
            req.duration.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RoadmapMessageResponse::new(
            "Roadmap generated successfully!",
            roadmap,
        )),
    ))
}

/// GET /api/roadmap/all - List the caller's roadmaps, newest first
#[utoipa::path(
    get,
    path = "/api/roadmap/all",
    tag = "Roadmaps",
    responses(
        (status = 200, description = "Caller's roadmaps", body = Vec<RoadmapResponse>),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "User not registered", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_roadmaps(
    State(lifecycle): State<Arc<RoadmapLifecycle>>,
    AuthExtractor(identity): AuthExtractor,
) -> ApiResult<Json<Vec<RoadmapResponse>>> {
    let roadmaps = lifecycle.list(&identity).await?;
    Ok(Json(roadmaps.into_iter().map(RoadmapResponse::from).collect()))
}

/// GET /api/roadmap/{id} - Get one roadmap
#[utoipa::path(
    get,
    path = "/api/roadmap/{id}",
    tag = "Roadmaps",
    params(
        ("id" = String, Path, description = "Roadmap ID")
    ),
    responses(
        (status = 200, description = "Roadmap details", body = RoadmapResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Roadmap belongs to another user", body = ApiError),
        (status = 404, description = "Roadmap not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_roadmap(
    State(lifecycle): State<Arc<RoadmapLifecycle>>,
    AuthExtractor(identity): AuthExtractor,
    RoadmapPath(id): RoadmapPath,
) -> ApiResult<Json<RoadmapResponse>> {
    let roadmap = lifecycle.get(&identity, id).await?;
    Ok(Json(roadmap.into()))
}

/// DELETE /api/roadmap/{id} - Delete a roadmap
#[utoipa::path(
    delete,
    path = "/api/roadmap/{id}",
    tag = "Roadmaps",
    params(
        ("id" = String, Path, description = "Roadmap ID")
    ),
    responses(
        (status = 200, description = "Roadmap deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Roadmap belongs to another user", body = ApiError),
        (status = 404, description = "Roadmap not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_roadmap(
    State(lifecycle): State<Arc<RoadmapLifecycle>>,
    AuthExtractor(identity): AuthExtractor,
    RoadmapPath(id): RoadmapPath,
) -> ApiResult<Json<MessageResponse>> {
    lifecycle.delete(&identity, id).await?;
    Ok(Json(MessageResponse::new("Roadmap deleted successfully.")))
}

/// POST /api/roadmap/{id}/complete-task - Complete a task and award its XP
#[utoipa::path(
    post,
    path = "/api/roadmap/{id}/complete-task",
    tag = "Roadmaps",
    params(
        ("id" = String, Path, description = "Roadmap ID")
    ),
    request_body = CompleteTaskRequest,
    responses(
        (status = 200, description = "Task completed (or already completed)", body = CompleteTaskResponse),
        (status = 400, description = "Invalid task index", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Roadmap belongs to another user", body = ApiError),
        (status = 404, description = "Roadmap or user not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn complete_task(
    State(lifecycle): State<Arc<RoadmapLifecycle>>,
    AuthExtractor(identity): AuthExtractor,
    RoadmapPath(id): RoadmapPath,
    ApiJson(req): ApiJson<CompleteTaskRequest>,
) -> ApiResult<Json<CompleteTaskResponse>> {
    let outcome = lifecycle.complete_task(&identity, id, req.task_index).await?;

    let message = if outcome.task_newly_completed {
        "Task completed successfully!"
    } else {
        "Task already completed."
    };

    Ok(Json(CompleteTaskResponse {
        message: message.to_string(),
        roadmap: outcome.roadmap.into(),
        user: outcome.user,
        roadmap_newly_completed: outcome.roadmap_newly_completed,
    }))
}

/// POST /api/roadmap/{id}/mark-completed - Flag a finished roadmap as completed
#[utoipa::path(
    post,
    path = "/api/roadmap/{id}/mark-completed",
    tag = "Roadmaps",
    params(
        ("id" = String, Path, description = "Roadmap ID")
    ),
    responses(
        (status = 200, description = "Roadmap marked completed", body = RoadmapMessageResponse),
        (status = 400, description = "Not all tasks are finished", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Roadmap belongs to another user", body = ApiError),
        (status = 404, description = "Roadmap not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_roadmap_completed(
    State(lifecycle): State<Arc<RoadmapLifecycle>>,
    AuthExtractor(identity): AuthExtractor,
    RoadmapPath(id): RoadmapPath,
) -> ApiResult<Json<RoadmapMessageResponse>> {
    let outcome = lifecycle.mark_completed(&identity, id).await?;

    let message = if outcome.already_completed {
        "Roadmap already marked as completed."
    } else {
        "Roadmap marked as completed successfully!"
    };

    Ok(Json(RoadmapMessageResponse::new(message, outcome.roadmap)))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the roadmap router. Mount it behind the auth middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/generate", routing::post(generate_roadmap))
        .route("/all", routing::get(list_roadmaps))
        .route("/:id", routing::get(get_roadmap).delete(delete_roadmap))
        .route("/:id/complete-task", routing::post(complete_task))
        .route("/:id/mark-completed", routing::post(mark_roadmap_completed))
        .with_state(state)
}
