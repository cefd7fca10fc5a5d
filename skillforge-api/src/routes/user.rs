//! User REST API Routes
//!
//! Registration upsert and profile lookup for the authenticated caller.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing, Json, Router};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    extractors::ApiJson,
    middleware::AuthExtractor,
    services::RoadmapLifecycle,
    state::AppState,
    types::{RegisterUserRequest, RegisterUserResponse, UserProfileResponse},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/user/register - Create the caller's profile if it is missing
#[utoipa::path(
    post,
    path = "/api/user/register",
    tag = "Users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterUserResponse),
        (status = 200, description = "User already exists", body = RegisterUserResponse),
        (status = 400, description = "Email missing", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Body uid does not match the token", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn register_user(
    State(lifecycle): State<Arc<RoadmapLifecycle>>,
    AuthExtractor(identity): AuthExtractor,
    ApiJson(req): ApiJson<RegisterUserRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(uid) = req.uid.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        if uid != identity.uid.as_str() {
            tracing::warn!(token_uid = %identity.uid, body_uid = uid, "Register uid mismatch");
            return Err(ApiError::forbidden(
                "Request uid does not match the authenticated user.",
            ));
        }
    }

    let ensured = lifecycle
        .ensure_user_profile(&identity, req.email.as_deref(), req.name.as_deref())
        .await?;

    let (status, message) = if ensured.was_created {
        (StatusCode::CREATED, "User registered successfully")
    } else {
        (StatusCode::OK, "User already registered")
    };

    Ok((
        status,
        Json(RegisterUserResponse {
            message: message.to_string(),
            user: ensured.user,
        }),
    ))
}

/// GET /api/user/profile - Caller's profile with level progress
#[utoipa::path(
    get,
    path = "/api/user/profile",
    tag = "Users",
    responses(
        (status = 200, description = "User profile", body = UserProfileResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "User not registered", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(lifecycle): State<Arc<RoadmapLifecycle>>,
    AuthExtractor(identity): AuthExtractor,
) -> ApiResult<Json<UserProfileResponse>> {
    let user = lifecycle.get_user_profile(&identity).await?;
    Ok(Json(user.into()))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the user router. Mount it behind the auth middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/register", routing::post(register_user))
        .route("/profile", routing::get(get_profile))
        .with_state(state)
}
