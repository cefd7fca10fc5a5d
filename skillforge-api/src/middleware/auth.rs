//! Axum Middleware for Authentication
//!
//! This module provides Axum middleware that:
//! - Reads the `Authorization: Bearer <token>` header
//! - Verifies the token through the injected `IdentityVerifier`
//! - Injects the `VerifiedIdentity` into request extensions
//! - Returns 401 for missing, malformed, invalid or expired credentials

use crate::error::ApiError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use skillforge_core::{AuthError, IdentityVerifier, VerifiedIdentity};
use std::sync::Arc;

// ============================================================================
// MIDDLEWARE STATE
// ============================================================================

/// Shared state for authentication middleware.
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AuthMiddlewareState {
    pub fn new(verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { verifier }
    }
}

impl std::fmt::Debug for AuthMiddlewareState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthMiddlewareState")
            .field("verifier", &"<IdentityVerifier>")
            .finish()
    }
}

// ============================================================================
// MIDDLEWARE FUNCTION
// ============================================================================

/// Pull the token out of an `Authorization` header value.
///
/// The scheme is matched case-insensitively. A header with another scheme
/// is malformed; a Bearer header with nothing after it counts as missing.
pub fn bearer_token(header_value: Option<&str>) -> Result<&str, AuthError> {
    let value = header_value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingCredential)?;

    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedCredential);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}

/// Axum middleware for bearer-token authentication.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, middleware};
/// use skillforge_api::middleware::{auth_middleware, AuthMiddlewareState};
///
/// let auth_state = AuthMiddlewareState::new(verifier);
///
/// let app = Router::new()
///     .route("/api/roadmap/all", axum::routing::get(|| async { "OK" }))
///     .layer(middleware::from_fn_with_state(auth_state, auth_middleware));
/// ```
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthMiddlewareError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = bearer_token(auth_header).map_err(AuthMiddlewareError::from)?;
    let identity = state.verifier.verify(token).await.map_err(|e| {
        tracing::debug!(error = %e, "Token verification failed");
        AuthMiddlewareError::from(e)
    })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Error wrapper for middleware that implements IntoResponse.
#[derive(Debug)]
pub struct AuthMiddlewareError(pub ApiError);

impl From<AuthError> for AuthMiddlewareError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AuthMiddlewareError {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

// ============================================================================
// TYPED EXTRACTOR
// ============================================================================

/// Typed Axum extractor for the verified identity.
///
/// `auth_middleware` must be applied to the route; without it the extractor
/// rejects with 500.
#[derive(Debug, Clone)]
pub struct AuthExtractor(pub VerifiedIdentity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthExtractor
where
    S: Send + Sync,
{
    type Rejection = AuthMiddlewareError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedIdentity>()
            .cloned()
            .map(AuthExtractor)
            .ok_or_else(|| {
                AuthMiddlewareError(ApiError::internal_error(
                    "Verified identity not found in request extensions. \
                     Ensure auth_middleware is applied to this route.",
                ))
            })
    }
}

impl std::ops::Deref for AuthExtractor {
    type Target = VerifiedIdentity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use skillforge_test_utils::{fixtures, StaticIdentityVerifier};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let verifier = StaticIdentityVerifier::new()
            .with_identity("good-token", fixtures::identity("uid-1"))
            .with_expired("old-token");
        let auth_state = AuthMiddlewareState::new(Arc::new(verifier));

        Router::new()
            .route(
                "/protected",
                get(|AuthExtractor(identity): AuthExtractor| async move {
                    identity.uid.to_string()
                }),
            )
            .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
    }

    async fn status_and_body(header: Option<&str>) -> Result<(StatusCode, Vec<u8>), String> {
        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = header {
            builder = builder.header("authorization", value);
        }
        let request = builder.body(Body::empty()).map_err(|e| e.to_string())?;

        let response = test_app()
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| e.to_string())?;
        Ok((status, body.to_vec()))
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")), Ok("abc"));
        assert_eq!(bearer_token(Some("bearer  abc ")), Ok("abc"));
        assert_eq!(bearer_token(None), Err(AuthError::MissingCredential));
        assert_eq!(bearer_token(Some("   ")), Err(AuthError::MissingCredential));
        assert_eq!(bearer_token(Some("Bearer")), Err(AuthError::MissingCredential));
        assert_eq!(
            bearer_token(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::MalformedCredential)
        );
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() -> Result<(), String> {
        let (status, body) = status_and_body(Some("Bearer good-token")).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"uid-1");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() -> Result<(), String> {
        let (status, body) = status_and_body(None).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let error: ApiError = serde_json::from_slice(&body).map_err(|e| e.to_string())?;
        assert_eq!(error.code, ErrorCode::Unauthorized);
        assert_eq!(error.message, "No token provided");
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_token_is_invalid() -> Result<(), String> {
        let (status, body) = status_and_body(Some("Bearer forged")).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let error: ApiError = serde_json::from_slice(&body).map_err(|e| e.to_string())?;
        assert_eq!(error.code, ErrorCode::InvalidToken);
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_token_asks_for_reauthentication() -> Result<(), String> {
        let (status, body) = status_and_body(Some("Bearer old-token")).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let error: ApiError = serde_json::from_slice(&body).map_err(|e| e.to_string())?;
        assert_eq!(error.code, ErrorCode::TokenExpired);
        assert_eq!(error.message, "Token expired. Please re-authenticate.");
        Ok(())
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_is_500() -> Result<(), String> {
        let app = Router::new().route(
            "/bare",
            get(|AuthExtractor(identity): AuthExtractor| async move { identity.uid.to_string() }),
        );
        let request = Request::builder()
            .uri("/bare")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;
        let response = app.oneshot(request).await.map_err(|e| format!("{:?}", e))?;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }
}
