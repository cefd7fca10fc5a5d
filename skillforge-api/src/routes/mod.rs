//! REST API Routes Module
//!
//! Includes:
//! - User and roadmap routes under /api (bearer auth required)
//! - Health check endpoints (Kubernetes-compatible)
//! - Prometheus metrics and the OpenAPI document
//! - CORS support for the browser client

pub mod health;
pub mod roadmap;
pub mod user;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use skillforge_core::IdentityVerifier;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{auth_middleware, AuthMiddlewareState};
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

// Re-export route creation functions for convenience
pub use health::create_router as health_router;
pub use roadmap::create_router as roadmap_router;
pub use user::create_router as user_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json endpoint.
#[cfg(not(feature = "swagger-ui"))]
async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    axum::Json(ApiDoc::openapi())
}

// ============================================================================
// PRODUCTION VALIDATION
// ============================================================================

/// Validate API configuration for production use.
fn validate_api_config_for_production(config: &ApiConfig) -> ApiResult<()> {
    if config.cors_origins.is_empty() {
        return Err(ApiError::invalid_input(
            "CORS origins not configured for production. Set SKILLFORGE_CORS_ORIGINS.",
        ));
    }
    if config
        .cors_origins
        .iter()
        .any(|o| o.starts_with("http://localhost"))
    {
        tracing::warn!(
            origins = ?config.cors_origins,
            "CORS allows a localhost origin in production"
        );
    }
    Ok(())
}

// ============================================================================
// ROUTER BUILDER
// ============================================================================

/// Builder for the API router with auth on every /api route.
///
/// Public routes (banner, health, metrics, OpenAPI) skip authentication.
pub struct SecureRouterBuilder {
    state: AppState,
    api_config: ApiConfig,
    auth_state: AuthMiddlewareState,
}

impl SecureRouterBuilder {
    /// Create a new SecureRouterBuilder.
    ///
    /// In production the CORS configuration is validated and startup fails
    /// if critical settings are missing.
    pub fn new(
        state: AppState,
        api_config: ApiConfig,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> ApiResult<Self> {
        if api_config.is_production() {
            validate_api_config_for_production(&api_config)?;
        }

        Ok(Self {
            state,
            api_config,
            auth_state: AuthMiddlewareState::new(verifier),
        })
    }

    /// Routes that act on behalf of the verified caller.
    fn build_api_routes(&self) -> Router {
        Router::new()
            .nest("/user", user::create_router(self.state.clone()))
            .nest("/roadmap", roadmap::create_router(self.state.clone()))
    }

    /// Build the complete router.
    ///
    /// # Middleware Order (outer to inner)
    /// 1. CORS (outermost) - handles preflight requests
    /// 2. Observability - tracing and metrics
    /// 3. Auth (innermost, only on /api/*) - validates credentials
    pub fn build(self) -> Router {
        let api_routes = self
            .build_api_routes()
            .layer(from_fn_with_state(self.auth_state.clone(), auth_middleware));

        let mut router = Router::new()
            .route("/", get(health::banner))
            .nest("/api", api_routes)
            // Health checks (no auth required)
            .nest("/health", health::create_router(self.state.clone()));

        if self.api_config.metrics_enabled {
            router = router.route("/metrics", get(metrics_handler));
        }

        // Swagger UI serves /openapi.json itself
        #[cfg(feature = "swagger-ui")]
        {
            use utoipa_swagger_ui::SwaggerUi;
            router = router.merge(
                SwaggerUi::new("/swagger-ui").url("/openapi.json", ApiDoc::openapi()),
            );
        }
        #[cfg(not(feature = "swagger-ui"))]
        {
            router = router.route("/openapi.json", get(openapi_json));
        }

        let cors = build_cors_layer(&self.api_config);

        // Execution order: CORS -> Observability -> Auth -> Handler
        router.layer(from_fn(observability_middleware)).layer(cors)
    }
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// An empty origin list allows every origin without credentials.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!("CORS: allowing origins: {:?}", config.cors_origins);
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        if config.cors_allow_credentials {
            cors.allow_origin(origins).allow_credentials(true)
        } else {
            cors.allow_origin(origins)
        }
    }
}

/// Create the complete API router.
///
/// - User and roadmap routes under /api/* (protected by bearer auth)
/// - Banner at / and health checks at /health/* (public)
/// - Metrics at /metrics
/// - OpenAPI spec at /openapi.json
/// - Swagger UI at /swagger-ui (when swagger-ui feature is enabled)
pub fn create_api_router(
    state: AppState,
    api_config: &ApiConfig,
    verifier: Arc<dyn IdentityVerifier>,
) -> ApiResult<Router> {
    SecureRouterBuilder::new(state, api_config.clone(), verifier).map(SecureRouterBuilder::build)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_production_requires_cors_origins() {
        let config = ApiConfig {
            cors_origins: Vec::new(),
            environment: "production".to_string(),
            ..ApiConfig::default()
        };
        let result = validate_api_config_for_production(&config);
        assert!(matches!(result, Err(ref e) if e.code == ErrorCode::InvalidInput));

        let configured = ApiConfig {
            cors_origins: vec!["https://skillforge.app".to_string()],
            environment: "production".to_string(),
            ..ApiConfig::default()
        };
        assert!(validate_api_config_for_production(&configured).is_ok());
    }
}
