//! SkillForge API Server Entry Point
//!
//! Bootstraps configuration, connects the store, builds the content
//! generator and starts the Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use skillforge_api::telemetry::{init_tracing, TelemetryConfig};
use skillforge_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, AuthConfig, JwtIdentityVerifier,
};
use skillforge_core::ForgeError;
use skillforge_llm::{build_generator, GeneratorConfig};
use skillforge_storage::{StoreConfig, StoreHandles};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env()?;
    let auth_config = AuthConfig::from_env();
    auth_config.validate_for_environment(&api_config.environment)?;

    let store_config = StoreConfig::from_env().map_err(ForgeError::from)?;
    let stores = StoreHandles::connect(&store_config).await?;

    let generator_config = GeneratorConfig::from_env().map_err(ForgeError::from)?;
    let generator = build_generator(&generator_config)?;
    tracing::info!(provider = generator.provider(), "Content generator ready");

    let state = AppState::new(generator, stores);
    let verifier = Arc::new(JwtIdentityVerifier::new(auth_config));
    let app: Router = create_api_router(state, &api_config, verifier)?;

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, environment = %api_config.environment, "Starting SkillForge API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
