//! API Configuration Module
//!
//! Bind address, CORS and environment settings. Configuration is loaded from
//! environment variables with defaults suited to local development against
//! the Vite dev server.

use std::net::SocketAddr;

use crate::error::{ApiError, ApiResult};

/// Frontend origin used when neither `SKILLFORGE_CORS_ORIGINS` nor
/// `FRONTEND_URL` is set.
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// Port used when neither `PORT` nor `SKILLFORGE_API_PORT` is set.
pub const DEFAULT_PORT: u16 = 5000;

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for binding, CORS and production hardening.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind.
    pub bind_host: String,

    /// TCP port to listen on.
    pub port: u16,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins. Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Deployment environment name (development, staging, production).
    pub environment: String,

    /// Serve Prometheus metrics at `/metrics`.
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_origins: vec![DEFAULT_FRONTEND_ORIGIN.to_string()],
            cors_allow_credentials: true,
            cors_max_age_secs: 86400, // 24 hours
            environment: "development".to_string(),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `SKILLFORGE_API_BIND`: Interface to bind (default: 0.0.0.0)
    /// - `PORT` / `SKILLFORGE_API_PORT`: Listen port (default: 5000)
    /// - `SKILLFORGE_CORS_ORIGINS`: Comma-separated allowed origins
    /// - `FRONTEND_URL`: Single allowed origin when the list above is unset
    /// - `SKILLFORGE_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: true)
    /// - `SKILLFORGE_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `SKILLFORGE_ENVIRONMENT`: Deployment environment (default: development)
    /// - `SKILLFORGE_METRICS_ENABLED`: "false" or "0" hides /metrics (default: true)
    pub fn from_env() -> ApiResult<Self> {
        let port = match std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("SKILLFORGE_API_PORT").ok())
        {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", raw)))?,
            None => DEFAULT_PORT,
        };

        let cors_origins = resolve_cors_origins(
            std::env::var("SKILLFORGE_CORS_ORIGINS").ok().as_deref(),
            std::env::var("FRONTEND_URL").ok().as_deref(),
        );

        let cors_allow_credentials = std::env::var("SKILLFORGE_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(true);

        let cors_max_age_secs = std::env::var("SKILLFORGE_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        Ok(Self {
            bind_host: std::env::var("SKILLFORGE_API_BIND")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
            environment: std::env::var("SKILLFORGE_ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            metrics_enabled: std::env::var("SKILLFORGE_METRICS_ENABLED")
                .map(|s| parse_flag(&s))
                .unwrap_or(true),
        })
    }

    /// Check if running in a production environment.
    pub fn is_production(&self) -> bool {
        is_production_name(&self.environment)
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == origin)
    }
}

/// Anything but an explicit off value counts as enabled.
fn parse_flag(raw: &str) -> bool {
    !matches!(raw.trim().to_lowercase().as_str(), "false" | "0" | "off" | "no")
}

pub(crate) fn is_production_name(environment: &str) -> bool {
    matches!(
        environment.trim().to_lowercase().as_str(),
        "production" | "prod"
    )
}

/// Explicit origin list wins, then the single frontend URL, then the
/// local dev server.
fn resolve_cors_origins(origins: Option<&str>, frontend_url: Option<&str>) -> Vec<String> {
    let listed: Vec<String> = origins
        .map(|s| {
            s.split(',')
                .map(|o| o.trim().trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty())
                .collect()
        })
        .unwrap_or_default();
    if !listed.is_empty() {
        return listed;
    }

    match frontend_url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => vec![url.trim_end_matches('/').to_string()],
        None => vec![DEFAULT_FRONTEND_ORIGIN.to_string()],
    }
}
