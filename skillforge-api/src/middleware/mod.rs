//! Middleware modules for SkillForge API
//!
//! - `auth`: bearer-token authentication middleware and the typed
//!   `AuthExtractor` handlers use to read the verified identity.
//!
//! # Middleware Order
//!
//! ```ignore
//! Router::new()
//!     .nest("/api", api_routes.layer(from_fn_with_state(auth_state, auth_middleware)))
//!     // Observability wraps everything, CORS is outermost
//!     .layer(from_fn(observability_middleware))
//!     .layer(cors)
//! ```

mod auth;

pub use auth::{
    auth_middleware, bearer_token, AuthExtractor, AuthMiddlewareError, AuthMiddlewareState,
};
