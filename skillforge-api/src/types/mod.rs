//! API Request and Response Types
//!
//! Wire shapes for the REST endpoints. Field names are camelCase to match
//! the web client.

// User types
mod user;
pub use user::*;

// Roadmap types
mod roadmap;
pub use roadmap::*;

use serde::{Deserialize, Serialize};

/// Plain `{ message }` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
