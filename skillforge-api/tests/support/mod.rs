//! Shared harness for router-level integration tests.
//!
//! Builds the full router over an in-memory store, a scripted generator and
//! a static token table, then drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use skillforge_api::{create_api_router, ApiConfig, AppState};
use skillforge_core::{IdentityVerifier, Roadmap, UserProfile, UserUid};
use skillforge_storage::{RoadmapStore, StoreHandles, UserStore};
use skillforge_test_utils::{fixtures, InMemoryStore, ScriptedTaskGenerator, StaticIdentityVerifier};
use tower::ServiceExt;

pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";
pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB_TOKEN: &str = "bob-token";
pub const EXPIRED_TOKEN: &str = "expired-token";

pub type TestResult<T = ()> = Result<T, String>;

/// Static verifier that knows Alice, Bob and one expired token.
pub fn test_verifier() -> StaticIdentityVerifier {
    StaticIdentityVerifier::new()
        .with_identity(ALICE_TOKEN, fixtures::identity(ALICE))
        .with_identity(BOB_TOKEN, fixtures::identity(BOB))
        .with_expired(EXPIRED_TOKEN)
}

pub struct TestApp {
    pub router: Router,
    pub store: InMemoryStore,
    pub generator: Arc<ScriptedTaskGenerator>,
}

impl TestApp {
    pub fn new() -> TestResult<Self> {
        Self::with_generator(ScriptedTaskGenerator::new())
    }

    pub fn with_generator(generator: ScriptedTaskGenerator) -> TestResult<Self> {
        Self::build(generator, Arc::new(test_verifier()))
    }

    pub fn build(
        generator: ScriptedTaskGenerator,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> TestResult<Self> {
        Self::with_config(generator, verifier, &ApiConfig::default())
    }

    pub fn with_config(
        generator: ScriptedTaskGenerator,
        verifier: Arc<dyn IdentityVerifier>,
        api_config: &ApiConfig,
    ) -> TestResult<Self> {
        let store = InMemoryStore::new();
        let generator = Arc::new(generator);
        let state = AppState::new(generator.clone(), StoreHandles::from_store(store.clone()));
        let router = create_api_router(state, api_config, verifier)
            .map_err(|e| format!("router build failed: {}", e))?;
        Ok(Self {
            router,
            store,
            generator,
        })
    }

    /// Send one request and decode the body as JSON (text bodies become a
    /// JSON string).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResult<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .map_err(|e| e.to_string())?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| format!("request failed: {:?}", e))?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| e.to_string())?;
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        Ok((status, value))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResult<(StatusCode, Value)> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> TestResult<(StatusCode, Value)> {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResult<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, token, None).await
    }

    pub async fn seed_user(&self, profile: &UserProfile) -> TestResult {
        self.store
            .user_insert(profile)
            .await
            .map_err(|e| e.to_string())
    }

    pub async fn seed_roadmap(&self, roadmap: &Roadmap) -> TestResult {
        self.store
            .roadmap_insert(roadmap)
            .await
            .map_err(|e| e.to_string())
    }

    pub async fn stored_user(&self, uid: &str) -> TestResult<Option<UserProfile>> {
        self.store
            .user_get(&UserUid::new(uid))
            .await
            .map_err(|e| e.to_string())
    }
}

/// Error code string from an `ApiError` body.
pub fn error_code(body: &Value) -> &str {
    body["code"].as_str().unwrap_or_default()
}
