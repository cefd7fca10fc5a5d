//! Router-level tests for registration, profile and public endpoints.

mod support;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;
use skillforge_api::{issue_jwt_token, ApiConfig, AuthConfig, JwtIdentityVerifier};
use skillforge_core::VerifiedIdentity;
use skillforge_test_utils::{fixtures, ScriptedTaskGenerator};
use support::*;
use tower::ServiceExt;

#[tokio::test]
async fn register_creates_then_returns_existing() -> TestResult {
    let app = TestApp::new()?;

    let (status, body) = app
        .post(
            "/api/user/register",
            Some(ALICE_TOKEN),
            json!({ "uid": ALICE, "email": "alice@skillforge.dev", "name": "Alice" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["uid"], ALICE);
    assert_eq!(body["user"]["xp"], 0);
    assert_eq!(body["user"]["level"], 1);

    let (status, body) = app
        .post(
            "/api/user/register",
            Some(ALICE_TOKEN),
            json!({ "email": "changed@skillforge.dev", "name": "Changed" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User already registered");
    assert_eq!(body["user"]["email"], "alice@skillforge.dev");
    assert_eq!(body["user"]["name"], "Alice");
    Ok(())
}

#[tokio::test]
async fn register_falls_back_to_token_claims() -> TestResult {
    let app = TestApp::new()?;
    let (status, body) = app.post("/api/user/register", Some(BOB_TOKEN), json!({})).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "bob@example.com");
    assert_eq!(body["user"]["name"], "Learner bob");
    Ok(())
}

#[tokio::test]
async fn register_rejects_mismatched_uid() -> TestResult {
    let app = TestApp::new()?;
    let (status, body) = app
        .post(
            "/api/user/register",
            Some(ALICE_TOKEN),
            json!({ "uid": BOB, "email": "bob@example.com" }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");
    assert!(app.stored_user(BOB).await?.is_none());
    assert!(app.stored_user(ALICE).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn register_without_any_email_is_bad_request() -> TestResult {
    let app = TestApp::build(
        ScriptedTaskGenerator::new(),
        Arc::new(
            test_verifier().with_identity("anon-token", VerifiedIdentity::new("anon")),
        ),
    )?;
    let (status, body) = app
        .post("/api/user/register", Some("anon-token"), json!({ "name": "Anon" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "MISSING_FIELD");
    assert_eq!(body["details"]["field"], "email");
    Ok(())
}

#[tokio::test]
async fn register_with_taken_email_conflicts() -> TestResult {
    let app = TestApp::new()?;
    app.seed_user(&fixtures::user_profile(ALICE)).await?;
    let (status, body) = app
        .post(
            "/api/user/register",
            Some(BOB_TOKEN),
            json!({ "email": "alice@example.com" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "ENTITY_ALREADY_EXISTS");
    Ok(())
}

#[tokio::test]
async fn malformed_json_body_is_bad_request() -> TestResult {
    let app = TestApp::new()?;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/user/register")
        .header(header::AUTHORIZATION, format!("Bearer {}", ALICE_TOKEN))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .map_err(|e| e.to_string())?;
    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| format!("{:?}", e))?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn profile_includes_level_progress() -> TestResult {
    let app = TestApp::new()?;
    app.seed_user(&fixtures::user_profile_with(ALICE, 1250, 2))
        .await?;

    let (status, body) = app.get("/api/user/profile", Some(ALICE_TOKEN)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uid"], ALICE);
    assert_eq!(body["xp"], 1250);
    assert_eq!(body["progress"]["currentThreshold"], 1000);
    assert_eq!(body["progress"]["nextThreshold"], 2000);
    assert_eq!(body["progress"]["xpIntoLevel"], 250);
    assert_eq!(body["progress"]["xpToNextLevel"], 750);

    let (status, body) = app.get("/api/user/profile", Some(BOB_TOKEN)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "USER_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn api_routes_require_credentials() -> TestResult {
    let app = TestApp::new()?;

    let (status, body) = app.get("/api/roadmap/all", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No token provided");

    let (status, body) = app.get("/api/user/profile", Some(EXPIRED_TOKEN)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "TOKEN_EXPIRED");
    assert_eq!(body["message"], "Token expired. Please re-authenticate.");

    let (status, body) = app.get("/api/user/profile", Some("forged")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "INVALID_TOKEN");
    Ok(())
}

#[tokio::test]
async fn jwt_verifier_round_trip() -> TestResult {
    let config = AuthConfig::default()
        .with_secret("integration-test-secret-that-is-long-enough")
        .map_err(|e| e.to_string())?;
    let identity = fixtures::identity(ALICE);
    let token = issue_jwt_token(&config, &identity).map_err(|e| e.to_string())?;

    let app = TestApp::build(
        ScriptedTaskGenerator::new(),
        Arc::new(JwtIdentityVerifier::new(config)),
    )?;

    let (status, body) = app.post("/api/user/register", Some(&token), json!({})).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "alice@example.com");

    let (status, _) = app.get("/api/user/profile", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn public_routes_skip_auth() -> TestResult {
    let app = TestApp::new()?;

    let (status, body) = app.get("/", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("SkillForge Backend API is running!"));

    let (status, body) = app.get("/health/ping", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("pong"));

    let (status, body) = app.get("/health/ready", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.get("/openapi.json", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "SkillForge API");
    Ok(())
}

#[tokio::test]
async fn metrics_expose_http_counters() -> TestResult {
    let app = TestApp::new()?;
    app.get("/health/ping", None).await?;

    let (status, body) = app.get("/metrics", None).await?;
    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().ok_or("metrics body is not text")?;
    assert!(text.contains("skillforge_http_requests_total"));
    Ok(())
}

#[tokio::test]
async fn metrics_route_hidden_when_disabled() -> TestResult {
    let config = ApiConfig {
        metrics_enabled: false,
        ..ApiConfig::default()
    };
    let app = TestApp::with_config(
        ScriptedTaskGenerator::new(),
        Arc::new(test_verifier()),
        &config,
    )?;

    let (status, _) = app.get("/metrics", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/health/ping", None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn cors_preflight_allows_frontend_origin() -> TestResult {
    let app = TestApp::new()?;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/roadmap/all")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .body(Body::empty())
        .map_err(|e| e.to_string())?;
    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| format!("{:?}", e))?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
    Ok(())
}
