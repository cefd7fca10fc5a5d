//! Property-Based Tests for Authentication Enforcement
//!
//! For any request under /api, IF the request lacks a valid bearer token THEN
//! the API SHALL return 401 Unauthorized; a valid token for a registered user
//! SHALL reach the handler.

mod support;

use std::sync::Arc;

use axum::http::StatusCode;
use proptest::prelude::*;
use skillforge_api::{issue_jwt_token, AuthConfig, JwtIdentityVerifier};
use skillforge_test_utils::{fixtures, ScriptedTaskGenerator};
use support::TestApp;

// ============================================================================
// TEST CONFIGURATION
// ============================================================================

const TEST_SECRET: &str = "property-test-secret-with-enough-length";

fn test_auth_config() -> AuthConfig {
    AuthConfig::default()
        .with_secret(TEST_SECRET)
        .expect("test secret is valid")
}

fn test_app() -> TestApp {
    TestApp::build(
        ScriptedTaskGenerator::new(),
        Arc::new(JwtIdentityVerifier::new(test_auth_config())),
    )
    .expect("router builds")
}

// ============================================================================
// PROPERTY TEST STRATEGIES
// ============================================================================

/// Authorization header variants.
#[derive(Debug, Clone)]
enum AuthHeader {
    /// Token signed with the server secret for this uid
    ValidJwt(String),
    /// Token signed with the server secret but already expired
    ExpiredJwt(String),
    /// Token signed with a different secret
    ForeignJwt(String),
    /// Three dot-separated random segments
    GarbageJwt(String),
    /// Authorization header without the Bearer scheme
    MalformedAuth(String),
    /// `Bearer` with nothing after it
    EmptyBearer,
    /// No Authorization header
    None,
}

fn auth_header_strategy() -> impl Strategy<Value = AuthHeader> {
    prop_oneof![
        "[a-z0-9]{5,20}".prop_map(AuthHeader::ValidJwt),
        "[a-z0-9]{5,20}".prop_map(AuthHeader::ExpiredJwt),
        "[a-z0-9]{5,20}".prop_map(AuthHeader::ForeignJwt),
        "[A-Za-z0-9_-]{20,60}\\.[A-Za-z0-9_-]{20,60}\\.[A-Za-z0-9_-]{20,60}"
            .prop_map(AuthHeader::GarbageJwt),
        "(Basic|Token|Digest) [A-Za-z0-9_-]{20,50}".prop_map(AuthHeader::MalformedAuth),
        Just(AuthHeader::EmptyBearer),
        Just(AuthHeader::None),
    ]
}

/// Build the Authorization header value for a variant.
fn header_value(auth: &AuthHeader) -> Option<String> {
    let config = test_auth_config();
    match auth {
        AuthHeader::ValidJwt(uid) => {
            let token = issue_jwt_token(&config, &fixtures::identity(uid)).expect("token issues");
            Some(format!("Bearer {}", token))
        }
        AuthHeader::ExpiredJwt(uid) => {
            let mut expired = config;
            expired.jwt_expiration_secs = -7200;
            let token = issue_jwt_token(&expired, &fixtures::identity(uid)).expect("token issues");
            Some(format!("Bearer {}", token))
        }
        AuthHeader::ForeignJwt(uid) => {
            let foreign = AuthConfig::default()
                .with_secret("some-other-secret-that-is-long-enough")
                .expect("secret is valid");
            let token = issue_jwt_token(&foreign, &fixtures::identity(uid)).expect("token issues");
            Some(format!("Bearer {}", token))
        }
        AuthHeader::GarbageJwt(token) => Some(format!("Bearer {}", token)),
        AuthHeader::MalformedAuth(value) => Some(value.clone()),
        AuthHeader::EmptyBearer => Some("Bearer ".to_string()),
        AuthHeader::None => None,
    }
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Only a valid, unexpired token signed with the server secret reaches
    /// the roadmap list; everything else is 401 with an error body.
    #[test]
    fn prop_authentication_enforcement(auth in auth_header_strategy()) {
        let rt = tokio::runtime::Runtime::new().expect("runtime");
        rt.block_on(async {
            let app = test_app();
            if let AuthHeader::ValidJwt(uid) = &auth {
                app.seed_user(&fixtures::user_profile(uid)).await.expect("seed user");
            }

            let mut builder = axum::http::Request::builder().uri("/api/roadmap/all");
            if let Some(value) = header_value(&auth) {
                builder = builder.header(axum::http::header::AUTHORIZATION, value);
            }
            let request = builder.body(axum::body::Body::empty()).expect("request builds");

            use tower::ServiceExt;
            let response = app.router.clone().oneshot(request).await.expect("router responds");
            let status = response.status();

            match &auth {
                AuthHeader::ValidJwt(_) => {
                    prop_assert_eq!(status, StatusCode::OK, "Expected 200 for {:?}", auth);
                }
                _ => {
                    prop_assert_eq!(
                        status,
                        StatusCode::UNAUTHORIZED,
                        "Expected 401 for {:?}",
                        auth
                    );
                    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                        .await
                        .expect("body reads");
                    let body: serde_json::Value =
                        serde_json::from_slice(&bytes).expect("error body is JSON");
                    prop_assert!(body["code"].is_string());
                }
            }
            Ok(())
        })?;
    }

    /// An expired token is reported distinctly so clients can re-authenticate.
    #[test]
    fn prop_expired_token_reports_expiry(uid in "[a-z0-9]{5,20}") {
        let rt = tokio::runtime::Runtime::new().expect("runtime");
        rt.block_on(async {
            let app = test_app();
            app.seed_user(&fixtures::user_profile(&uid)).await.expect("seed user");
            let value = header_value(&AuthHeader::ExpiredJwt(uid.clone())).expect("header");
            let token = value.trim_start_matches("Bearer ");

            let (status, body) = app
                .get("/api/user/profile", Some(token))
                .await
                .expect("request succeeds");
            prop_assert_eq!(status, StatusCode::UNAUTHORIZED);
            prop_assert_eq!(body["code"].as_str(), Some("TOKEN_EXPIRED"));
            Ok(())
        })?;
    }
}
