//! Authentication Module
//!
//! Bearer-token verification for the SkillForge API. Tokens are HS256 JWTs
//! minted by the identity provider; the subject claim is the stable user id
//! and the optional `email` / `name` claims seed new profiles.
//!
//! Time claims are checked here with an injectable clock rather than by
//! `jsonwebtoken`, so tests can pin "now".

use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use skillforge_core::{AuthError, ConfigError, IdentityVerifier, VerifiedIdentity};
use std::collections::HashSet;
use std::sync::Arc;

const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

/// Minimum secret length accepted in production.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

// ============================================================================
// CLOCK ABSTRACTION
// ============================================================================

/// Clock abstraction for JWT time validation.
pub trait JwtClock: Send + Sync {
    /// Current time as Unix epoch seconds.
    fn now_epoch_secs(&self) -> i64;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl JwtClock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl JwtClock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}


// ============================================================================
// JWT SECRET (TYPE-SAFE)
// ============================================================================

/// JWT secret wrapped in `secrecy` so it never ends up in logs.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

impl JwtSecret {
    /// Create a new JWT secret. Empty secrets are rejected.
    pub fn new(secret: String) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "SKILLFORGE_JWT_SECRET".to_string(),
            });
        }
        Ok(Self(SecretString::new(secret.into())))
    }

    /// Expose the secret value (only for cryptographic operations).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == INSECURE_DEFAULT_SECRET
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.len())
    }
}

fn build_jwt_secret(secret_str: String) -> JwtSecret {
    let normalized = if secret_str.trim().is_empty() {
        INSECURE_DEFAULT_SECRET.to_string()
    } else {
        secret_str
    };

    match JwtSecret::new(normalized) {
        Ok(secret) => secret,
        Err(_) => JwtSecret(SecretString::new(INSECURE_DEFAULT_SECRET.to_string().into())),
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared secret for HS256 verification.
    pub jwt_secret: JwtSecret,

    /// JWT algorithm (default: HS256).
    pub jwt_algorithm: Algorithm,

    /// Lifetime of tokens minted by [`issue_jwt_token`] (default: 1 hour).
    pub jwt_expiration_secs: i64,

    /// Clock skew tolerance in seconds (default: 60).
    pub jwt_clock_skew_secs: i64,

    /// Required `iss` claim, if set.
    pub jwt_issuer: Option<String>,

    /// Required `aud` claim, if set.
    pub jwt_audience: Option<String>,

    /// Clock for JWT time validation (injected for testing).
    pub clock: Arc<dyn JwtClock>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("jwt_clock_skew_secs", &self.jwt_clock_skew_secs)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("clock", &"<JwtClock>")
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: build_jwt_secret(INSECURE_DEFAULT_SECRET.to_string()),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: 3600,
            jwt_clock_skew_secs: 60,
            jwt_issuer: None,
            jwt_audience: None,
            clock: Arc::new(SystemClock),
        }
    }
}

impl AuthConfig {
    /// Create authentication configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `SKILLFORGE_JWT_SECRET`: HS256 shared secret
    /// - `SKILLFORGE_JWT_ISSUER`: Required issuer (optional)
    /// - `SKILLFORGE_JWT_AUDIENCE`: Required audience (optional)
    /// - `SKILLFORGE_JWT_EXPIRATION_SECS`: Minted token lifetime (default: 3600)
    /// - `SKILLFORGE_JWT_CLOCK_SKEW_SECS`: Clock skew tolerance (default: 60)
    pub fn from_env() -> Self {
        let secret_str = std::env::var("SKILLFORGE_JWT_SECRET")
            .unwrap_or_else(|_| INSECURE_DEFAULT_SECRET.to_string());
        let non_blank = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            jwt_secret: build_jwt_secret(secret_str),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: std::env::var("SKILLFORGE_JWT_EXPIRATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600),
            jwt_clock_skew_secs: std::env::var("SKILLFORGE_JWT_CLOCK_SKEW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            jwt_issuer: non_blank("SKILLFORGE_JWT_ISSUER"),
            jwt_audience: non_blank("SKILLFORGE_JWT_AUDIENCE"),
            clock: Arc::new(SystemClock),
        }
    }

    /// Same configuration with a test secret and clock.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Result<Self, ConfigError> {
        self.jwt_secret = JwtSecret::new(secret.into())?;
        Ok(self)
    }

    pub fn with_clock(mut self, clock: Arc<dyn JwtClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Refuse insecure secrets in production, warn about them elsewhere.
    pub fn validate_for_environment(&self, environment: &str) -> ApiResult<()> {
        let is_production = crate::config::is_production_name(environment);

        if self.jwt_secret.is_insecure_default() {
            if is_production {
                return Err(ApiError::invalid_input(format!(
                    "Cannot start server in production with insecure JWT secret. \
                     Set SKILLFORGE_JWT_SECRET to a secure value. \
                     SKILLFORGE_ENVIRONMENT={}",
                    environment
                )));
            }
            tracing::warn!(
                "SECURITY WARNING: Using insecure default JWT secret. \
                 Set SKILLFORGE_JWT_SECRET before deploying."
            );
        }

        if self.jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN {
            if is_production {
                return Err(ApiError::invalid_input(format!(
                    "JWT secret is too short for production use ({} chars). \
                     It must be at least {} characters long.",
                    self.jwt_secret.len(),
                    MIN_PRODUCTION_SECRET_LEN
                )));
            } else if !self.jwt_secret.is_insecure_default() {
                tracing::warn!(
                    "SECURITY WARNING: JWT secret is short ({} chars). \
                     For production, use at least {} characters.",
                    self.jwt_secret.len(),
                    MIN_PRODUCTION_SECRET_LEN
                );
            }
        }

        Ok(())
    }
}

// ============================================================================
// JWT CLAIMS
// ============================================================================

/// JWT claims accepted by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (stable user id)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Claims {
    /// Claims for `identity`, valid from now for `expiration_secs`.
    pub fn for_identity(
        identity: &VerifiedIdentity,
        expiration_secs: i64,
        clock: &dyn JwtClock,
    ) -> Self {
        let now = clock.now_epoch_secs();
        Self {
            sub: identity.uid.to_string(),
            iat: now,
            exp: now.saturating_add(expiration_secs),
            nbf: None,
            iss: None,
            aud: None,
            email: identity.email.clone(),
            name: identity.name.clone(),
        }
    }

    pub fn is_expired(&self, clock: &dyn JwtClock) -> bool {
        self.exp < clock.now_epoch_secs()
    }

    fn into_identity(self) -> VerifiedIdentity {
        let blank_to_none = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        VerifiedIdentity {
            uid: self.sub.into(),
            email: blank_to_none(self.email),
            name: blank_to_none(self.name),
        }
    }
}

// ============================================================================
// TOKEN VALIDATION
// ============================================================================

/// Check `exp` and `nbf` against `now`, allowing `leeway_secs` either way.
fn validate_claim_times(
    now: i64,
    exp: i64,
    nbf: Option<i64>,
    leeway_secs: i64,
) -> Result<(), AuthError> {
    if let Some(nbf) = nbf {
        if now.saturating_add(leeway_secs) < nbf {
            return Err(AuthError::InvalidCredential {
                reason: "Token not yet valid (nbf)".to_string(),
            });
        }
    }

    if exp < now.saturating_sub(leeway_secs) {
        return Err(AuthError::Expired);
    }

    Ok(())
}

/// Validate a JWT and return its claims.
///
/// `jsonwebtoken` checks the signature and the issuer/audience; expiry and
/// not-before are checked against the configured clock.
pub fn validate_jwt_token(config: &AuthConfig, token: &str) -> Result<Claims, AuthError> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.expose().as_bytes());

    let mut validation = Validation::new(config.jwt_algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);
    if let Some(issuer) = &config.jwt_issuer {
        validation.set_issuer(&[issuer]);
    }
    match &config.jwt_audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        let reason = match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidToken => "Token is invalid".to_string(),
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                "Token signature is invalid".to_string()
            }
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => "Token issuer mismatch".to_string(),
            jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                "Token audience mismatch".to_string()
            }
            _ => format!("Token validation failed: {}", e),
        };
        AuthError::InvalidCredential { reason }
    })?;

    let claims = token_data.claims;
    let now = config.clock.now_epoch_secs();
    if now < 0 {
        tracing::error!(timestamp = now, "System clock returned pre-epoch time");
        return Err(AuthError::InvalidCredential {
            reason: "Server time configuration error".to_string(),
        });
    }

    validate_claim_times(now, claims.exp, claims.nbf, config.jwt_clock_skew_secs)?;

    if claims.sub.trim().is_empty() {
        return Err(AuthError::InvalidCredential {
            reason: "Token has no subject".to_string(),
        });
    }

    Ok(claims)
}

/// Mint a token for `identity`. Used by tooling and tests.
pub fn issue_jwt_token(config: &AuthConfig, identity: &VerifiedIdentity) -> ApiResult<String> {
    let mut claims = Claims::for_identity(identity, config.jwt_expiration_secs, &*config.clock);
    claims.iss = config.jwt_issuer.clone();
    claims.aud = config.jwt_audience.clone();

    let encoding_key = EncodingKey::from_secret(config.jwt_secret.expose().as_bytes());
    let header = Header::new(config.jwt_algorithm);

    encode(&header, &claims, &encoding_key)
        .map_err(|e| ApiError::internal_error(format!("Failed to generate token: {}", e)))
}

// ============================================================================
// IDENTITY VERIFIER
// ============================================================================

/// [`IdentityVerifier`] backed by locally verified JWTs.
#[derive(Debug, Clone)]
pub struct JwtIdentityVerifier {
    config: Arc<AuthConfig>,
}

impl JwtIdentityVerifier {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        validate_jwt_token(&self.config, token).map(Claims::into_identity)
    }
}

// ============================================================================
// TESTS
// ============================================================================
