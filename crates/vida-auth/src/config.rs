//! Authentication configuration.

use serde::Deserialize;

use crate::error::AuthError;

const RECOMMENDED_SECRET_LEN: usize = 32;

/// Upper bound for either token lifetime: ten years.
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Configuration for the authentication engine.
///
/// There is deliberately no usable default secret: `jwt_secret` must be
/// supplied by the deployment and [`AuthConfig::validate`] rejects an
/// empty one.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for signing access tokens.
    pub jwt_secret: String,
    /// HMAC secret for refresh tokens. Falls back to `jwt_secret`.
    pub refresh_secret: Option<String>,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Access token lifetime in seconds (default: 86_400 = 24 hours).
    pub access_token_lifetime_secs: u64,
    /// Refresh token lifetime in seconds (default: 604_800 = 7 days).
    pub refresh_token_lifetime_secs: u64,
    /// Clock skew tolerance applied to `exp` checks. Zero by default.
    pub leeway_secs: u64,
    pub min_password_length: usize,
    pub max_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            refresh_secret: None,
            jwt_issuer: "vida-plus".into(),
            access_token_lifetime_secs: 86_400,
            refresh_token_lifetime_secs: 604_800,
            leeway_secs: 0,
            min_password_length: 8,
            max_password_length: 128,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field(
                "refresh_secret",
                &self.refresh_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("jwt_issuer", &self.jwt_issuer)
            .field("access_token_lifetime_secs", &self.access_token_lifetime_secs)
            .field(
                "refresh_token_lifetime_secs",
                &self.refresh_token_lifetime_secs,
            )
            .field("leeway_secs", &self.leeway_secs)
            .field("min_password_length", &self.min_password_length)
            .field("max_password_length", &self.max_password_length)
            .finish()
    }
}

impl AuthConfig {
    /// Creates a configuration with the given signing secret and default
    /// lifetimes.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            ..Default::default()
        }
    }

    /// Use a distinct secret for refresh tokens.
    pub fn with_refresh_secret(mut self, secret: impl Into<String>) -> Self {
        self.refresh_secret = Some(secret.into());
        self
    }

    pub fn refresh_secret(&self) -> &str {
        self.refresh_secret.as_deref().unwrap_or(&self.jwt_secret)
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.is_empty() {
            return Err(AuthError::Config("JWT secret is not configured".into()));
        }
        if self.refresh_secret.as_deref().is_some_and(str::is_empty) {
            return Err(AuthError::Config("refresh secret is empty".into()));
        }
        if self.access_token_lifetime_secs == 0 || self.refresh_token_lifetime_secs == 0 {
            return Err(AuthError::Config("token lifetimes must be positive".into()));
        }
        if self.access_token_lifetime_secs > MAX_TOKEN_LIFETIME_SECS
            || self.refresh_token_lifetime_secs > MAX_TOKEN_LIFETIME_SECS
        {
            return Err(AuthError::Config(format!(
                "token lifetimes must not exceed {MAX_TOKEN_LIFETIME_SECS} seconds"
            )));
        }
        if self.leeway_secs > self.access_token_lifetime_secs {
            return Err(AuthError::Config(
                "leeway_secs exceeds the access token lifetime".into(),
            ));
        }
        if self.min_password_length > self.max_password_length {
            return Err(AuthError::Config(
                "min_password_length exceeds max_password_length".into(),
            ));
        }
        if self.jwt_secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!("JWT secret is shorter than recommended (32 bytes)");
        }
        Ok(())
    }
}
