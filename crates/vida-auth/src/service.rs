//! Authentication service: registration, login and refresh-token
//! orchestration.
//!
//! Stateless between calls: everything persistent lives behind the
//! [`IdentityStore`]. Store failures are surfaced immediately, with no
//! retries and no timeouts of our own; dropping the returned future
//! cancels the in-flight store call.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use vida_core::error::{VidaError, VidaResult};
use vida_core::models::identity::{Identity, IdentityId, IdentityStatus, Profile, Role};
use vida_core::repository::IdentityStore;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::TokenCodec;

/// Input for the registration flow.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub profile: Profile,
}

/// Input for the login flow.
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Signed JWT refresh token, only accepted by [`AuthService::refresh`].
    pub refresh_token: String,
    /// Always `"Bearer"`.
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Successful refresh result.
#[derive(Debug)]
pub struct RefreshOutput {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

const TOKEN_TYPE: &str = "Bearer";

/// Authentication service.
///
/// Generic over the store implementation so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<S: IdentityStore> {
    store: S,
    codec: Arc<TokenCodec>,
    config: AuthConfig,
}

impl<S: IdentityStore> AuthService<S> {
    pub fn new(store: S, config: AuthConfig) -> Result<Self, AuthError> {
        let codec = Arc::new(TokenCodec::new(&config)?);
        Ok(Self {
            store,
            codec,
            config,
        })
    }

    /// The codec this service signs with, for building a
    /// [`RequestGuard`](crate::guard::RequestGuard).
    pub fn codec(&self) -> Arc<TokenCodec> {
        self.codec.clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a new identity.
    ///
    /// The email lookup is only a fast path; the store's own uniqueness
    /// constraint decides concurrent registrations.
    pub async fn register(&self, input: RegisterInput) -> VidaResult<Identity> {
        self.validate_registration(&input)?;

        // 1. Duplicate check.
        if self.store.find_by_email(&input.email).await?.is_some() {
            debug!(email = %input.email, "registration for existing email");
            return Err(already_exists());
        }

        // 2. Hash off the async executor.
        let password_hash = password::hash_password_blocking(input.password).await?;

        // 3. Persist.
        let now = Utc::now();
        let identity = Identity {
            id: IdentityId::generate(),
            email: input.email,
            password_hash,
            role: input.role,
            status: IdentityStatus::Active,
            profile: input.profile,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.create(identity).await?;

        info!(
            identity_id = %created.id,
            role = %created.role,
            "identity registered"
        );
        Ok(created)
    }

    /// Verify credentials and issue a token pair.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, input: LoginInput) -> VidaResult<LoginOutput> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("email and password are required".into()).into());
        }

        // 1. Look up identity.
        let Some(identity) = self.store.find_by_email(&input.email).await? else {
            debug!(email = %input.email, "login attempt for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        };

        // 2. Verify password.
        let valid =
            password::verify_password_blocking(input.password, identity.password_hash.clone())
                .await?;
        if !valid {
            debug!(identity_id = %identity.id, "login attempt with invalid password");
            return Err(AuthError::InvalidCredentials.into());
        }

        // 3. Check account status.
        ensure_active(&identity)?;

        // 4. Issue tokens.
        let access_token = self.codec.issue_access_token(&identity)?;
        let refresh_token = self.codec.issue_refresh_token(&identity)?;

        info!(identity_id = %identity.id, role = %identity.role, "identity logged in");
        Ok(LoginOutput {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE,
            expires_in: self.codec.access_lifetime_secs(),
        })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// A refresh token whose subject no longer resolves is treated as an
    /// invalid refresh token.
    pub async fn refresh(&self, raw_refresh_token: &str) -> VidaResult<RefreshOutput> {
        // 1. Verify the refresh token.
        let claims = self
            .codec
            .decode_refresh_token(raw_refresh_token)
            .map_err(|e| {
                debug!(error = %e, "refresh token rejected");
                AuthError::InvalidRefreshToken
            })?;

        // 2. Resolve the identity it was issued for.
        let Some(identity) = self.store.find_by_id(&claims.identity_id()).await? else {
            warn!(identity_id = %claims.sub, "refresh token for unknown identity");
            return Err(AuthError::InvalidRefreshToken.into());
        };

        ensure_active(&identity)?;

        // 3. Issue a new access token.
        let access_token = self.codec.issue_access_token(&identity)?;

        info!(identity_id = %identity.id, "access token refreshed");
        Ok(RefreshOutput {
            access_token,
            token_type: TOKEN_TYPE,
            expires_in: self.codec.access_lifetime_secs(),
        })
    }

    fn validate_registration(&self, input: &RegisterInput) -> Result<(), AuthError> {
        if !is_valid_email(&input.email) {
            return Err(AuthError::Validation("invalid email address".into()));
        }

        let length = input.password.chars().count();
        if length < self.config.min_password_length {
            return Err(AuthError::Validation(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }
        if length > self.config.max_password_length {
            return Err(AuthError::Validation(format!(
                "password must be at most {} characters",
                self.config.max_password_length
            )));
        }
        Ok(())
    }
}

fn already_exists() -> VidaError {
    VidaError::AlreadyExists {
        entity: "user".into(),
    }
}

fn ensure_active(identity: &Identity) -> Result<(), AuthError> {
    if identity.is_active() {
        Ok(())
    } else {
        info!(
            identity_id = %identity.id,
            status = identity.status.as_str(),
            "authentication refused for non-active identity"
        );
        Err(AuthError::AccountInactive)
    }
}

/// Minimal structural check: `local@domain.tld`, no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !domain.ends_with('.')
}
