//! Per-request authentication and authorization.
//!
//! Transport-agnostic: the caller hands over the raw `Authorization`
//! header value. A request without a valid bearer token fails with an
//! authentication error before any access decision is made.

use std::sync::Arc;

use crate::access::{self, Requirement};
use crate::error::AuthError;
use crate::token::{AccessTokenClaims, TokenCodec};

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

#[derive(Debug, Clone)]
pub struct RequestGuard {
    codec: Arc<TokenCodec>,
}

impl RequestGuard {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// Decode the bearer token into verified claims.
    pub fn authenticate(&self, header: Option<&str>) -> Result<AccessTokenClaims, AuthError> {
        let token = bearer_token(header)?;
        self.codec.decode_access_token(token).inspect_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
        })
    }

    /// Authenticate, then check `requirement` against the caller's role.
    pub fn authorize(
        &self,
        header: Option<&str>,
        requirement: &Requirement<'_>,
    ) -> Result<AccessTokenClaims, AuthError> {
        let claims = self.authenticate(header)?;
        access::require(claims.role, requirement).inspect_err(|_| {
            tracing::info!(
                identity_id = %claims.sub,
                role = %claims.role,
                ?requirement,
                "access denied"
            );
        })?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use vida_core::models::identity::{Identity, IdentityId, IdentityStatus, Profile, Role};

    use super::*;
    use crate::access::{ADMIN_ONLY, permissions};
    use crate::config::AuthConfig;

    fn guard_and_codec() -> (RequestGuard, Arc<TokenCodec>) {
        let codec = Arc::new(
            TokenCodec::new(&AuthConfig::new("guard-test-secret-0123456789abcdef")).unwrap(),
        );
        (RequestGuard::new(codec.clone()), codec)
    }

    fn token_for(codec: &TokenCodec, role: Role) -> String {
        let now = Utc::now();
        codec
            .issue_access_token(&Identity {
                id: IdentityId::generate(),
                email: format!("{role}@test.com"),
                password_hash: String::new(),
                role,
                status: IdentityStatus::Active,
                profile: Profile::default(),
                created_at: now,
                updated_at: now,
            })
            .unwrap()
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert!(bearer_token(None).is_err());
        assert!(bearer_token(Some("")).is_err());
        assert!(bearer_token(Some("Bearer ")).is_err());
        assert!(bearer_token(Some("Basic dXNlcjpwYXNz")).is_err());
        assert!(bearer_token(Some("abc.def.ghi")).is_err());
    }

    #[test]
    fn missing_header_is_unauthenticated() {
        let (guard, _) = guard_and_codec();
        let err = guard
            .authorize(None, &Requirement::AnyRole(ADMIN_ONLY))
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));
    }

    #[test]
    fn invalid_token_is_unauthenticated_not_forbidden() {
        let (guard, _) = guard_and_codec();
        let err = guard
            .authorize(
                Some("Bearer not-a-token"),
                &Requirement::AnyRole(ADMIN_ONLY),
            )
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)), "got {err:?}");
    }

    #[test]
    fn patient_is_forbidden_from_admin_routes() {
        let (guard, codec) = guard_and_codec();
        let header = format!("Bearer {}", token_for(&codec, Role::Patient));

        let err = guard
            .authorize(Some(&header), &Requirement::AnyRole(ADMIN_ONLY))
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));

        let claims = guard
            .authorize(
                Some(&header),
                &Requirement::Permission(permissions::VIEW_OWN_RECORDS),
            )
            .unwrap();
        assert_eq!(claims.role, Role::Patient);
    }

    #[test]
    fn admin_passes_admin_routes() {
        let (guard, codec) = guard_and_codec();
        let header = format!("Bearer {}", token_for(&codec, Role::Admin));

        let claims = guard
            .authorize(Some(&header), &Requirement::AnyRole(ADMIN_ONLY))
            .unwrap();
        assert_eq!(claims.role, Role::Admin);
    }
}
