//! JWT access and refresh token issuance/verification.
//!
//! Both token kinds are HMAC-SHA256 signed. The algorithm is pinned on
//! decode: the `alg` header is only compared against [`ALGORITHM`], it
//! never selects the key. Every token carries a `kind` claim that the
//! decoder checks, so an access token cannot stand in for a refresh
//! token or the other way round, even when both share one secret.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vida_core::models::identity::{Identity, IdentityId, Role};

use crate::config::AuthConfig;
use crate::error::AuthError;

pub const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject, the identity ID.
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub kind: TokenKind,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID.
    pub jti: String,
}

/// JWT claims embedded in every refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub kind: TokenKind,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl AccessTokenClaims {
    pub fn identity_id(&self) -> IdentityId {
        IdentityId::from(self.sub.as_str())
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        timestamp(self.exp)
    }
}

impl RefreshTokenClaims {
    pub fn identity_id(&self) -> IdentityId {
        IdentityId::from(self.sub.as_str())
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        timestamp(self.exp)
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Claims that carry a token kind.
trait KindedClaims: DeserializeOwned {
    fn kind(&self) -> TokenKind;
    fn subject(&self) -> &str;
}

impl KindedClaims for AccessTokenClaims {
    fn kind(&self) -> TokenKind {
        self.kind
    }

    fn subject(&self) -> &str {
        &self.sub
    }
}

impl KindedClaims for RefreshTokenClaims {
    fn kind(&self) -> TokenKind {
        self.kind
    }

    fn subject(&self) -> &str {
        &self.sub
    }
}

/// Issues and verifies tokens with keys fixed at construction.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Clone)]
pub struct TokenCodec {
    issuer: String,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("access_lifetime", &self.access_lifetime)
            .field("refresh_lifetime", &self.refresh_lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        config.validate()?;

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);
        validation.validate_aud = false;
        validation.leeway = config.leeway_secs;

        Ok(Self {
            issuer: config.jwt_issuer.clone(),
            access_lifetime: lifetime(config.access_token_lifetime_secs)?,
            refresh_lifetime: lifetime(config.refresh_token_lifetime_secs)?,
            access_encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret().as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret().as_bytes()),
            validation,
        })
    }

    /// Access token lifetime in seconds.
    pub fn access_lifetime_secs(&self) -> u64 {
        self.access_lifetime.num_seconds().max(0) as u64
    }

    /// Issue a signed access token for `identity`.
    pub fn issue_access_token(&self, identity: &Identity) -> Result<String, AuthError> {
        self.issue_access_token_at(identity, Utc::now())
    }

    pub(crate) fn issue_access_token_at(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = AccessTokenClaims {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            role: identity.role,
            kind: TokenKind::Access,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.access_lifetime).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&claims, &self.access_encoding)
    }

    /// Issue a signed refresh token for `identity`.
    pub fn issue_refresh_token(&self, identity: &Identity) -> Result<String, AuthError> {
        self.issue_refresh_token_at(identity, Utc::now())
    }

    pub(crate) fn issue_refresh_token_at(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = RefreshTokenClaims {
            sub: identity.id.to_string(),
            kind: TokenKind::Refresh,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.refresh_lifetime).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&claims, &self.refresh_encoding)
    }

    /// Verify signature, algorithm, issuer and expiry of an access token.
    pub fn decode_access_token(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        let claims: AccessTokenClaims =
            self.decode(token, &self.access_decoding, TokenKind::Access)?;
        if claims.email.is_empty() {
            return Err(AuthError::TokenInvalid("missing email claim".into()));
        }
        Ok(claims)
    }

    /// Verify signature, algorithm, issuer and expiry of a refresh token.
    pub fn decode_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims, AuthError> {
        self.decode(token, &self.refresh_decoding, TokenKind::Refresh)
    }

    fn decode<T: KindedClaims>(
        &self,
        token: &str,
        key: &DecodingKey,
        expected: TokenKind,
    ) -> Result<T, AuthError> {
        let claims = jsonwebtoken::decode::<T>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid(e.to_string()),
            })?;

        if claims.kind() != expected {
            return Err(AuthError::TokenInvalid("unexpected token kind".into()));
        }
        if claims.subject().is_empty() {
            return Err(AuthError::TokenInvalid("missing subject claim".into()));
        }
        Ok(claims)
    }
}

fn lifetime(secs: u64) -> Result<Duration, AuthError> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| AuthError::Config(format!("token lifetime out of range: {secs}s")))
}

fn encode<T: Serialize>(claims: &T, key: &EncodingKey) -> Result<String, AuthError> {
    jsonwebtoken::encode(&Header::new(ALGORITHM), claims, key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vida_core::models::identity::{IdentityStatus, Profile};

    const SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_issuer: "vida-test".into(),
            ..AuthConfig::new(SECRET)
        }
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(&test_config()).unwrap()
    }

    fn identity() -> Identity {
        let now = Utc::now();
        Identity {
            id: IdentityId::generate(),
            email: "nurse@test.com".into(),
            password_hash: "irrelevant".into(),
            role: Role::Nurse,
            status: IdentityStatus::Active,
            profile: Profile::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn access_token_roundtrip() {
        let codec = codec();
        let identity = identity();

        let token = codec.issue_access_token(&identity).unwrap();
        let claims = codec.decode_access_token(&token).unwrap();

        assert_eq!(claims.identity_id(), identity.id);
        assert_eq!(claims.email, "nurse@test.com");
        assert_eq!(claims.role, Role::Nurse);
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.iss, "vida-test");
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn refresh_token_roundtrip() {
        let codec = codec();
        let identity = identity();

        let token = codec.issue_refresh_token(&identity).unwrap();
        let claims = codec.decode_refresh_token(&token).unwrap();

        assert_eq!(claims.identity_id(), identity.id);
        assert_eq!(claims.kind, TokenKind::Refresh);
        assert_eq!(claims.exp - claims.iat, 604_800);
    }

    #[test]
    fn jti_is_unique() {
        let codec = codec();
        let identity = identity();

        let c1 = codec
            .decode_access_token(&codec.issue_access_token(&identity).unwrap())
            .unwrap();
        let c2 = codec
            .decode_access_token(&codec.issue_access_token(&identity).unwrap())
            .unwrap();
        assert_ne!(c1.jti, c2.jti);
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let codec = codec();
        let issued = Utc::now() - Duration::days(2);
        let token = codec.issue_access_token_at(&identity(), issued).unwrap();

        let err = codec.decode_access_token(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired), "got {err:?}");
    }

    #[test]
    fn token_expired_seconds_ago_is_rejected() {
        let codec = codec();
        let issued = Utc::now() - Duration::seconds(86_400 + 5);
        let token = codec.issue_access_token_at(&identity(), issued).unwrap();

        let err = codec.decode_access_token(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired), "got {err:?}");

        let issued = Utc::now() - Duration::seconds(604_800 + 5);
        let token = codec.issue_refresh_token_at(&identity(), issued).unwrap();
        let err = codec.decode_refresh_token(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired), "got {err:?}");
    }

    #[test]
    fn configured_leeway_tolerates_recent_expiry() {
        let codec = TokenCodec::new(&AuthConfig {
            leeway_secs: 60,
            ..test_config()
        })
        .unwrap();
        let issued = Utc::now() - Duration::seconds(86_400 + 5);
        let token = codec.issue_access_token_at(&identity(), issued).unwrap();

        assert!(codec.decode_access_token(&token).is_ok());
    }

    #[test]
    fn out_of_range_lifetime_is_a_config_error() {
        let err = TokenCodec::new(&AuthConfig {
            access_token_lifetime_secs: 10_000_000_000_000_000,
            ..test_config()
        })
        .unwrap_err();
        assert!(matches!(err, AuthError::Config(_)), "got {err:?}");

        assert!(lifetime(u64::MAX).is_err());
        assert_eq!(lifetime(900).unwrap(), Duration::seconds(900));
    }

    #[test]
    fn expired_refresh_token_is_rejected() {
        let codec = codec();
        let issued = Utc::now() - Duration::days(8);
        let token = codec.issue_refresh_token_at(&identity(), issued).unwrap();

        let err = codec.decode_refresh_token(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired), "got {err:?}");
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let other = TokenCodec::new(&AuthConfig {
            jwt_issuer: "vida-test".into(),
            ..AuthConfig::new("a-completely-different-secret-of-32-bytes")
        })
        .unwrap();
        let token = other.issue_access_token(&identity()).unwrap();

        let err = codec().decode_access_token(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)), "got {err:?}");
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let other = TokenCodec::new(&AuthConfig::new(SECRET)).unwrap();
        let token = other.issue_access_token(&identity()).unwrap();

        assert!(codec().decode_access_token(&token).is_err());
    }

    #[test]
    fn access_and_refresh_tokens_are_not_interchangeable() {
        let codec = codec();
        let identity = identity();

        let access = codec.issue_access_token(&identity).unwrap();
        let refresh = codec.issue_refresh_token(&identity).unwrap();

        assert!(codec.decode_refresh_token(&access).is_err());
        assert!(codec.decode_access_token(&refresh).is_err());
    }

    #[test]
    fn distinct_refresh_secret_is_enforced() {
        let config = test_config().with_refresh_secret("refresh-only-secret-of-at-least-32-bytes");
        let codec = TokenCodec::new(&config).unwrap();
        let identity = identity();

        let refresh = codec.issue_refresh_token(&identity).unwrap();
        assert!(codec.decode_refresh_token(&refresh).is_ok());

        // Same secret, forged kind: signed with the access key.
        let forged = encode(
            &RefreshTokenClaims {
                sub: identity.id.to_string(),
                kind: TokenKind::Refresh,
                iss: "vida-test".into(),
                iat: Utc::now().timestamp(),
                exp: (Utc::now() + Duration::hours(1)).timestamp(),
                jti: Uuid::new_v4().to_string(),
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(codec.decode_refresh_token(&forged).is_err());
    }

    #[test]
    fn unexpected_algorithm_is_rejected() {
        let identity = identity();
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            role: Role::Admin,
            kind: TokenKind::Access,
            iss: "vida-test".into(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(codec().decode_access_token(&token).is_err());
    }

    #[test]
    fn unsigned_token_is_rejected() {
        let codec = codec();
        let token = codec.issue_access_token(&identity()).unwrap();
        let payload = token.split('.').nth(1).unwrap();

        // {"alg":"none","typ":"JWT"}
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{payload}.");
        assert!(codec.decode_access_token(&unsigned).is_err());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec();
        let token = codec.issue_access_token(&identity()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let admin = codec
            .issue_access_token(&Identity {
                role: Role::Admin,
                ..identity()
            })
            .unwrap();
        let admin_payload = admin.split('.').nth(1).unwrap();
        parts[1] = admin_payload;

        assert!(codec.decode_access_token(&parts.join(".")).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let codec = codec();
        assert!(codec.decode_access_token("").is_err());
        assert!(codec.decode_access_token("not.a.jwt").is_err());
        assert!(codec.decode_refresh_token("abc").is_err());
    }
}
