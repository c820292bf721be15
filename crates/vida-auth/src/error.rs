//! Authentication error types.

use thiserror::Error;
use vida_core::error::VidaError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is not active")]
    AccountInactive,

    #[error("authentication required")]
    MissingToken,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("invalid refresh token")]
    InvalidRefreshToken,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for VidaError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountInactive
            | AuthError::MissingToken
            | AuthError::InvalidRefreshToken => VidaError::AuthenticationFailed {
                reason: err.to_string(),
            },
            // Decoder details stay in the logs.
            AuthError::TokenExpired | AuthError::TokenInvalid(_) => {
                VidaError::AuthenticationFailed {
                    reason: "invalid token".into(),
                }
            }
            AuthError::Forbidden(reason) => VidaError::AuthorizationDenied { reason },
            AuthError::Validation(message) => VidaError::Validation { message },
            AuthError::Config(msg) => VidaError::Internal(msg),
            AuthError::Crypto(msg) => VidaError::Crypto(msg),
        }
    }
}
