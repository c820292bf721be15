//! Error types for the Vida+ system.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VidaError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VidaResult<T> = Result<T, VidaError>;

/// Stable, machine-readable classification of a [`VidaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }

    /// HTTP status code a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }

    /// Canonical reason phrase for [`Self::status_code`].
    pub fn title(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Internal => "Internal Server Error",
        }
    }

    /// Problem-type URI pointing at the status code documentation.
    pub fn type_uri(&self) -> String {
        format!(
            "https://developer.mozilla.org/en-US/docs/Web/HTTP/Status/{}",
            self.status_code()
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const INTERNAL_MESSAGE: &str = "internal server error";

impl VidaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VidaError::NotFound { .. } => ErrorKind::NotFound,
            VidaError::AlreadyExists { .. } => ErrorKind::Conflict,
            VidaError::AuthenticationFailed { .. } => ErrorKind::Unauthorized,
            VidaError::AuthorizationDenied { .. } => ErrorKind::Forbidden,
            VidaError::Validation { .. } => ErrorKind::BadRequest,
            VidaError::Database(_) | VidaError::Crypto(_) | VidaError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Message that is safe to show to an external caller.
    ///
    /// Internal failures collapse to a fixed string so that store and
    /// crypto library errors never reach the client.
    pub fn public_message(&self) -> String {
        match self {
            VidaError::NotFound { entity, .. } => format!("{entity} not found"),
            VidaError::AlreadyExists { entity } => format!("{entity} already exists"),
            VidaError::AuthenticationFailed { reason } => reason.clone(),
            VidaError::AuthorizationDenied { reason } => reason.clone(),
            VidaError::Validation { message } => message.clone(),
            VidaError::Database(_) | VidaError::Crypto(_) | VidaError::Internal(_) => {
                INTERNAL_MESSAGE.to_string()
            }
        }
    }
}

/// Outward error representation handed to the transport layer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub type_uri: String,
    pub kind: ErrorKind,
    pub title: String,
    pub status: u16,
    pub message: String,
}

impl From<&VidaError> for ErrorBody {
    fn from(err: &VidaError) -> Self {
        let kind = err.kind();
        Self {
            type_uri: kind.type_uri(),
            kind,
            title: kind.title().to_string(),
            status: kind.status_code(),
            message: err.public_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_status_codes() {
        let cases = [
            (
                VidaError::Validation {
                    message: "bad".into(),
                },
                400,
            ),
            (
                VidaError::AuthenticationFailed {
                    reason: "invalid credentials".into(),
                },
                401,
            ),
            (
                VidaError::AuthorizationDenied {
                    reason: "insufficient permissions".into(),
                },
                403,
            ),
            (
                VidaError::AlreadyExists {
                    entity: "user".into(),
                },
                409,
            ),
            (VidaError::Database("connection reset".into()), 500),
        ];

        for (err, status) in cases {
            assert_eq!(err.kind().status_code(), status, "for {err:?}");
        }
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = VidaError::Database("socket closed at 10.0.0.7:8000".into());
        assert_eq!(err.public_message(), "internal server error");

        let err = VidaError::Crypto("argon2: invalid params".into());
        assert_eq!(err.public_message(), "internal server error");
    }

    #[test]
    fn conflict_message_names_entity() {
        let err = VidaError::AlreadyExists {
            entity: "user".into(),
        };
        assert_eq!(err.public_message(), "user already exists");
    }

    #[test]
    fn error_body_serialization() {
        let err = VidaError::AuthenticationFailed {
            reason: "invalid credentials".into(),
        };
        let body = ErrorBody::from(&err);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["kind"], "unauthorized");
        assert_eq!(json["status"], 401);
        assert_eq!(json["title"], "Unauthorized");
        assert_eq!(json["message"], "invalid credentials");
        assert_eq!(
            json["type"],
            "https://developer.mozilla.org/en-US/docs/Web/HTTP/Status/401"
        );
    }
}
