//! Startup failures of the server process.

use vida_auth::AuthError;
use vida_db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid auth configuration: {0}")]
    Auth(#[from] AuthError),

    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("identity store is unhealthy: {0}")]
    Unhealthy(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
