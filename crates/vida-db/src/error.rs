//! Database-specific error types and conversions.

use vida_core::error::VidaError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),

    #[error("Unique constraint violated: {entity}")]
    Duplicate { entity: String },
}

impl From<DbError> for VidaError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate { entity } => VidaError::AlreadyExists { entity },
            other => VidaError::Database(other.to_string()),
        }
    }
}

/// Whether a SurrealDB error reports a UNIQUE index collision.
pub(crate) fn is_unique_violation(err: &surrealdb::Error) -> bool {
    err.to_string().contains("already contains")
}
