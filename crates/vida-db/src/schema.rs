//! Schema definitions and migration runner for SurrealDB.
//!
//! The identity table is SCHEMAFULL. Identifiers and timestamps are
//! stored as strings (timestamps as fixed-width RFC 3339, so string
//! order is time order). Enums are stored as strings with ASSERT
//! constraints for validation.

use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, Deserialize)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "identity_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: identities
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
DEFINE TABLE identity SCHEMAFULL;
DEFINE FIELD email ON TABLE identity TYPE string \
    ASSERT string::len($value) > 0;
DEFINE FIELD password_hash ON TABLE identity TYPE string \
    ASSERT string::len($value) > 0;
DEFINE FIELD role ON TABLE identity TYPE string \
    ASSERT $value IN ['patient', 'doctor', 'nurse', 'admin', \
    'receptionist'];
DEFINE FIELD status ON TABLE identity TYPE string \
    ASSERT $value IN ['active', 'inactive', 'pending', 'blocked'];
DEFINE FIELD profile ON TABLE identity FLEXIBLE TYPE object DEFAULT {};
DEFINE FIELD created_at ON TABLE identity TYPE string;
DEFINE FIELD updated_at ON TABLE identity TYPE string;
DEFINE INDEX idx_identity_email ON TABLE identity \
    COLUMNS email UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;
        }
    }

    Ok(())
}

/// The v1 schema DDL.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
