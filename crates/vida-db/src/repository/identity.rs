//! SurrealDB implementation of [`IdentityStore`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use tracing::debug;
use vida_core::error::VidaResult;
use vida_core::models::identity::{Identity, IdentityId, IdentityStatus, Profile, Role};
use vida_core::repository::IdentityStore;

use crate::error::{DbError, is_unique_violation};

const SELECT_COLUMNS: &str = "meta::id(id) AS record_id, email, password_hash, \
     role, status, profile, created_at, updated_at";

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct IdentityRow {
    record_id: String,
    email: String,
    password_hash: String,
    role: String,
    status: String,
    #[serde(default)]
    profile: Profile,
    created_at: String,
    updated_at: String,
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DbError::InvalidRecord(format!("invalid timestamp {s:?}: {e}")))
}

fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl IdentityRow {
    fn try_into_identity(self) -> Result<Identity, DbError> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| DbError::InvalidRecord(format!("unknown role: {}", self.role)))?;
        let status = IdentityStatus::parse(&self.status)
            .ok_or_else(|| DbError::InvalidRecord(format!("unknown status: {}", self.status)))?;
        Ok(Identity {
            id: IdentityId::from(self.record_id),
            email: self.email,
            password_hash: self.password_hash,
            role,
            status,
            profile: self.profile,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// SurrealDB implementation of the identity store.
///
/// Email uniqueness is enforced by the `idx_identity_email` UNIQUE index,
/// so concurrent registrations with the same email cannot both succeed.
#[derive(Clone)]
pub struct SurrealIdentityStore<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealIdentityStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn select_one(&self, query: String, key: &str, value: String) -> VidaResult<Option<Identity>> {
        let mut result = self
            .db
            .query(query)
            .bind((key.to_string(), value))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IdentityRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_identity()?)),
            None => Ok(None),
        }
    }
}

impl<C: Connection> IdentityStore for SurrealIdentityStore<C> {
    async fn find_by_email(&self, email: &str) -> VidaResult<Option<Identity>> {
        self.select_one(
            format!("SELECT {SELECT_COLUMNS} FROM identity WHERE email = $email LIMIT 1"),
            "email",
            email.to_string(),
        )
        .await
    }

    async fn find_by_id(&self, id: &IdentityId) -> VidaResult<Option<Identity>> {
        self.select_one(
            format!("SELECT {SELECT_COLUMNS} FROM type::thing('identity', $id)"),
            "id",
            id.to_string(),
        )
        .await
    }

    async fn create(&self, identity: Identity) -> VidaResult<Identity> {
        let result = self
            .db
            .query(
                "CREATE type::thing('identity', $id) SET \
                 email = $email, \
                 password_hash = $password_hash, \
                 role = $role, \
                 status = $status, \
                 profile = $profile, \
                 created_at = $created_at, \
                 updated_at = $updated_at \
                 RETURN NONE",
            )
            .bind(("id", identity.id.to_string()))
            .bind(("email", identity.email.clone()))
            .bind(("password_hash", identity.password_hash.clone()))
            .bind(("role", identity.role.as_str()))
            .bind(("status", identity.status.as_str()))
            .bind(("profile", identity.profile.clone()))
            .bind(("created_at", format_timestamp(&identity.created_at)))
            .bind(("updated_at", format_timestamp(&identity.updated_at)))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(|e| {
            if is_unique_violation(&e) {
                debug!("identity insert rejected by unique email index");
                DbError::Duplicate {
                    entity: "user".into(),
                }
            } else {
                DbError::from(e)
            }
        })?;

        Ok(identity)
    }

    async fn list(&self) -> VidaResult<Vec<Identity>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_COLUMNS} FROM identity ORDER BY created_at ASC"
            ))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IdentityRow> = result.take(0).map_err(DbError::from)?;

        let identities = rows
            .into_iter()
            .map(IdentityRow::try_into_identity)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(identities)
    }

    async fn ping(&self) -> VidaResult<()> {
        self.db.health().await.map_err(DbError::from)?;
        Ok(())
    }
}
