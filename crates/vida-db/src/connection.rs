//! Connection to the identity database.
//!
//! The server opens one [`DbManager`] at startup; it signs in, selects
//! the Vida+ namespace and applies pending schema migrations before any
//! identity store is handed out.

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::repository::SurrealIdentityStore;
use crate::schema::run_migrations;

/// Where the identity database lives and how to sign in to it.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// `host:port` of the SurrealDB WebSocket endpoint.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "vida".into(),
            database: "identity".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &self.url)
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An open, migrated identity database.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Sign in, select namespace and database, then migrate the schema.
    pub async fn open(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "opening identity database"
        );

        let db = Surreal::new::<Ws>(config.url.as_str()).await?;
        db.signin(Root {
            username: &config.username,
            password: &config.password,
        })
        .await?;
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        run_migrations(&db).await?;
        info!("identity database ready");

        Ok(Self { db })
    }

    /// An [`IdentityStore`](vida_core::IdentityStore) over this connection.
    pub fn identity_store(&self) -> SurrealIdentityStore<Client> {
        SurrealIdentityStore::new(self.db.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_identity_database() {
        let config = DbConfig::default();
        assert_eq!(config.namespace, "vida");
        assert_eq!(config.database, "identity");
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = DbConfig {
            password: "hunter2-db".into(),
            ..DbConfig::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2-db"));
        assert!(printed.contains("<redacted>"));
    }
}
