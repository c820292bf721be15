//! Layered server configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `vida.toml` in the working directory, then `VIDA__*` environment
//! variables (for example `VIDA__STORE=surreal` or
//! `VIDA__AUTH__JWT_SECRET=...`). A `.env` file is loaded into the
//! environment first when present.

use config::{Config, Environment, File, Source};
use serde::Deserialize;
use vida_auth::AuthConfig;
use vida_db::DbConfig;

use crate::error::ServerError;

const CONFIG_FILE: &str = "vida";
const ENV_PREFIX: &str = "VIDA";

/// Which [`IdentityStore`](vida_core::IdentityStore) backs the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Process-local; identities are lost on shutdown.
    #[default]
    Memory,
    Surreal,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub store: StoreKind,
    pub auth: AuthConfig,
    pub db: DbConfig,
}

impl ServerConfig {
    /// Load `.env`, `vida.toml` and the environment, then validate.
    pub fn load() -> Result<Self, ServerError> {
        dotenvy::dotenv().ok();
        Self::build(File::with_name(CONFIG_FILE).required(false))
    }

    fn build<S>(file: S) -> Result<Self, ServerError>
    where
        S: Source + Send + Sync + 'static,
    {
        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.auth.validate()?;
        Ok(config)
    }
}
