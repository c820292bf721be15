//! Vida+ database layer: identity store implementations.
//!
//! This crate provides:
//! - [`MemoryIdentityStore`], a process-local store for tests and
//!   development
//! - [`SurrealIdentityStore`], the persistent SurrealDB-backed store
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod memory;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use memory::MemoryIdentityStore;
pub use repository::SurrealIdentityStore;
pub use schema::{run_migrations, schema_v1};
