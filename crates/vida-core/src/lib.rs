//! Vida+ core: domain models, the identity store port and the shared
//! error taxonomy.

pub mod error;
pub mod health;
pub mod models;
pub mod repository;

pub use error::{ErrorBody, ErrorKind, VidaError, VidaResult};
pub use models::identity::{
    Identity, IdentityId, IdentityStatus, Profile, PublicIdentity, Role,
};
pub use repository::IdentityStore;
