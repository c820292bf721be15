//! Identity store port.
//!
//! The auth engine depends only on this narrow contract; concrete
//! storage engines live in `vida-db`. Implementations must enforce email
//! uniqueness atomically on [`IdentityStore::create`], since any
//! read-then-write check done by a caller can race.

use crate::error::VidaResult;
use crate::models::identity::{Identity, IdentityId};

pub trait IdentityStore: Send + Sync {
    /// Look up an identity by exact email. `Ok(None)` when absent.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = VidaResult<Option<Identity>>> + Send;

    fn find_by_id(
        &self,
        id: &IdentityId,
    ) -> impl Future<Output = VidaResult<Option<Identity>>> + Send;

    /// Persist a new identity. Fails with `AlreadyExists` if the email is
    /// taken.
    fn create(&self, identity: Identity) -> impl Future<Output = VidaResult<Identity>> + Send;

    /// All identities, oldest first.
    fn list(&self) -> impl Future<Output = VidaResult<Vec<Identity>>> + Send;

    /// Cheap liveness probe of the backing store.
    fn ping(&self) -> impl Future<Output = VidaResult<()>> + Send;
}
