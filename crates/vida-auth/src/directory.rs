//! Administrative view over registered identities.

use serde::Serialize;
use vida_core::error::VidaResult;
use vida_core::models::identity::{PublicIdentity, Role};
use vida_core::repository::IdentityStore;

use crate::access::{self, ADMIN_ONLY, Requirement};
use crate::token::AccessTokenClaims;

/// Identity counts per role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentityStats {
    pub admin_id: String,
    pub total_users: usize,
    pub total_patients: usize,
    pub total_doctors: usize,
    pub total_nurses: usize,
    pub total_admins: usize,
    pub total_receptionists: usize,
}

/// Admin-only listing and statistics.
///
/// Callers pass claims that were already verified by the request guard;
/// the role check happens here again so the directory is safe to call
/// from any route.
pub struct Directory<S: IdentityStore> {
    store: S,
}

impl<S: IdentityStore> Directory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list_identities(
        &self,
        claims: &AccessTokenClaims,
    ) -> VidaResult<Vec<PublicIdentity>> {
        access::require(claims.role, &Requirement::AnyRole(ADMIN_ONLY))?;

        let identities = self.store.list().await?;
        tracing::info!(
            admin_id = %claims.sub,
            count = identities.len(),
            "admin listed identities"
        );
        Ok(identities.iter().map(PublicIdentity::from).collect())
    }

    pub async fn stats(&self, claims: &AccessTokenClaims) -> VidaResult<IdentityStats> {
        access::require(claims.role, &Requirement::AnyRole(ADMIN_ONLY))?;

        let identities = self.store.list().await?;
        let mut stats = IdentityStats {
            admin_id: claims.sub.clone(),
            total_users: identities.len(),
            ..Default::default()
        };
        for identity in &identities {
            let counter = match identity.role {
                Role::Patient => &mut stats.total_patients,
                Role::Doctor => &mut stats.total_doctors,
                Role::Nurse => &mut stats.total_nurses,
                Role::Admin => &mut stats.total_admins,
                Role::Receptionist => &mut stats.total_receptionists,
            };
            *counter += 1;
        }

        tracing::info!(
            admin_id = %claims.sub,
            total = stats.total_users,
            "admin read identity stats"
        );
        Ok(stats)
    }
}
