//! In-memory identity store for tests and development.
//!
//! Data is lost when the last clone of the store is dropped. Uniqueness
//! of email is checked under the same write lock as the insert.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use vida_core::error::{VidaError, VidaResult};
use vida_core::models::identity::{Identity, IdentityId};
use vida_core::repository::IdentityStore;

#[derive(Debug, Default)]
struct Inner {
    by_id: HashMap<IdentityId, Identity>,
    /// email -> id
    emails: HashMap<String, IdentityId>,
}

/// A process-local [`IdentityStore`]. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl IdentityStore for MemoryIdentityStore {
    async fn find_by_email(&self, email: &str) -> VidaResult<Option<Identity>> {
        let inner = self.inner.read().await;
        Ok(inner
            .emails
            .get(email)
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: &IdentityId) -> VidaResult<Option<Identity>> {
        Ok(self.inner.read().await.by_id.get(id).cloned())
    }

    async fn create(&self, identity: Identity) -> VidaResult<Identity> {
        let mut inner = self.inner.write().await;
        if inner.emails.contains_key(&identity.email) {
            return Err(VidaError::AlreadyExists {
                entity: "user".into(),
            });
        }
        if inner.by_id.contains_key(&identity.id) {
            return Err(VidaError::Internal("identity id collision".into()));
        }

        inner
            .emails
            .insert(identity.email.clone(), identity.id.clone());
        inner.by_id.insert(identity.id.clone(), identity.clone());
        Ok(identity)
    }

    async fn list(&self) -> VidaResult<Vec<Identity>> {
        let mut identities: Vec<Identity> =
            self.inner.read().await.by_id.values().cloned().collect();
        identities.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(identities)
    }

    async fn ping(&self) -> VidaResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use vida_core::error::ErrorKind;
    use vida_core::models::identity::{IdentityStatus, Profile, Role};

    use super::*;

    fn identity(email: &str, role: Role) -> Identity {
        let now = Utc::now();
        Identity {
            id: IdentityId::generate(),
            email: email.into(),
            password_hash: "$argon2id$placeholder".into(),
            role,
            status: IdentityStatus::Active,
            profile: Profile::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn create_and_find() {
        let store = MemoryIdentityStore::new();
        let created = store
            .create(identity("patient@test.com", Role::Patient))
            .await
            .unwrap();

        let by_email = store.find_by_email("patient@test.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        let by_id = store.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "patient@test.com");

        assert!(store.find_by_email("other@test.com").await.unwrap().is_none());
        assert!(
            store
                .find_by_id(&IdentityId::generate())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let store = MemoryIdentityStore::new();
        store
            .create(identity("Patient@Test.com", Role::Patient))
            .await
            .unwrap();

        assert!(store.find_by_email("patient@test.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryIdentityStore::new();
        store
            .create(identity("dup@test.com", Role::Patient))
            .await
            .unwrap();

        let err = store
            .create(identity("dup@test.com", Role::Doctor))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_duplicates_admit_exactly_one() {
        let store = MemoryIdentityStore::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .create(identity("race@test.com", Role::Patient))
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn list_is_ordered_by_creation() {
        let store = MemoryIdentityStore::new();
        let mut older = identity("older@test.com", Role::Nurse);
        older.created_at = Utc::now() - Duration::hours(1);
        store
            .create(identity("newer@test.com", Role::Doctor))
            .await
            .unwrap();
        store.create(older).await.unwrap();

        let emails: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.email)
            .collect();
        assert_eq!(emails, ["older@test.com", "newer@test.com"]);
    }
}
