//! Store health reporting.

use serde::Serialize;

use crate::repository::IdentityStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Working,
    NotWorking,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Working
    }
}

/// Probe the identity store.
///
/// The report carries only the public message of a failure; the
/// underlying store error is logged.
pub async fn check<S: IdentityStore>(store: &S) -> HealthReport {
    match store.ping().await {
        Ok(()) => HealthReport {
            status: HealthStatus::Working,
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "identity store health check failed");
            HealthReport {
                status: HealthStatus::NotWorking,
                error: Some(e.public_message()),
            }
        }
    }
}
