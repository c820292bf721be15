//! Identity domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identity identifier: 128 random bits, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
    /// Generate a fresh identifier from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let bytes: [u8; 16] = rand::Rng::random(&mut rng);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for IdentityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for IdentityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of user classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Nurse,
    Admin,
    Receptionist,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Patient,
        Role::Doctor,
        Role::Nurse,
        Role::Admin,
        Role::Receptionist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::Admin => "admin",
            Role::Receptionist => "receptionist",
        }
    }

    /// Parse the wire name of a role. Matching is exact.
    pub fn parse(s: &str) -> Option<Self> {
        Role::ALL.into_iter().find(|role| role.as_str() == s)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityStatus {
    Active,
    Inactive,
    Pending,
    Blocked,
}

impl IdentityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityStatus::Active => "active",
            IdentityStatus::Inactive => "inactive",
            IdentityStatus::Pending => "pending",
            IdentityStatus::Blocked => "blocked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(IdentityStatus::Active),
            "inactive" => Some(IdentityStatus::Inactive),
            "pending" => Some(IdentityStatus::Pending),
            "blocked" => Some(IdentityStatus::Blocked),
            _ => None,
        }
    }
}

/// Per-role profile attributes. Role-specific fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    /// Patients only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    /// Medical license number (doctors).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crm: Option<String>,
    /// Nursing license number (nurses).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coren: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speciality: Option<String>,
    /// Staff only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// A persisted identity.
///
/// `password_hash` is never serialized outward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub status: IdentityStatus,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    pub fn is_active(&self) -> bool {
        self.status == IdentityStatus::Active
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.profile.first_name, self.profile.last_name)
            .trim()
            .to_string()
    }
}

/// Outward representation of an [`Identity`], without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicIdentity {
    pub id: IdentityId,
    pub email: String,
    pub role: Role,
    pub status: IdentityStatus,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Identity> for PublicIdentity {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            status: identity.status,
            profile: identity.profile.clone(),
            created_at: identity.created_at,
            updated_at: identity.updated_at,
        }
    }
}
