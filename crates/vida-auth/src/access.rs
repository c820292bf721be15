//! Role-based access decisions.
//!
//! Pure functions over a verified role: no I/O, no state. The request
//! pipeline calls these only after a token has been decoded.

use vida_core::models::identity::Role;

use crate::error::AuthError;

/// Permission tags checked against a role's static permission set.
pub mod permissions {
    pub const VIEW_PATIENTS: &str = "view_patients";
    pub const MANAGE_APPOINTMENTS: &str = "manage_appointments";
    pub const VIEW_MEDICAL_RECORDS: &str = "view_medical_records";
    pub const VIEW_BASIC_RECORDS: &str = "view_basic_records";
    pub const VIEW_OWN_RECORDS: &str = "view_own_records";
    pub const MANAGE_OWN_APPOINTMENTS: &str = "manage_own_appointments";
}

use permissions::*;

/// Admin-only endpoints.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Doctors and nurses.
pub const MEDICAL_STAFF: &[Role] = &[Role::Doctor, Role::Nurse];

/// The permission set granted to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolePermissions {
    /// Every permission, including tags not listed in [`permissions`].
    All,
    Only(&'static [&'static str]),
}

impl RolePermissions {
    pub fn contains(&self, permission: &str) -> bool {
        match self {
            RolePermissions::All => true,
            RolePermissions::Only(granted) => granted.iter().any(|g| *g == permission),
        }
    }
}

pub fn role_permissions(role: Role) -> RolePermissions {
    match role {
        Role::Admin => RolePermissions::All,
        Role::Doctor => {
            RolePermissions::Only(&[VIEW_PATIENTS, MANAGE_APPOINTMENTS, VIEW_MEDICAL_RECORDS])
        }
        Role::Nurse => RolePermissions::Only(&[VIEW_PATIENTS, VIEW_BASIC_RECORDS]),
        Role::Receptionist => RolePermissions::Only(&[MANAGE_APPOINTMENTS, VIEW_PATIENTS]),
        Role::Patient => RolePermissions::Only(&[VIEW_OWN_RECORDS, MANAGE_OWN_APPOINTMENTS]),
    }
}

pub fn has_permission(role: Role, permission: &str) -> bool {
    role_permissions(role).contains(permission)
}

/// What an endpoint demands of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement<'a> {
    Permission(&'a str),
    /// Caller's role must be one of these.
    AnyRole(&'a [Role]),
}

impl Requirement<'_> {
    fn denial_reason(&self) -> &'static str {
        match self {
            Requirement::Permission(_) => "insufficient permissions",
            Requirement::AnyRole(_) => "access denied for user type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

pub fn authorize(role: Role, requirement: &Requirement<'_>) -> Decision {
    let allowed = match requirement {
        Requirement::Permission(permission) => has_permission(role, permission),
        Requirement::AnyRole(roles) => roles.contains(&role),
    };
    if allowed {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// [`authorize`], turning a denial into [`AuthError::Forbidden`].
pub fn require(role: Role, requirement: &Requirement<'_>) -> Result<(), AuthError> {
    match authorize(role, requirement) {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(AuthError::Forbidden(requirement.denial_reason().into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_table() {
        let table: [(Role, &[&str]); 4] = [
            (
                Role::Doctor,
                &[VIEW_PATIENTS, MANAGE_APPOINTMENTS, VIEW_MEDICAL_RECORDS],
            ),
            (Role::Nurse, &[VIEW_PATIENTS, VIEW_BASIC_RECORDS]),
            (Role::Receptionist, &[MANAGE_APPOINTMENTS, VIEW_PATIENTS]),
            (Role::Patient, &[VIEW_OWN_RECORDS, MANAGE_OWN_APPOINTMENTS]),
        ];
        let every = [
            VIEW_PATIENTS,
            MANAGE_APPOINTMENTS,
            VIEW_MEDICAL_RECORDS,
            VIEW_BASIC_RECORDS,
            VIEW_OWN_RECORDS,
            MANAGE_OWN_APPOINTMENTS,
        ];

        for (role, granted) in table {
            for permission in every {
                assert_eq!(
                    has_permission(role, permission),
                    granted.contains(&permission),
                    "{role} / {permission}"
                );
            }
        }
    }

    #[test]
    fn doctor_and_patient_on_medical_records() {
        let requirement = Requirement::Permission(VIEW_MEDICAL_RECORDS);
        assert_eq!(authorize(Role::Doctor, &requirement), Decision::Allow);
        assert_eq!(authorize(Role::Patient, &requirement), Decision::Deny);
        assert_eq!(authorize(Role::Nurse, &requirement), Decision::Deny);
    }

    #[test]
    fn admin_has_every_permission() {
        for permission in [VIEW_MEDICAL_RECORDS, "delete_everything", ""] {
            assert!(authorize(Role::Admin, &Requirement::Permission(permission)).is_allowed());
        }
    }

    #[test]
    fn unknown_permission_is_denied_for_non_admins() {
        for role in [Role::Doctor, Role::Nurse, Role::Receptionist, Role::Patient] {
            assert!(!has_permission(role, "manage_billing"));
        }
    }

    #[test]
    fn role_sets_use_membership() {
        assert!(authorize(Role::Admin, &Requirement::AnyRole(ADMIN_ONLY)).is_allowed());
        assert!(!authorize(Role::Doctor, &Requirement::AnyRole(ADMIN_ONLY)).is_allowed());

        assert!(authorize(Role::Nurse, &Requirement::AnyRole(MEDICAL_STAFF)).is_allowed());
        assert!(authorize(Role::Doctor, &Requirement::AnyRole(MEDICAL_STAFF)).is_allowed());
        assert!(!authorize(Role::Admin, &Requirement::AnyRole(MEDICAL_STAFF)).is_allowed());
        assert!(!authorize(Role::Patient, &Requirement::AnyRole(&[])).is_allowed());
    }

    #[test]
    fn require_reports_denial_reason() {
        let err = require(Role::Patient, &Requirement::AnyRole(ADMIN_ONLY)).unwrap_err();
        assert_eq!(err.to_string(), "access denied for user type");

        let err = require(Role::Nurse, &Requirement::Permission(MANAGE_APPOINTMENTS)).unwrap_err();
        assert_eq!(err.to_string(), "insufficient permissions");

        assert!(require(Role::Receptionist, &Requirement::Permission(VIEW_PATIENTS)).is_ok());
    }
}
