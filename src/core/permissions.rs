//! Role-based access rules.
//!
//! Every protected endpoint names a [`Requirement`]; [`authorize`] decides
//! whether a role satisfies it. The match is exhaustive over [`UserRole`], so
//! adding a role forces every rule to be revisited.

use serde::Serialize;
use thiserror::Error;

use crate::db::types::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Requirement {
    AdminOnly,
    SupervisorOnly,
    SupervisorOrAdmin,
    AnyAuthenticated,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub(crate) struct PermissionDenied(pub(crate) &'static str);

impl Requirement {
    fn denial(self) -> PermissionDenied {
        match self {
            Self::AdminOnly => PermissionDenied("Admin permissions required"),
            Self::SupervisorOnly => PermissionDenied("Supervisor permissions required"),
            Self::SupervisorOrAdmin => {
                PermissionDenied("Supervisor or admin permissions required")
            }
            Self::AnyAuthenticated => PermissionDenied("Authentication required"),
        }
    }
}

pub(crate) fn authorize(role: UserRole, required: Requirement) -> Result<(), PermissionDenied> {
    let allowed = match (required, role) {
        (Requirement::AnyAuthenticated, _) => true,
        (Requirement::AdminOnly, UserRole::Admin) => true,
        (Requirement::AdminOnly, UserRole::Supervisor | UserRole::User) => false,
        (Requirement::SupervisorOnly, UserRole::Supervisor) => true,
        (Requirement::SupervisorOnly, UserRole::Admin | UserRole::User) => false,
        (Requirement::SupervisorOrAdmin, UserRole::Admin | UserRole::Supervisor) => true,
        (Requirement::SupervisorOrAdmin, UserRole::User) => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(required.denial())
    }
}

/// Capability flags reported by `GET /auth/me`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct RolePermissions {
    pub(crate) can_create_exams: bool,
    pub(crate) can_grade_exams: bool,
    pub(crate) is_admin: bool,
    pub(crate) is_supervisor: bool,
    pub(crate) is_user: bool,
}

impl RolePermissions {
    pub(crate) fn for_role(role: UserRole) -> Self {
        Self {
            can_create_exams: authorize(role, Requirement::AdminOnly).is_ok(),
            can_grade_exams: authorize(role, Requirement::SupervisorOnly).is_ok(),
            is_admin: role == UserRole::Admin,
            is_supervisor: role == UserRole::Supervisor,
            is_user: role == UserRole::User,
        }
    }
}
