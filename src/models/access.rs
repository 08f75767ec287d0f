//! Access control models

use serde::{Deserialize, Serialize};

/// Roles carried in the `roles` claim of an access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessRole {
    /// Tenant administrator
    Admin,
    /// Platform-wide administrator
    SuperAdmin,
    /// Administrator of a subset of org units
    OrgAdminUser,
    /// Read-mostly user
    LimitedUser,
    /// Read-only access including activity logs
    Auditor,
    /// Shared dashboard viewer
    PublicDashboard,
    /// User restricted to issues assigned to them
    AssignedIssuesUser,
    /// Tenant owner allowed to create workspaces
    TenantAdmin,
}

impl AccessRole {
    /// Get all available roles
    pub fn all() -> Vec<AccessRole> {
        vec![
            AccessRole::Admin,
            AccessRole::SuperAdmin,
            AccessRole::OrgAdminUser,
            AccessRole::LimitedUser,
            AccessRole::Auditor,
            AccessRole::PublicDashboard,
            AccessRole::AssignedIssuesUser,
            AccessRole::TenantAdmin,
        ]
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessRole::Admin => "ADMIN",
            AccessRole::SuperAdmin => "SUPER_ADMIN",
            AccessRole::OrgAdminUser => "ORG_ADMIN_USER",
            AccessRole::LimitedUser => "LIMITED_USER",
            AccessRole::Auditor => "AUDITOR",
            AccessRole::PublicDashboard => "PUBLIC_DASHBOARD",
            AccessRole::AssignedIssuesUser => "ASSIGNED_ISSUES_USER",
            AccessRole::TenantAdmin => "TENANT_ADMIN",
        }
    }

    /// Parse a role name, case-insensitively
    pub fn parse(value: &str) -> Option<AccessRole> {
        Self::all()
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Roles allowed to run aggregation reports
pub const REPORT_ROLES: &[AccessRole] = &[
    AccessRole::Admin,
    AccessRole::PublicDashboard,
    AccessRole::SuperAdmin,
    AccessRole::OrgAdminUser,
    AccessRole::LimitedUser,
    AccessRole::Auditor,
];

/// Roles allowed to create, edit or delete playbooks and products
pub const WRITE_ROLES: &[AccessRole] = &[AccessRole::Admin, AccessRole::SuperAdmin];

/// Roles allowed to read playbooks and config tables
pub const READ_ROLES: &[AccessRole] = &[
    AccessRole::Admin,
    AccessRole::Auditor,
    AccessRole::LimitedUser,
    AccessRole::SuperAdmin,
    AccessRole::OrgAdminUser,
];

/// Roles allowed to read products (workspaces)
pub const PRODUCT_READ_ROLES: &[AccessRole] = &[
    AccessRole::Admin,
    AccessRole::Auditor,
    AccessRole::LimitedUser,
    AccessRole::SuperAdmin,
    AccessRole::OrgAdminUser,
    AccessRole::PublicDashboard,
    AccessRole::AssignedIssuesUser,
];

/// Roles allowed to create products
pub const PRODUCT_CREATE_ROLES: &[AccessRole] = &[
    AccessRole::Admin,
    AccessRole::SuperAdmin,
    AccessRole::TenantAdmin,
];

/// Roles allowed to list activity logs
pub const AUDIT_ROLES: &[AccessRole] = &[
    AccessRole::Admin,
    AccessRole::SuperAdmin,
    AccessRole::Auditor,
];
