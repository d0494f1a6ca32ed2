//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - User role definitions and the role policy

mod password;

pub use password::{PasswordError, hash_password, verify_password};

use serde::{Deserialize, Serialize};

/// User roles.
///
/// `SuperAdmin` operates the platform and belongs to no tenant; the other two
/// roles are scoped to a single tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Platform operator. Only the `/admin` panel.
    SuperAdmin,
    /// Tenant administrator. Everything inside the tenant.
    Admin,
    /// Tenant staff. Clients, quotes, invoices, payments, read-only reports.
    User,
}

impl UserRole {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Parses a role from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "super_admin" => Some(Self::SuperAdmin),
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    /// Returns true for the platform operator.
    #[must_use]
    pub const fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Returns true if this role works inside a tenant.
    #[must_use]
    pub const fn is_tenant_member(&self) -> bool {
        matches!(self, Self::Admin | Self::User)
    }

    /// Settings, users, product catalogue, stock adjustments and invoice
    /// cancellation.
    #[must_use]
    pub const fn is_tenant_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
