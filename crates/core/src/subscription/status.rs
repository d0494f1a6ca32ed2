//! Tenant status machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BillingError;

const ENTITY: &str = "tenant";

/// Tenant account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    /// Created, waiting for first payment.
    Pending,
    /// In good standing.
    Active,
    /// Access blocked, data kept.
    Suspended,
    /// Closed. Only a purge can follow.
    Cancelled,
}

impl TenantStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stateless tenant status transitions used by the admin panel.
pub struct TenantLifecycle;

impl TenantLifecycle {
    /// `pending | suspended → active`.
    pub fn activate(current: TenantStatus) -> Result<TenantStatus, BillingError> {
        match current {
            TenantStatus::Pending | TenantStatus::Suspended => Ok(TenantStatus::Active),
            _ => Err(BillingError::invalid_state(ENTITY, current, "activate")),
        }
    }

    /// `active | pending → suspended`.
    pub fn suspend(current: TenantStatus) -> Result<TenantStatus, BillingError> {
        match current {
            TenantStatus::Active | TenantStatus::Pending => Ok(TenantStatus::Suspended),
            _ => Err(BillingError::invalid_state(ENTITY, current, "suspend")),
        }
    }

    /// Anything but cancelled → cancelled.
    pub fn cancel(current: TenantStatus) -> Result<TenantStatus, BillingError> {
        match current {
            TenantStatus::Cancelled => Err(BillingError::invalid_state(ENTITY, current, "cancel")),
            _ => Ok(TenantStatus::Cancelled),
        }
    }

    /// Hard deletion is only allowed once the tenant is cancelled.
    pub fn ensure_purgeable(current: TenantStatus) -> Result<(), BillingError> {
        match current {
            TenantStatus::Cancelled => Ok(()),
            _ => Err(BillingError::invalid_state(ENTITY, current, "purge")),
        }
    }

    /// Renewal reactivates pending or suspended tenants; cancelled tenants
    /// cannot be renewed.
    pub fn renew(current: TenantStatus) -> Result<TenantStatus, BillingError> {
        match current {
            TenantStatus::Cancelled => Err(BillingError::invalid_state(ENTITY, current, "renew")),
            _ => Ok(TenantStatus::Active),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TenantStatus::Pending, true)]
    #[case(TenantStatus::Suspended, true)]
    #[case(TenantStatus::Active, false)]
    #[case(TenantStatus::Cancelled, false)]
    fn test_activate(#[case] from: TenantStatus, #[case] ok: bool) {
        assert_eq!(TenantLifecycle::activate(from).is_ok(), ok);
    }

    #[test]
    fn test_cancel_then_purge() {
        let cancelled = TenantLifecycle::cancel(TenantStatus::Active).unwrap();
        assert!(TenantLifecycle::ensure_purgeable(cancelled).is_ok());
        assert!(TenantLifecycle::cancel(cancelled).is_err());
        assert!(TenantLifecycle::renew(cancelled).is_err());
    }

    #[test]
    fn test_active_tenant_cannot_be_purged() {
        assert!(matches!(
            TenantLifecycle::ensure_purgeable(TenantStatus::Active),
            Err(BillingError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_renew_reactivates_suspended() {
        assert_eq!(
            TenantLifecycle::renew(TenantStatus::Suspended).unwrap(),
            TenantStatus::Active
        );
    }
}
