//! Subscription periods.
//!
//! Subscriptions are billed on the 5th: renewing for N months from
//! `base = max(today, current_end)` ends the period on day 5 of the month N
//! months after `base`'s month. Access is allowed while `today <= end`.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::BillingError;
use crate::subscription::status::TenantStatus;

/// Billing anchor day.
pub const BILLING_DAY: u32 = 5;

/// Computes the new subscription end for a renewal of `months` months.
pub fn renewal_end(
    today: NaiveDate,
    current_end: Option<NaiveDate>,
    months: u32,
) -> Result<NaiveDate, BillingError> {
    if months == 0 {
        return Err(BillingError::validation("renewal must cover at least one month"));
    }
    let base = current_end.map_or(today, |end| end.max(today));

    base.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(months)))
        .and_then(|first| first.with_day(BILLING_DAY))
        .ok_or_else(|| BillingError::validation("renewal date out of range"))
}

/// Outcome of the tenant-access guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantAccess {
    /// Requests may proceed.
    Allowed,
    /// Tenant is not active.
    Inactive(TenantStatus),
    /// Subscription ended on the given date.
    Expired(NaiveDate),
}

impl TenantAccess {
    /// Human-readable reason for a denial.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Allowed => None,
            Self::Inactive(status) => Some(format!("tenant is {status}")),
            Self::Expired(end) => Some(format!("subscription expired on {end}")),
        }
    }
}

/// Evaluates whether a tenant may use the application today.
#[must_use]
pub fn evaluate_access(
    status: TenantStatus,
    ends_at: Option<NaiveDate>,
    today: NaiveDate,
) -> TenantAccess {
    if status != TenantStatus::Active {
        return TenantAccess::Inactive(status);
    }
    match ends_at {
        Some(end) if today > end => TenantAccess::Expired(end),
        _ => TenantAccess::Allowed,
    }
}

/// True when the subscription ends within the next `days` days (inclusive).
#[must_use]
pub fn is_expiring_within(ends_at: NaiveDate, today: NaiveDate, days: u64) -> bool {
    today
        .checked_add_days(Days::new(days))
        .is_some_and(|horizon| ends_at >= today && ends_at <= horizon)
}
