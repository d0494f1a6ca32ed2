//! Tenant subscriptions: status transitions, the day-5 billing rule, access
//! checks and plan limits.

pub mod billing;
pub mod limits;
pub mod status;

#[cfg(test)]
mod billing_props;

pub use billing::{TenantAccess, evaluate_access, is_expiring_within, renewal_end};
pub use limits::{PlanResource, check_plan_limit};
pub use status::{TenantLifecycle, TenantStatus};
