//! Plan limits.

use crate::error::BillingError;

/// Resources a plan caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanResource {
    /// Tenant users.
    Users,
    /// Active products.
    Products,
}

impl PlanResource {
    const fn label(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Products => "products",
        }
    }
}

/// Fails when adding one more `resource` would exceed the plan maximum.
/// A tenant without a plan is not limited.
pub fn check_plan_limit(
    resource: PlanResource,
    current: u64,
    max: Option<i32>,
) -> Result<(), BillingError> {
    let Some(limit) = max else {
        return Ok(());
    };
    let allowed = u64::try_from(limit).unwrap_or(0);
    if current >= allowed {
        return Err(BillingError::PlanLimitReached {
            resource: resource.label(),
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_limit() {
        assert!(check_plan_limit(PlanResource::Users, 2, Some(3)).is_ok());
    }

    #[test]
    fn test_at_limit() {
        let err = check_plan_limit(PlanResource::Products, 50, Some(50)).unwrap_err();
        assert_eq!(err.error_code(), "PLAN_LIMIT_REACHED");
        assert_eq!(err.to_string(), "Plan limit reached: at most 50 products");
    }

    #[test]
    fn test_no_plan_is_unlimited() {
        assert!(check_plan_limit(PlanResource::Users, 10_000, None).is_ok());
    }
}
