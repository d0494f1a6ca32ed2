//! Request middleware: token validation and access guards.

pub mod auth;

pub use auth::{AuthUser, auth_middleware, super_admin_guard, tenant_guard};
