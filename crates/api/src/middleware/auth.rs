//! Authentication middleware and access guards for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use plus_core::auth::UserRole;
use plus_core::subscription::TenantAccess;
use plus_shared::{AppError, Claims, TokenKind};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates access tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates it as an access token using the JWT service
/// 3. Stores the claims in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return Err(AppError::Unauthorized(
            "Authorization header with Bearer token is required".to_string(),
        )
        .into());
    };

    let claims = state.jwt_service.validate(token, TokenKind::Access)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Tenant-access guard.
///
/// Runs after [`auth_middleware`]. Only tenant members pass, and only while
/// their tenant is active and its subscription has not ended.
pub async fn tenant_guard(
    State(state): State<AppState>,
    user: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !user.role()?.is_tenant_member() {
        return Err(ApiError::forbidden("tenant routes require a tenant account"));
    }
    let tenant_id = user.tenant_id()?;

    match state.tenants().access(tenant_id).await? {
        TenantAccess::Allowed => Ok(next.run(request).await),
        denied => {
            let reason = denied.reason().unwrap_or_default();
            warn!(%tenant_id, user_id = %user.user_id(), %reason, "tenant access denied");
            Err(AppError::SubscriptionInactive(reason).into())
        }
    }
}

/// Restricts the `/admin` panel to the platform operator.
pub async fn super_admin_guard(
    user: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !user.role()?.is_super_admin() {
        debug!(user_id = %user.user_id(), role = %user.0.role, "admin panel refused");
        return Err(ApiError::forbidden("super admin only"));
    }
    Ok(next.run(request).await)
}

/// Extractor for authenticated user claims.
///
/// ```ignore
/// async fn handler(user: AuthUser) -> ApiResult<Json<Value>> {
///     let tenant_id = user.tenant_id()?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.0.user_id()
    }

    /// Returns the caller's tenant, failing for super-admin tokens.
    pub fn tenant_id(&self) -> Result<Uuid, ApiError> {
        self.0
            .tenant_id()
            .ok_or_else(|| ApiError::forbidden("no tenant attached to this account"))
    }

    /// Returns the user's role.
    pub fn role(&self) -> Result<UserRole, ApiError> {
        UserRole::parse(&self.0.role)
            .ok_or_else(|| AppError::Unauthorized("unknown role in token".to_string()).into())
    }

    /// Fails unless the caller administers their tenant.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role()?.is_tenant_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("tenant admin role required"))
        }
    }

    /// Returns the inner claims.
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()).into())
    }
}
