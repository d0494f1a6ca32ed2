//! Authentication routes for login, token refresh and the current session.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use plus_core::auth::{UserRole, verify_password};
use plus_db::entities::{tenants, users};
use plus_shared::{AppError, TokenKind, TokenPair};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::ValidatedJson;
use crate::middleware::AuthUser;

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Account email.
    #[validate(email)]
    pub email: String,
    /// Plain-text password.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Refresh request.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    /// A refresh token from a previous login.
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Tokens plus the authenticated account.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// The account, without its password hash.
    pub user: users::Model,
    /// Issued tokens.
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Current session.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// The account.
    pub user: users::Model,
    /// The account's tenant; absent for super-admins.
    pub tenant: Option<tenants::Model>,
}

/// Public auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

/// Auth routes that need a valid access token.
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

/// POST /auth/login - Authenticate a user and return tokens.
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let users = state.users();

    let Some(user) = users.find_by_email(&payload.email).await? else {
        info!(email = %payload.email, "login attempt for unknown or disabled account");
        return Err(invalid_credentials().into());
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        info!(user_id = %user.id, "failed login attempt - invalid password");
        return Err(invalid_credentials().into());
    }

    let role = UserRole::from(user.role);
    let tokens = state
        .jwt_service
        .issue_pair(user.id, user.tenant_id, role.as_str())?;
    users.record_login(user.id).await?;

    info!(user_id = %user.id, tenant_id = ?user.tenant_id, %role, "user logged in");
    Ok(Json(LoginResponse { user, tokens }))
}

/// POST /auth/refresh - Exchange a refresh token for a new token pair.
async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    let claims = state
        .jwt_service
        .validate(&payload.refresh_token, TokenKind::Refresh)?;

    let user = state
        .users()
        .find_by_id(claims.user_id())
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Unauthorized("account is disabled".to_string()))?;

    let role = UserRole::from(user.role);
    let tokens = state
        .jwt_service
        .issue_pair(user.id, user.tenant_id, role.as_str())?;
    Ok(Json(tokens))
}

/// GET /auth/me - The authenticated account and its tenant.
async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<MeResponse>> {
    let user = state
        .users()
        .find_by_id(auth.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    let tenant = match user.tenant_id {
        Some(tenant_id) => Some(state.tenants().get(tenant_id).await?),
        None => None,
    };

    Ok(Json(MeResponse { user, tenant }))
}
