//! Tenant user management (tenant admins only).

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use plus_core::auth::{UserRole, hash_password};
use plus_db::entities::users;
use plus_db::repositories::CreateUserInput;
use serde::Deserialize;
use validator::Validate;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::ValidatedJson;
use crate::middleware::AuthUser;

/// New tenant user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Login email.
    #[validate(email)]
    pub email: String,
    /// Initial password.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    /// `admin` or `user`; defaults to `user`.
    pub role: Option<UserRole>,
}

/// Creates the user router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users).post(create_user))
}

/// GET /users
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<users::Model>>> {
    auth.require_admin()?;
    let users = state.users().list(auth.tenant_id()?).await?;
    Ok(Json(users))
}

/// POST /users - Subject to the plan's user cap.
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<users::Model>)> {
    auth.require_admin()?;
    let input = CreateUserInput {
        email: payload.email,
        password_hash: hash_password(&payload.password)?,
        full_name: payload.full_name,
        role: payload.role.unwrap_or(UserRole::User),
    };
    let user = state
        .users()
        .create_in_tenant(auth.tenant_id()?, input)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}
