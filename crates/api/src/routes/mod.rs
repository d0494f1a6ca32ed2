//! API route definitions.

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};

use crate::AppState;
use crate::middleware::{auth_middleware, super_admin_guard, tenant_guard};

pub mod admin;
pub mod auth;
pub mod clients;
pub mod health;
pub mod invoices;
pub mod products;
pub mod quotes;
pub mod reports;
pub mod settings;
pub mod users;

/// Routes served to members of an active tenant.
fn tenant_routes() -> Router<AppState> {
    Router::new()
        .merge(clients::routes())
        .merge(products::routes())
        .merge(quotes::routes())
        .merge(invoices::routes())
        .merge(reports::routes())
        .merge(settings::routes())
        .merge(users::routes())
}

/// Creates the API router; guarded groups need the state for their middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let authenticate = from_fn_with_state(state.clone(), auth_middleware);

    // The last layer added runs first, so tokens are checked before the guards.
    let tenant = tenant_routes()
        .layer(from_fn_with_state(state.clone(), tenant_guard))
        .layer(authenticate.clone());

    let admin = admin::routes()
        .layer(from_fn(super_admin_guard))
        .layer(authenticate.clone());

    let session = auth::session_routes().layer(authenticate);

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(session)
        .merge(tenant)
        .merge(admin)
}
