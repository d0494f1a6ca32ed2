//! Client directory routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use plus_db::entities::clients;
use plus_db::repositories::ClientInput;
use plus_shared::types::{Currency, PageRequest, PageResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::ValidatedJson;
use crate::middleware::AuthUser;

/// Client fields; every field is optional on update.
#[derive(Debug, Deserialize, Validate)]
pub struct ClientRequest {
    /// Display name, required on create.
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// Contact email.
    #[validate(email)]
    pub email: Option<String>,
    /// Phone.
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Tax identification number.
    #[validate(length(max = 50))]
    pub nif: Option<String>,
    /// Currency the client is usually billed in.
    pub preferred_currency: Option<Currency>,
}

impl From<ClientRequest> for ClientInput {
    fn from(req: ClientRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            phone: req.phone,
            address: req.address,
            nif: req.nif,
            preferred_currency: req.preferred_currency,
        }
    }
}

/// Client list filter.
#[derive(Debug, Default, Deserialize)]
pub struct ClientQuery {
    /// Matches name, email, phone or NIF.
    pub search: Option<String>,
}

/// Creates the client router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route(
            "/clients/{id}",
            get(get_client).put(update_client).delete(delete_client),
        )
}

/// GET /clients
async fn list_clients(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(query): Query<ClientQuery>,
) -> ApiResult<Json<PageResponse<clients::Model>>> {
    let tenant_id = auth.tenant_id()?;
    let clients = state
        .clients()
        .list(tenant_id, query.search.as_deref(), &page)
        .await?;
    Ok(Json(clients))
}

/// POST /clients
async fn create_client(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<ClientRequest>,
) -> ApiResult<(StatusCode, Json<clients::Model>)> {
    let tenant_id = auth.tenant_id()?;
    let client = state.clients().create(tenant_id, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// GET /clients/{id}
async fn get_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<clients::Model>> {
    let client = state.clients().get(auth.tenant_id()?, id).await?;
    Ok(Json(client))
}

/// PUT /clients/{id}
async fn update_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ClientRequest>,
) -> ApiResult<Json<clients::Model>> {
    let client = state
        .clients()
        .update(auth.tenant_id()?, id, payload.into())
        .await?;
    Ok(Json(client))
}

/// DELETE /clients/{id} - Soft delete; existing documents keep their snapshot.
async fn delete_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_admin()?;
    state.clients().deactivate(auth.tenant_id()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
