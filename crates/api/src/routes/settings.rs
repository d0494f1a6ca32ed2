//! Tenant settings: rates, contact details and receipt layout.

use axum::{Json, Router, extract::State, routing::get};
use plus_db::entities::tenants;
use plus_db::repositories::TenantSettingsInput;
use plus_shared::types::Currency;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::ValidatedJson;
use crate::middleware::AuthUser;

/// Settings update; absent fields keep their value.
#[derive(Debug, Deserialize, Validate)]
pub struct SettingsRequest {
    /// Business name.
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// Tax rate in percent.
    pub tax_rate: Option<Decimal>,
    /// HTG per USD.
    pub exchange_rate: Option<Decimal>,
    /// Default document currency.
    pub default_currency: Option<Currency>,
    /// Address printed on documents.
    pub address: Option<String>,
    /// Phone printed on documents.
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    /// Contact email.
    #[validate(email)]
    pub email: Option<String>,
    /// Tax identification number.
    #[validate(length(max = 50))]
    pub nif: Option<String>,
    /// Receipt footer.
    #[validate(length(max = 500))]
    pub receipt_footer: Option<String>,
    /// Receipt paper width, 80 or 57 mm.
    pub receipt_width_mm: Option<i32>,
}

impl From<SettingsRequest> for TenantSettingsInput {
    fn from(req: SettingsRequest) -> Self {
        Self {
            name: req.name,
            tax_rate: req.tax_rate,
            exchange_rate: req.exchange_rate,
            default_currency: req.default_currency,
            address: req.address,
            phone: req.phone,
            email: req.email,
            nif: req.nif,
            receipt_footer: req.receipt_footer,
            receipt_width_mm: req.receipt_width_mm,
        }
    }
}

/// Creates the settings router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).put(update_settings))
}

/// GET /settings
async fn get_settings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<tenants::Model>> {
    let tenant = state.tenants().get(auth.tenant_id()?).await?;
    Ok(Json(tenant))
}

/// PUT /settings
async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<SettingsRequest>,
) -> ApiResult<Json<tenants::Model>> {
    auth.require_admin()?;
    let tenant = state
        .tenants()
        .update_settings(auth.tenant_id()?, payload.into())
        .await?;
    Ok(Json(tenant))
}
