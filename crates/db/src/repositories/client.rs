//! Client repository.

use chrono::Utc;
use plus_core::BillingError;
use plus_shared::types::{Currency, PageRequest, PageResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{clients, sea_orm_active_enums::CurrencyCode};
use crate::error::{RepoError, RepoResult};

/// Client fields for create and update.
#[derive(Debug, Clone, Default)]
pub struct ClientInput {
    /// Name.
    pub name: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Address.
    pub address: Option<String>,
    /// Tax identification number.
    pub nif: Option<String>,
    /// Preferred document currency.
    pub preferred_currency: Option<Currency>,
}

/// Client repository.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: DatabaseConnection,
}

impl ClientRepository {
    /// Creates a new client repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a client.
    pub async fn create(&self, tenant_id: Uuid, input: ClientInput) -> RepoResult<clients::Model> {
        let name = input
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| BillingError::validation("client name is required"))?;

        let now = Utc::now().into();
        let client = clients::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(name),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            nif: Set(input.nif),
            preferred_currency: Set(input
                .preferred_currency
                .map_or(CurrencyCode::Htg, CurrencyCode::from)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(%tenant_id, client_id = %client.id, "client created");
        Ok(client)
    }

    /// Lists active clients by name.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        search: Option<&str>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<clients::Model>> {
        let mut query = clients::Entity::find()
            .filter(clients::Column::TenantId.eq(tenant_id))
            .filter(clients::Column::IsActive.eq(true));

        if let Some(search) = search.filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(clients::Column::Name.contains(search))
                    .add(clients::Column::Phone.contains(search))
                    .add(clients::Column::Email.contains(search)),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_asc(clients::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Gets an active client.
    pub async fn get(&self, tenant_id: Uuid, client_id: Uuid) -> RepoResult<clients::Model> {
        clients::Entity::find_by_id(client_id)
            .filter(clients::Column::TenantId.eq(tenant_id))
            .filter(clients::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or_else(|| RepoError::not_found("Client"))
    }

    /// Updates the supplied fields.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        client_id: Uuid,
        input: ClientInput,
    ) -> RepoResult<clients::Model> {
        let client = self.get(tenant_id, client_id).await?;
        let mut active: clients::ActiveModel = client.into();

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(BillingError::validation("client name is required").into());
            }
            active.name = Set(name);
        }
        if input.email.is_some() {
            active.email = Set(input.email);
        }
        if input.phone.is_some() {
            active.phone = Set(input.phone);
        }
        if input.address.is_some() {
            active.address = Set(input.address);
        }
        if input.nif.is_some() {
            active.nif = Set(input.nif);
        }
        if let Some(currency) = input.preferred_currency {
            active.preferred_currency = Set(currency.into());
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Soft-deletes a client; documents keep their snapshot.
    pub async fn deactivate(&self, tenant_id: Uuid, client_id: Uuid) -> RepoResult<()> {
        let client = self.get(tenant_id, client_id).await?;
        let mut active: clients::ActiveModel = client.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;

        info!(%tenant_id, %client_id, "client deactivated");
        Ok(())
    }
}
