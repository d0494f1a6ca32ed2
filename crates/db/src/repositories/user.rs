//! User repository for database operations.

use chrono::Utc;
use plus_core::BillingError;
use plus_core::auth::UserRole as DomainUserRole;
use plus_core::subscription::{PlanResource, check_plan_limit};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::tenant::lock_plan_of;
use crate::entities::{sea_orm_active_enums::UserRole, users};
use crate::error::{RepoError, RepoResult};

/// A new user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Login, stored lowercase.
    pub email: String,
    /// Argon2 hash.
    pub password_hash: String,
    /// Display name.
    pub full_name: String,
    /// Role.
    pub role: DomainUserRole,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an active user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .filter(users::Column::IsActive.eq(true))
            .one(&self.db)
            .await?)
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<users::Model>> {
        Ok(users::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists the users of a tenant.
    pub async fn list(&self, tenant_id: Uuid) -> RepoResult<Vec<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::TenantId.eq(tenant_id))
            .order_by_asc(users::Column::FullName)
            .all(&self.db)
            .await?)
    }

    /// Creates a tenant user, enforcing the plan's user cap.
    pub async fn create_in_tenant(
        &self,
        tenant_id: Uuid,
        input: CreateUserInput,
    ) -> RepoResult<users::Model> {
        if !input.role.is_tenant_member() {
            return Err(BillingError::validation("tenant users must be admin or user").into());
        }

        let txn = self.db.begin().await?;

        let plan = lock_plan_of(&txn, tenant_id).await?;
        let active_users = users::Entity::find()
            .filter(users::Column::TenantId.eq(tenant_id))
            .filter(users::Column::IsActive.eq(true))
            .count(&txn)
            .await?;
        check_plan_limit(PlanResource::Users, active_users, plan.map(|p| p.max_users))?;

        let user = Self::insert(&txn, Some(tenant_id), input).await?;
        txn.commit().await?;

        info!(%tenant_id, user_id = %user.id, role = ?user.role, "user created");
        Ok(user)
    }

    /// Creates a platform super-admin.
    pub async fn create_super_admin(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
    ) -> RepoResult<users::Model> {
        let user = Self::insert(
            &self.db,
            None,
            CreateUserInput {
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                full_name: full_name.to_string(),
                role: DomainUserRole::SuperAdmin,
            },
        )
        .await?;

        info!(user_id = %user.id, "super admin created");
        Ok(user)
    }

    async fn insert<C: sea_orm::ConnectionTrait>(
        conn: &C,
        tenant_id: Option<Uuid>,
        input: CreateUserInput,
    ) -> RepoResult<users::Model> {
        let email = input.email.trim().to_lowercase();
        if !email.contains('@') || input.full_name.trim().is_empty() {
            return Err(BillingError::validation("a valid email and a name are required").into());
        }

        let now = Utc::now().into();
        Ok(users::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            email: Set(email),
            password_hash: Set(input.password_hash),
            full_name: Set(input.full_name.trim().to_string()),
            role: Set(UserRole::from(input.role)),
            is_active: Set(true),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await?)
    }

    /// Stamps a successful login.
    pub async fn record_login(&self, user_id: Uuid) -> RepoResult<()> {
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| RepoError::not_found("User"))?;
        let now = Utc::now().into();
        let mut active: users::ActiveModel = user.into();
        active.last_login_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;
        Ok(())
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}
