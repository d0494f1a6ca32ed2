//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for tenants, the super-admin panel and the billing flow
//! - Authentication, tenant-access and role guards
//! - Request extractors
//! - Error-to-response mapping

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::AUTHORIZATION;
use plus_db::{
    ClientRepository, InvoiceRepository, ProductRepository, QuoteRepository, ReportRepository,
    StockLedger, TenantRepository, UserRepository,
};
use plus_shared::{BusinessClock, JwtService};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DatabaseConnection,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Business-timezone clock.
    pub clock: BusinessClock,
    /// `min_stock` given to products created without one.
    pub low_stock_threshold: i32,
}

impl AppState {
    /// Creates the application state.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        jwt_service: JwtService,
        clock: BusinessClock,
        low_stock_threshold: i32,
    ) -> Self {
        Self {
            db,
            jwt_service: Arc::new(jwt_service),
            clock,
            low_stock_threshold,
        }
    }

    pub(crate) fn tenants(&self) -> TenantRepository {
        TenantRepository::new(self.db.clone(), self.clock)
    }

    pub(crate) fn users(&self) -> UserRepository {
        UserRepository::new(self.db.clone())
    }

    pub(crate) fn clients(&self) -> ClientRepository {
        ClientRepository::new(self.db.clone())
    }

    pub(crate) fn products(&self) -> ProductRepository {
        ProductRepository::new(self.db.clone(), self.low_stock_threshold)
    }

    pub(crate) fn stock(&self) -> StockLedger {
        StockLedger::new(self.db.clone())
    }

    pub(crate) fn quotes(&self) -> QuoteRepository {
        QuoteRepository::new(self.db.clone(), self.clock)
    }

    pub(crate) fn invoices(&self) -> InvoiceRepository {
        InvoiceRepository::new(self.db.clone(), self.clock)
    }

    pub(crate) fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.db.clone(), self.clock)
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveRequestHeadersLayer::new([AUTHORIZATION]))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
