//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every multi-row write runs in one transaction.

pub mod client;
pub mod document;
pub mod invoice;
pub mod product;
pub mod quote;
pub mod report;
pub mod sequence;
pub mod stock;
pub mod tenant;
pub mod user;

pub use client::{ClientInput, ClientRepository};
pub use document::ItemInput;
pub use invoice::{
    CreateInvoiceInput, InvoiceFilter, InvoiceRepository, InvoiceWithItems, PaymentInput,
    PaymentOutcome,
};
pub use product::{CreateProductInput, ProductFilter, ProductRepository, UpdateProductInput};
pub use quote::{CreateQuoteInput, QuoteFilter, QuoteRepository, QuoteWithItems, UpdateQuoteInput};
pub use report::{DashboardSummary, ReportRepository, TopProduct};
pub use sequence::PgDocumentCounter;
pub use stock::{AdjustStockInput, NewMovement, StockLedger};
pub use tenant::{
    CreateTenantInput, PlanInput, TenantAction, TenantRepository, TenantSettingsInput,
    UpdatePlanInput,
};
pub use user::{CreateUserInput, UserRepository};
