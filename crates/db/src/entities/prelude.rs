//! Entity re-exports.

pub use super::clients::Entity as Clients;
pub use super::document_sequences::Entity as DocumentSequences;
pub use super::invoice_items::Entity as InvoiceItems;
pub use super::invoices::Entity as Invoices;
pub use super::payments::Entity as Payments;
pub use super::products::Entity as Products;
pub use super::quote_items::Entity as QuoteItems;
pub use super::quotes::Entity as Quotes;
pub use super::stock_movements::Entity as StockMovements;
pub use super::subscription_plans::Entity as SubscriptionPlans;
pub use super::tenants::Entity as Tenants;
pub use super::users::Entity as Users;
