//! Thermal receipt rendering.
//!
//! [`layout`] turns an invoice view into fixed-width text lines for 80 mm or
//! 57 mm roll paper; [`render`] draws those lines into a single-page PDF
//! whose height follows the content.

pub mod layout;
pub mod render;

pub use layout::{PaperWidth, ReceiptItem, ReceiptLine, ReceiptView, format_amount, layout_receipt, wrap_text};
pub use render::{ReceiptError, render_receipt};
