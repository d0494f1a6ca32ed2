//! PDF output for thermal receipts.
//!
//! Coordinates are layout millimetres; no money passes through floating point.
#![allow(clippy::float_arithmetic, clippy::cast_precision_loss)]

use std::io::BufWriter;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use thiserror::Error;

use super::layout::{PaperWidth, ReceiptView, layout_receipt};

const FONT_SIZE_PT: f32 = 8.0;
const LINE_HEIGHT_MM: f32 = 3.6;
const MARGIN_TOP_MM: f32 = 6.0;
const MARGIN_BOTTOM_MM: f32 = 10.0;
const MIN_HEIGHT_MM: f32 = 60.0;

/// Errors from PDF generation.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// printpdf rejected the document.
    #[error("failed to build receipt PDF: {0}")]
    Pdf(String),
}

const fn left_margin_mm(paper: PaperWidth) -> f32 {
    match paper {
        PaperWidth::Mm80 => 4.0,
        PaperWidth::Mm57 => 3.0,
    }
}

fn page_height_mm(line_count: usize) -> f32 {
    let content = line_count as f32 * LINE_HEIGHT_MM;
    (MARGIN_TOP_MM + content + MARGIN_BOTTOM_MM).max(MIN_HEIGHT_MM)
}

fn push_line(layer: &PdfLayerReference, font: &IndirectFontRef, text: &str, x: f32, y: f32) {
    layer.use_text(text, FONT_SIZE_PT, Mm(x), Mm(y), font);
}

/// Renders a receipt as PDF bytes.
pub fn render_receipt(view: &ReceiptView, paper: PaperWidth) -> Result<Vec<u8>, ReceiptError> {
    let lines = layout_receipt(view, paper);
    let height = page_height_mm(lines.len());

    let (doc, page, layer) = PdfDocument::new(
        format!("Recu {}", view.invoice_number),
        Mm(paper.mm() as f32),
        Mm(height),
        "receipt",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let regular = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| ReceiptError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::CourierBold)
        .map_err(|e| ReceiptError::Pdf(e.to_string()))?;

    let x = left_margin_mm(paper);
    let mut y = height - MARGIN_TOP_MM;
    for line in &lines {
        let font = if line.bold { &bold } else { &regular };
        push_line(&layer, font, &line.text, x, y);
        y -= LINE_HEIGHT_MM;
    }

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| ReceiptError::Pdf(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| ReceiptError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::layout::ReceiptItem;
    use chrono::NaiveDate;
    use plus_shared::types::Currency;
    use rust_decimal_macros::dec;

    fn view(items: usize) -> ReceiptView {
        ReceiptView {
            tenant_name: "Boutique Lakay".to_string(),
            tenant_address: None,
            tenant_phone: None,
            tenant_nif: Some("000-111-222-3".to_string()),
            invoice_number: "FAC-2026-0042".to_string(),
            issued_at: NaiveDate::from_ymd_opt(2026, 3, 2)
                .unwrap()
                .and_hms_opt(9, 5, 0)
                .unwrap(),
            client_name: "Client comptoir".to_string(),
            currency: Currency::Usd,
            items: (0..items)
                .map(|i| ReceiptItem {
                    description: format!("Article {i}"),
                    quantity: 1,
                    unit_price: dec!(2.50),
                    total: dec!(2.50),
                })
                .collect(),
            subtotal: dec!(2.50),
            discount: dec!(0.50),
            tax_rate: dec!(0),
            tax: dec!(0),
            total: dec!(2.00),
            amount_paid: dec!(0),
            balance_due: dec!(2.00),
            footer: Some("Pas de retour apres 7 jours".to_string()),
        }
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render_receipt(&view(2), PaperWidth::Mm57).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_page_grows_with_items() {
        let short = layout_receipt(&view(1), PaperWidth::Mm80).len();
        let long = layout_receipt(&view(40), PaperWidth::Mm80).len();
        assert!(page_height_mm(long) > page_height_mm(short));
        assert!(page_height_mm(0) >= MIN_HEIGHT_MM);
    }
}
