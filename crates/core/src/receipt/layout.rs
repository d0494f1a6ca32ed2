//! Fixed-width receipt layout.

use chrono::NaiveDateTime;
use plus_shared::types::Currency;
use plus_shared::types::money::round_money;
use rust_decimal::Decimal;

use crate::error::BillingError;

/// Supported roll widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperWidth {
    /// 80 mm roll.
    #[default]
    Mm80,
    /// 57 mm roll.
    Mm57,
}

impl PaperWidth {
    /// Parses a width in millimetres.
    pub fn from_mm(mm: i32) -> Result<Self, BillingError> {
        match mm {
            80 => Ok(Self::Mm80),
            57 | 58 => Ok(Self::Mm57),
            _ => Err(BillingError::validation(format!(
                "unsupported receipt width {mm} mm (use 80 or 57)"
            ))),
        }
    }

    /// Paper width in millimetres.
    #[must_use]
    pub const fn mm(self) -> i32 {
        match self {
            Self::Mm80 => 80,
            Self::Mm57 => 57,
        }
    }

    /// Monospace characters per line at the receipt font size.
    #[must_use]
    pub const fn columns(self) -> usize {
        match self {
            Self::Mm80 => 42,
            Self::Mm57 => 28,
        }
    }
}

/// One printed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptItem {
    /// Item label.
    pub description: String,
    /// Units sold.
    pub quantity: i32,
    /// Unit price in the invoice currency.
    pub unit_price: Decimal,
    /// Line total in the invoice currency.
    pub total: Decimal,
}

/// Everything printed on a receipt, already in the invoice currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptView {
    /// Shop name.
    pub tenant_name: String,
    /// Shop address.
    pub tenant_address: Option<String>,
    /// Shop phone.
    pub tenant_phone: Option<String>,
    /// Shop tax number.
    pub tenant_nif: Option<String>,
    /// Invoice number.
    pub invoice_number: String,
    /// Issue time in the business timezone.
    pub issued_at: NaiveDateTime,
    /// Client name from the snapshot.
    pub client_name: String,
    /// Currency every amount below is expressed in.
    pub currency: Currency,
    /// Lines.
    pub items: Vec<ReceiptItem>,
    /// Subtotal.
    pub subtotal: Decimal,
    /// Discount.
    pub discount: Decimal,
    /// Tax rate in percent.
    pub tax_rate: Decimal,
    /// Tax.
    pub tax: Decimal,
    /// Total.
    pub total: Decimal,
    /// Paid so far.
    pub amount_paid: Decimal,
    /// Remaining balance.
    pub balance_due: Decimal,
    /// Tenant footer text.
    pub footer: Option<String>,
}

/// One printed text line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLine {
    /// Text, at most `columns` characters.
    pub text: String,
    /// Printed in bold.
    pub bold: bool,
}

impl ReceiptLine {
    fn plain(text: String) -> Self {
        Self { text, bold: false }
    }

    fn bold(text: String) -> Self {
        Self { text, bold: true }
    }
}

/// Formats an amount with 2 decimals and comma thousands separators.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let fixed = format!("{:.2}", round_money(amount.abs()));
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{dec_part}")
}

/// Greedy word wrap; words longer than `width` are split.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let current_len = current.chars().count();
        if current_len > 0 && current_len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    format!("{}{text}", " ".repeat((width - len) / 2))
}

fn two_columns(left: &str, right: &str, width: usize) -> String {
    let used = left.chars().count() + right.chars().count();
    let gap = width.saturating_sub(used).max(1);
    format!("{left}{}{right}", " ".repeat(gap))
}

/// Lays out a receipt for the given paper width.
#[must_use]
pub fn layout_receipt(view: &ReceiptView, paper: PaperWidth) -> Vec<ReceiptLine> {
    let width = paper.columns();
    let rule = "-".repeat(width);
    let mut lines = Vec::new();

    for part in wrap_text(&view.tenant_name, width) {
        lines.push(ReceiptLine::bold(center(&part, width)));
    }
    let contact = [
        view.tenant_address.clone(),
        view.tenant_phone.as_ref().map(|p| format!("Tel: {p}")),
        view.tenant_nif.as_ref().map(|n| format!("NIF: {n}")),
    ];
    for value in contact.into_iter().flatten() {
        for part in wrap_text(&value, width) {
            lines.push(ReceiptLine::plain(center(&part, width)));
        }
    }

    lines.push(ReceiptLine::plain(rule.clone()));
    lines.push(ReceiptLine::bold(format!("Facture {}", view.invoice_number)));
    lines.push(ReceiptLine::plain(format!(
        "Date: {}",
        view.issued_at.format("%d/%m/%Y %H:%M")
    )));
    for part in wrap_text(&format!("Client: {}", view.client_name), width) {
        lines.push(ReceiptLine::plain(part));
    }
    lines.push(ReceiptLine::plain(rule.clone()));

    for item in &view.items {
        for part in wrap_text(&item.description, width) {
            lines.push(ReceiptLine::plain(part));
        }
        lines.push(ReceiptLine::plain(two_columns(
            &format!("  {} x {}", item.quantity, format_amount(item.unit_price)),
            &format_amount(item.total),
            width,
        )));
    }
    lines.push(ReceiptLine::plain(rule.clone()));

    lines.push(ReceiptLine::plain(two_columns(
        "Sous-total",
        &format_amount(view.subtotal),
        width,
    )));
    if !view.discount.is_zero() {
        lines.push(ReceiptLine::plain(two_columns(
            "Remise",
            &format!("-{}", format_amount(view.discount)),
            width,
        )));
    }
    if !view.tax.is_zero() {
        lines.push(ReceiptLine::plain(two_columns(
            &format!("Taxe {}%", view.tax_rate.normalize()),
            &format_amount(view.tax),
            width,
        )));
    }
    lines.push(ReceiptLine::bold(two_columns(
        &format!("TOTAL {}", view.currency),
        &format_amount(view.total),
        width,
    )));
    lines.push(ReceiptLine::plain(two_columns(
        "Paye",
        &format_amount(view.amount_paid),
        width,
    )));
    lines.push(ReceiptLine::plain(two_columns(
        "Solde",
        &format_amount(view.balance_due),
        width,
    )));
    lines.push(ReceiptLine::plain(rule));

    let footer = view
        .footer
        .as_deref()
        .filter(|f| !f.trim().is_empty())
        .unwrap_or("Merci pour votre visite!");
    for text in footer.lines() {
        for part in wrap_text(text, width) {
            lines.push(ReceiptLine::plain(center(&part, width)));
        }
    }

    lines
}
