// Totals derivation for quotes and invoices. Pure and synchronous: the
// caller recomputes on every edit and persists the result alongside the
// header, so stored totals stay consistent with the item set at every write.
//
// One document-level rate is authoritative for money. Per-line vat_rate
// values are carried as annotations for the rendered row but do not feed
// tax_amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::money::round2;
use crate::modules::billing::models::LineItem;

/// Document-level VAT rate applied when tax is enabled (Italian IVA)
pub fn standard_rate() -> Decimal {
    Decimal::from(22)
}

/// Maps the form's tax-enabled flag to the document-level rate
pub fn effective_rate(tax_enabled: bool) -> Decimal {
    if tax_enabled {
        standard_rate()
    } else {
        Decimal::ZERO
    }
}

/// Derived document totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

impl Totals {
    pub fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}

/// Computes subtotal, tax amount, and grand total for an item set.
///
/// subtotal = sum(quantity * unit_price), rounded to two decimals
/// tax_amount = subtotal * rate / 100, rounded to two decimals
/// total = subtotal + tax_amount
///
/// An empty item set yields all zeros.
pub fn compute_totals(items: &[LineItem], tax_rate: Decimal) -> Totals {
    let raw_subtotal: Decimal = items.iter().map(|item| item.line_total()).sum();
    let subtotal = round2(raw_subtotal);
    let tax_amount = round2(subtotal * tax_rate / Decimal::from(100));
    let total = subtotal + tax_amount;

    Totals {
        subtotal,
        tax_amount,
        total,
    }
}
