// A line item is one billable row in a quote or invoice: description,
// quantity, unit price, and an optional per-line VAT rate annotation.
// Line items are created transiently while a document is edited and are
// persisted only as children of their document.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Largest quantity the NUMERIC(14,3) column can hold.
fn max_quantity() -> Decimal {
    Decimal::new(99_999_999_999_999, 3)
}

/// Largest unit price the NUMERIC(14,2) column can hold.
fn max_unit_price() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

/// One billable row within a quote or invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Description of the product or service
    pub description: String,

    /// Quantity, may be fractional (e.g. hours)
    pub quantity: Decimal,

    /// Price per unit
    pub unit_price: Decimal,

    /// Per-line VAT rate annotation (percentage, 0-100). Printed on the
    /// document row; the document-level rate is authoritative for totals.
    pub vat_rate: Option<Decimal>,
}

/// Incoming line item fields as edited in the form. Missing numeric fields
/// take the row defaults (quantity 1, price 0).
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemInput {
    pub description: String,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub vat_rate: Option<Decimal>,
}

impl LineItem {
    /// New row with form defaults: quantity 1, unit price 0
    pub fn with_defaults() -> Self {
        Self {
            description: String::new(),
            quantity: Decimal::ONE,
            unit_price: Decimal::ZERO,
            vat_rate: None,
        }
    }

    pub fn from_input(input: LineItemInput) -> Self {
        Self {
            description: input.description,
            quantity: input.quantity.unwrap_or(Decimal::ONE),
            unit_price: input.unit_price.unwrap_or(Decimal::ZERO),
            vat_rate: input.vat_rate,
        }
    }

    /// Derived line total: quantity x unit price. Rounding happens at
    /// display time, not here.
    pub fn line_total(&self) -> Decimal {
        self.quantity * self.unit_price
    }

    /// Validation applied before an aggregate write. Field-level edits are
    /// not validated; submission is.
    pub fn validate_for_submit(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(AppError::validation(
                "Line item description cannot be empty",
            ));
        }

        if self.quantity < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Quantity must be non-negative, got: {}",
                self.quantity
            )));
        }

        if self.quantity > max_quantity() {
            return Err(AppError::validation(format!(
                "Quantity exceeds the maximum of {}, got: {}",
                max_quantity(),
                self.quantity
            )));
        }

        if self.unit_price < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Unit price must be non-negative, got: {}",
                self.unit_price
            )));
        }

        if self.unit_price > max_unit_price() {
            return Err(AppError::validation(format!(
                "Unit price exceeds the maximum of {}, got: {}",
                max_unit_price(),
                self.unit_price
            )));
        }

        if let Some(rate) = self.vat_rate {
            if rate < Decimal::ZERO || rate > Decimal::from(100) {
                return Err(AppError::validation(format!(
                    "VAT rate must be between 0 and 100, got: {}",
                    rate
                )));
            }
        }

        Ok(())
    }
}
