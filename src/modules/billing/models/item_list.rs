use rust_decimal::Decimal;

use crate::core::{AppError, Result};

use super::line_item::{LineItem, LineItemInput};

/// Field selector for positional line item updates
#[derive(Debug, Clone, PartialEq)]
pub enum ItemField {
    Description(String),
    Quantity(Decimal),
    UnitPrice(Decimal),
    VatRate(Option<Decimal>),
}

/// The editable collection of line items backing a document form.
/// Supports append-with-defaults, guarded removal, and field-level update
/// by position. The collection never becomes empty through removal.
#[derive(Debug, Clone, Default)]
pub struct ItemList {
    items: Vec<LineItem>,
}

impl ItemList {
    /// Starts with a single default row, matching the form's initial state
    pub fn new() -> Self {
        Self {
            items: vec![LineItem::with_defaults()],
        }
    }

    pub fn from_inputs(inputs: Vec<LineItemInput>) -> Self {
        Self {
            items: inputs.into_iter().map(LineItem::from_input).collect(),
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a new row with defaults (quantity 1, price 0)
    pub fn append(&mut self) -> &mut LineItem {
        self.items.push(LineItem::with_defaults());
        self.items.last_mut().unwrap()
    }

    /// Remove the row at `position`. The last remaining row cannot be
    /// removed.
    pub fn remove(&mut self, position: usize) -> Result<()> {
        if position >= self.items.len() {
            return Err(AppError::validation(format!(
                "No line item at position {}",
                position
            )));
        }
        if self.items.len() == 1 {
            return Err(AppError::validation(
                "A document must keep at least one line item",
            ));
        }
        self.items.remove(position);
        Ok(())
    }

    /// Update one field of the row at `position`
    pub fn update(&mut self, position: usize, field: ItemField) -> Result<()> {
        let item = self.items.get_mut(position).ok_or_else(|| {
            AppError::validation(format!("No line item at position {}", position))
        })?;

        match field {
            ItemField::Description(value) => item.description = value,
            ItemField::Quantity(value) => item.quantity = value,
            ItemField::UnitPrice(value) => item.unit_price = value,
            ItemField::VatRate(value) => item.vat_rate = value,
        }

        Ok(())
    }

    /// Validate the whole set for submission: every row needs a non-empty
    /// description and non-negative numbers.
    pub fn validate_for_submit(&self) -> Result<()> {
        for item in &self.items {
            item.validate_for_submit()?;
        }
        Ok(())
    }
}

/// Parse and validate a submitted item set in one step
pub fn validated_items(inputs: Vec<LineItemInput>) -> Result<Vec<LineItem>> {
    let list = ItemList::from_inputs(inputs);
    list.validate_for_submit()?;
    Ok(list.into_items())
}
