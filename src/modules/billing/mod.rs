// Billing primitives shared by quotes and invoices: line items, the
// editable item list, document numbering, and the totals calculator.

pub mod models;
pub mod services;

pub use models::{
    format_number, next_number, seed_number, validated_items, ItemField, ItemList, LineItem,
    LineItemInput,
};
pub use services::{compute_totals, effective_rate, standard_rate, Totals};
