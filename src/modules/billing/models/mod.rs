mod document_number;
mod item_list;
mod line_item;

pub use document_number::{format_number, next_number, seed_number};
pub use item_list::{validated_items, ItemField, ItemList};
pub use line_item::{LineItem, LineItemInput};
