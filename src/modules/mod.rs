pub mod billing;
pub mod clients;
pub mod delivery;
pub mod invoices;
pub mod quotes;
pub mod render;
pub mod settings;
