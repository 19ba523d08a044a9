//! Bottega Billing Service Library
//!
//! This library provides quote and invoice management for small businesses:
//! line-item totals, PDF rendering and delivery by email.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use modules::billing;
pub use modules::clients;
pub use modules::delivery;
pub use modules::invoices;
pub use modules::quotes;
pub use modules::render;
pub use modules::settings;
