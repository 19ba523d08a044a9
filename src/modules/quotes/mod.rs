// Quote aggregate: drafting, rendering, delivery, status lifecycle and
// conversion into invoices.

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Quote, QuoteDraft, QuoteStatus, SetQuoteStatusRequest};
pub use repositories::QuoteRepository;
pub use services::QuoteService;
