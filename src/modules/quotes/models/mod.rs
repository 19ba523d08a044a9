pub mod quote;

pub use quote::{Quote, QuoteDraft, QuoteStatus, SetQuoteStatusRequest, QUOTE_NUMBER_PREFIX};
