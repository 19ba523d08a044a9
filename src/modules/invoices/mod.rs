// Invoice aggregate: drafting, rendering, delivery, the status lifecycle
// and payment bookkeeping.

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{
    Invoice, InvoiceDraft, InvoiceStatus, PaymentStatus, SetInvoiceStatusRequest,
    SetPaymentStatusRequest,
};
pub use repositories::InvoiceRepository;
pub use services::InvoiceService;
