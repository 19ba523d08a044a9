pub mod invoice;

pub use invoice::{
    Invoice, InvoiceDraft, InvoiceStatus, PaymentStatus, SetInvoiceStatusRequest,
    SetPaymentStatusRequest, INVOICE_NUMBER_PREFIX,
};
