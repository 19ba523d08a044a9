// Status lifecycle enforcement for quotes and invoices: every edge outside
// the transition tables must be rejected, and rejection must not mutate
// the aggregate.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use bottega::invoices::{Invoice, InvoiceStatus, PaymentStatus};
use bottega::quotes::{Quote, QuoteStatus};

fn quote_with_status(status: QuoteStatus) -> Quote {
    let now = Utc::now();
    Quote {
        id: Uuid::new_v4(),
        number: "PRE-001".to_string(),
        client_id: Uuid::new_v4(),
        issue_date: now.date_naive(),
        expiry_date: None,
        notes: None,
        status,
        subtotal: Decimal::ZERO,
        tax_rate: Decimal::ZERO,
        tax_amount: Decimal::ZERO,
        total: Decimal::ZERO,
        logo_url: None,
        font_size: Default::default(),
        footer_text: None,
        converted_invoice_id: None,
        created_by: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
        items: vec![],
    }
}

fn invoice_with_status(status: InvoiceStatus) -> Invoice {
    let now = Utc::now();
    Invoice {
        id: Uuid::new_v4(),
        number: "INV-001".to_string(),
        client_id: Uuid::new_v4(),
        issue_date: now.date_naive(),
        due_date: None,
        notes: None,
        status,
        payment_status: PaymentStatus::Pending,
        subtotal: Decimal::ZERO,
        tax_rate: Decimal::ZERO,
        tax_amount: Decimal::ZERO,
        total: Decimal::ZERO,
        logo_url: None,
        font_size: Default::default(),
        footer_text: None,
        quote_id: None,
        created_by: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
        items: vec![],
    }
}

const QUOTE_STATUSES: [QuoteStatus; 4] = [
    QuoteStatus::Draft,
    QuoteStatus::Sent,
    QuoteStatus::Accepted,
    QuoteStatus::Rejected,
];

const INVOICE_STATUSES: [InvoiceStatus; 4] = [
    InvoiceStatus::Draft,
    InvoiceStatus::Sent,
    InvoiceStatus::Paid,
    InvoiceStatus::Overdue,
];

#[test]
fn test_quote_allowed_edges() {
    for (from, to) in [
        (QuoteStatus::Draft, QuoteStatus::Sent),
        (QuoteStatus::Sent, QuoteStatus::Accepted),
        (QuoteStatus::Sent, QuoteStatus::Rejected),
    ] {
        let mut quote = quote_with_status(from);
        quote.transition_status(to).unwrap();
        assert_eq!(quote.status, to);
    }
}

#[test]
fn test_quote_terminal_states_have_no_exits() {
    for terminal in [QuoteStatus::Accepted, QuoteStatus::Rejected] {
        for next in QUOTE_STATUSES {
            let mut quote = quote_with_status(terminal);
            assert!(quote.transition_status(next).is_err());
            assert_eq!(quote.status, terminal);
        }
    }
}

#[test]
fn test_quote_cannot_skip_sent() {
    let mut quote = quote_with_status(QuoteStatus::Draft);
    assert!(quote.transition_status(QuoteStatus::Accepted).is_err());
    assert!(quote.transition_status(QuoteStatus::Rejected).is_err());
    assert_eq!(quote.status, QuoteStatus::Draft);
}

#[test]
fn test_invoice_allowed_edges() {
    for (from, to) in [
        (InvoiceStatus::Draft, InvoiceStatus::Sent),
        (InvoiceStatus::Sent, InvoiceStatus::Paid),
        (InvoiceStatus::Sent, InvoiceStatus::Overdue),
        (InvoiceStatus::Overdue, InvoiceStatus::Paid),
    ] {
        let mut invoice = invoice_with_status(from);
        invoice.transition_status(to).unwrap();
        assert_eq!(invoice.status, to);
    }
}

#[test]
fn test_invoice_paid_is_terminal() {
    for next in INVOICE_STATUSES {
        let mut invoice = invoice_with_status(InvoiceStatus::Paid);
        assert!(invoice.transition_status(next).is_err());
        assert_eq!(invoice.status, InvoiceStatus::Paid);
    }
}

#[test]
fn test_invoice_cannot_regress() {
    for status in [InvoiceStatus::Sent, InvoiceStatus::Paid, InvoiceStatus::Overdue] {
        let mut invoice = invoice_with_status(status);
        assert!(invoice.transition_status(InvoiceStatus::Draft).is_err());
    }

    let mut invoice = invoice_with_status(InvoiceStatus::Overdue);
    assert!(invoice.transition_status(InvoiceStatus::Sent).is_err());
}

#[test]
fn test_self_transitions_rejected() {
    for status in QUOTE_STATUSES {
        let mut quote = quote_with_status(status);
        assert!(quote.transition_status(status).is_err());
    }
    for status in INVOICE_STATUSES {
        let mut invoice = invoice_with_status(status);
        assert!(invoice.transition_status(status).is_err());
    }
}
