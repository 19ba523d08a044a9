// Database-backed tests for the send workflow. Dispatch happens before
// the draft -> sent transition is persisted, so a failed dispatch must
// leave the stored quote untouched.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use bottega::billing::LineItemInput;
use bottega::clients::{ClientInput, ClientRepository};
use bottega::core::{AppError, Result};
use bottega::delivery::{Mailer, OutgoingMail, SendDocumentRequest};
use bottega::invoices::InvoiceRepository;
use bottega::quotes::{QuoteDraft, QuoteRepository, QuoteService, QuoteStatus};
use bottega::settings::SettingsRepository;

mod database_setup;
use database_setup::setup_test_db;

/// Accepts every message
struct NullMailer;

#[async_trait]
impl Mailer for NullMailer {
    async fn send(&self, _mail: OutgoingMail) -> Result<()> {
        Ok(())
    }
}

/// Refuses every message, like a relay that is down
struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _mail: OutgoingMail) -> Result<()> {
        Err(AppError::delivery("SMTP relay refused the connection"))
    }
}

fn quote_service(pool: &PgPool, mailer: Arc<dyn Mailer>) -> QuoteService {
    QuoteService::new(
        QuoteRepository::new(pool.clone()),
        InvoiceRepository::new(pool.clone()),
        ClientRepository::new(pool.clone()),
        SettingsRepository::new(pool.clone()),
        mailer,
        reqwest::Client::new(),
    )
}

async fn seed_client(pool: &PgPool, created_by: Uuid) -> Uuid {
    let client = ClientRepository::new(pool.clone())
        .create(
            ClientInput {
                name: "Bianchi".to_string(),
                business_name: None,
                address: None,
                email: Some("bianchi@example.it".to_string()),
                vat_number: None,
                tax_code: None,
                pec: None,
                sdi_code: None,
            },
            created_by,
        )
        .await
        .expect("Failed to create client");
    client.id
}

fn draft(client_id: Uuid) -> QuoteDraft {
    QuoteDraft {
        client_id,
        issue_date: Utc::now().date_naive(),
        expiry_date: None,
        notes: None,
        tax_enabled: true,
        logo_url: None,
        font_size: Default::default(),
        footer_text: None,
        items: vec![LineItemInput {
            description: "Consulting".to_string(),
            quantity: Some(Decimal::from(2)),
            unit_price: Some(Decimal::new(10_000, 2)),
            vat_rate: None,
        }],
    }
}

fn send_request() -> SendDocumentRequest {
    SendDocumentRequest {
        to: None,
        subject: None,
        message: None,
    }
}

#[tokio::test]
#[ignore] // Requires PostgreSQL connection
async fn test_failed_dispatch_leaves_quote_draft() {
    let db = setup_test_db().await;
    let user = Uuid::new_v4();
    let client_id = seed_client(&db.pool, user).await;
    let service = quote_service(&db.pool, Arc::new(FailingMailer));

    let quote = service
        .create(draft(client_id), user)
        .await
        .expect("Failed to create quote");
    assert_eq!(quote.status, QuoteStatus::Draft);

    let result = service.send(quote.id, send_request(), user).await;
    assert!(matches!(result, Err(AppError::Delivery(_))));

    let reloaded = service.get(quote.id).await.expect("Failed to reload quote");
    assert_eq!(reloaded.status, QuoteStatus::Draft);

    db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires PostgreSQL connection
async fn test_successful_dispatch_marks_quote_sent() {
    let db = setup_test_db().await;
    let user = Uuid::new_v4();
    let client_id = seed_client(&db.pool, user).await;
    let service = quote_service(&db.pool, Arc::new(NullMailer));

    let quote = service
        .create(draft(client_id), user)
        .await
        .expect("Failed to create quote");

    let sent = service
        .send(quote.id, send_request(), user)
        .await
        .expect("Failed to send quote");
    assert_eq!(sent.status, QuoteStatus::Sent);

    let reloaded = service.get(quote.id).await.expect("Failed to reload quote");
    assert_eq!(reloaded.status, QuoteStatus::Sent);

    db.cleanup().await;
}
