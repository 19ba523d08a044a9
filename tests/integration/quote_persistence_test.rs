// Database-backed tests for the quote aggregate:
// - update replaces the full item set, leaving no residue rows
// - delete removes items with the header, unknown ids are not found
// - a rejected create persists nothing
// - number allocation survives the padding rollover (PRE-999 -> PRE-1000)

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use bottega::billing::LineItemInput;
use bottega::clients::{ClientInput, ClientRepository};
use bottega::core::{AppError, Result};
use bottega::delivery::{Mailer, OutgoingMail};
use bottega::invoices::InvoiceRepository;
use bottega::quotes::{QuoteDraft, QuoteRepository, QuoteService};
use bottega::settings::SettingsRepository;

mod database_setup;
use database_setup::setup_test_db;

/// Accepts every message; these tests never exercise delivery
struct NullMailer;

#[async_trait]
impl Mailer for NullMailer {
    async fn send(&self, _mail: OutgoingMail) -> Result<()> {
        Ok(())
    }
}

fn quote_service(pool: &PgPool) -> QuoteService {
    QuoteService::new(
        QuoteRepository::new(pool.clone()),
        InvoiceRepository::new(pool.clone()),
        ClientRepository::new(pool.clone()),
        SettingsRepository::new(pool.clone()),
        Arc::new(NullMailer),
        reqwest::Client::new(),
    )
}

async fn seed_client(pool: &PgPool, created_by: Uuid) -> Uuid {
    let client = ClientRepository::new(pool.clone())
        .create(
            ClientInput {
                name: "Rossi".to_string(),
                business_name: Some("Rossi SRL".to_string()),
                address: Some("Via Roma 1, Milano".to_string()),
                email: Some("rossi@example.it".to_string()),
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

fn item(description: &str, quantity: i64, price_cents: i64) -> LineItemInput {
    LineItemInput {
        description: description.to_string(),
        quantity: Some(Decimal::from(quantity)),
        unit_price: Some(Decimal::new(price_cents, 2)),
        vat_rate: None,
    }
}

fn draft(client_id: Uuid, items: Vec<LineItemInput>) -> QuoteDraft {
    QuoteDraft {
        client_id,
        issue_date: Utc::now().date_naive(),
        expiry_date: None,
        notes: None,
        tax_enabled: true,
        logo_url: None,
        font_size: Default::default(),
        footer_text: None,
        items,
    }
}

async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}

async fn renumber(pool: &PgPool, id: Uuid, number: &str, created_at: DateTime<Utc>) {
    sqlx::query("UPDATE quotes SET number = $2, created_at = $3 WHERE id = $1")
        .bind(id)
        .bind(number)
        .bind(created_at)
        .execute(pool)
        .await
        .expect("Failed to renumber quote");
}

#[tokio::test]
#[ignore] // Requires PostgreSQL connection
async fn test_update_replaces_the_full_item_set() {
    let db = setup_test_db().await;
    let user = Uuid::new_v4();
    let client_id = seed_client(&db.pool, user).await;
    let service = quote_service(&db.pool);

    let created = service
        .create(
            draft(
                client_id,
                vec![
                    item("Design", 1, 50_000),
                    item("Development", 10, 8_000),
                    item("Hosting", 12, 2_500),
                ],
            ),
            user,
        )
        .await
        .expect("Failed to create quote");
    assert_eq!(count_rows(&db.pool, "quote_items").await, 3);

    let updated = service
        .update(created.id, draft(client_id, vec![item("Retainer", 1, 120_000)]))
        .await
        .expect("Failed to update quote");
    assert_eq!(updated.items.len(), 1);

    // Exactly the new item set exists, no rows from the old one
    assert_eq!(count_rows(&db.pool, "quote_items").await, 1);
    let reloaded = service.get(created.id).await.expect("Failed to reload quote");
    assert_eq!(reloaded.items.len(), 1);
    assert_eq!(reloaded.items[0].description, "Retainer");
    assert_eq!(reloaded.subtotal, Decimal::new(120_000, 2));

    db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires PostgreSQL connection
async fn test_delete_removes_items_with_the_header() {
    let db = setup_test_db().await;
    let user = Uuid::new_v4();
    let client_id = seed_client(&db.pool, user).await;
    let service = quote_service(&db.pool);

    let created = service
        .create(
            draft(client_id, vec![item("Design", 1, 50_000), item("Hosting", 12, 2_500)]),
            user,
        )
        .await
        .expect("Failed to create quote");

    service.delete(created.id).await.expect("Failed to delete quote");

    assert_eq!(count_rows(&db.pool, "quotes").await, 0);
    assert_eq!(count_rows(&db.pool, "quote_items").await, 0);
    assert!(matches!(
        service.get(created.id).await,
        Err(AppError::NotFound(_))
    ));

    db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires PostgreSQL connection
async fn test_delete_unknown_quote_is_not_found() {
    let db = setup_test_db().await;
    let service = quote_service(&db.pool);

    let result = service.delete(Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires PostgreSQL connection
async fn test_rejected_create_persists_nothing() {
    let db = setup_test_db().await;
    let user = Uuid::new_v4();
    let client_id = seed_client(&db.pool, user).await;
    let service = quote_service(&db.pool);

    let result = service
        .create(
            draft(client_id, vec![item("Design", 1, 50_000), item("   ", 1, 100)]),
            user,
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    assert_eq!(count_rows(&db.pool, "quotes").await, 0);
    assert_eq!(count_rows(&db.pool, "quote_items").await, 0);

    db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires PostgreSQL connection
async fn test_number_allocation_at_padding_rollover() {
    let db = setup_test_db().await;
    let user = Uuid::new_v4();
    let client_id = seed_client(&db.pool, user).await;
    let service = quote_service(&db.pool);

    let first = service
        .create(draft(client_id, vec![item("Design", 1, 100)]), user)
        .await
        .expect("Failed to create first quote");
    let second = service
        .create(draft(client_id, vec![item("Hosting", 1, 100)]), user)
        .await
        .expect("Failed to create second quote");
    assert_eq!(first.number, "PRE-001");
    assert_eq!(second.number, "PRE-002");

    // Past the padded width with identical timestamps: PRE-1000 sorts
    // before PRE-999 lexicographically, but it is the latest number
    let stamp = Utc::now();
    renumber(&db.pool, first.id, "PRE-999", stamp).await;
    renumber(&db.pool, second.id, "PRE-1000", stamp).await;

    let third = service
        .create(draft(client_id, vec![item("Support", 1, 100)]), user)
        .await
        .expect("Failed to create third quote");
    assert_eq!(third.number, "PRE-1001");

    db.cleanup().await;
}
