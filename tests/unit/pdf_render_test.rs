// End-to-end checks on the PDF renderer: output shape, layout variants and
// graceful degradation when optional inputs are missing. Rendering embeds a
// creation timestamp, so determinism is asserted structurally rather than
// byte for byte.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use bottega::billing::{compute_totals, standard_rate, LineItem};
use bottega::render::{render_document, ClientBlock, DocumentKind, DocumentView, FontSize};
use bottega::settings::CompanySettings;

fn sample_items(count: usize) -> Vec<LineItem> {
    (0..count)
        .map(|i| LineItem {
            description: format!("Consulting session {}", i + 1),
            quantity: Decimal::from(2),
            unit_price: Decimal::new(7550, 2),
            vat_rate: if i % 2 == 0 {
                None
            } else {
                Some(Decimal::from(22))
            },
        })
        .collect()
}

fn sample_view(kind: DocumentKind, items: Vec<LineItem>) -> DocumentView {
    let tax_rate = standard_rate();
    let totals = compute_totals(&items, tax_rate);
    DocumentView {
        kind,
        number: match kind {
            DocumentKind::Quote => "PRE-012".to_string(),
            DocumentKind::Invoice => "INV-003".to_string(),
        },
        issue_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        secondary_date: NaiveDate::from_ymd_opt(2025, 4, 14),
        client: ClientBlock {
            name: "Officina Meccanica Verdi".to_string(),
            address: Some("Via Garibaldi 42, 10122 Torino".to_string()),
            vat_number: Some("IT01234567890".to_string()),
        },
        items,
        totals,
        tax_rate,
        logo_url: None,
        font_size: FontSize::Medium,
        footer_text: Some("Payment within 30 days to IBAN IT60X0542811101000000123456".to_string()),
    }
}

fn sample_company() -> CompanySettings {
    CompanySettings {
        account_id: Uuid::new_v4(),
        company_name: "Studio Bianchi SRL".to_string(),
        address: Some("Corso Italia 7, 20122 Milano".to_string()),
        vat_number: Some("IT09876543210".to_string()),
        tax_code: Some("BNCMRA80A01F205X".to_string()),
        email: Some("studio@bianchi.it".to_string()),
        phone: Some("+39 02 1234567".to_string()),
        pec: None,
        sdi_code: None,
        updated_at: Utc::now(),
    }
}

#[test]
fn test_renders_valid_pdf_bytes() {
    let view = sample_view(DocumentKind::Quote, sample_items(3));
    let bytes = render_document(&view, &sample_company(), None).unwrap();

    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 1_000);
}

#[test]
fn test_invoice_and_quote_render() {
    for kind in [DocumentKind::Quote, DocumentKind::Invoice] {
        let view = sample_view(kind, sample_items(2));
        let bytes = render_document(&view, &sample_company(), None).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}

#[test]
fn test_missing_number_is_an_error() {
    let mut view = sample_view(DocumentKind::Quote, sample_items(1));
    view.number = String::new();
    assert!(render_document(&view, &sample_company(), None).is_err());

    view.number = "   ".to_string();
    assert!(render_document(&view, &sample_company(), None).is_err());
}

#[test]
fn test_same_input_renders_same_size() {
    let view = sample_view(DocumentKind::Invoice, sample_items(5));
    let company = sample_company();

    let first = render_document(&view, &company, None).unwrap();
    let second = render_document(&view, &company, None).unwrap();
    assert_eq!(first.len(), second.len());
}

#[test]
fn test_all_font_sizes_render() {
    for size in [FontSize::Small, FontSize::Medium, FontSize::Large] {
        let mut view = sample_view(DocumentKind::Quote, sample_items(4));
        view.font_size = size;
        let bytes = render_document(&view, &sample_company(), None).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}

#[test]
fn test_long_item_list_spills_to_more_pages() {
    let company = sample_company();

    let short = render_document(
        &sample_view(DocumentKind::Invoice, sample_items(2)),
        &company,
        None,
    )
    .unwrap();
    let long = render_document(
        &sample_view(DocumentKind::Invoice, sample_items(120)),
        &company,
        None,
    )
    .unwrap();

    // A hundred-plus rows cannot fit one A4 page; the output must grow
    assert!(long.len() > short.len());
    let page_markers = |bytes: &[u8]| {
        bytes
            .windows(b"/Page".len())
            .filter(|w| *w == b"/Page")
            .count()
    };
    assert!(page_markers(&long) > page_markers(&short));
}

#[test]
fn test_empty_company_profile_still_renders() {
    let view = sample_view(DocumentKind::Quote, sample_items(1));
    let company = CompanySettings::empty(Uuid::new_v4());
    let bytes = render_document(&view, &company, None).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_zero_tax_rate_renders_without_vat_line() {
    let items = sample_items(2);
    let totals = compute_totals(&items, Decimal::ZERO);
    let mut view = sample_view(DocumentKind::Quote, items);
    view.tax_rate = Decimal::ZERO;
    view.totals = totals;

    let bytes = render_document(&view, &sample_company(), None).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
