// Message construction for document delivery: addressing rules, defaulted
// bodies and the PDF attachment layout. The SMTP transport itself is not
// exercised here.

use bottega::delivery::{
    build_message, delivery_body, resolve_recipient, MailAttachment, OutgoingMail,
};

fn sample_mail() -> OutgoingMail {
    OutgoingMail {
        to: "cliente@example.it".to_string(),
        subject: "Quote PRE-009 from Studio Bianchi".to_string(),
        html_body: "<p>Please find attached quote PRE-009.</p>".to_string(),
        attachment: Some(MailAttachment {
            filename: "PRE-009.pdf".to_string(),
            bytes: b"%PDF-1.4 fake".to_vec(),
        }),
    }
}

#[test]
fn test_builds_message_with_pdf_attachment() {
    let message = build_message("billing@bianchi.it", &sample_mail()).unwrap();
    let formatted = String::from_utf8_lossy(&message.formatted()).to_string();

    assert!(formatted.contains("From: billing@bianchi.it"));
    assert!(formatted.contains("To: cliente@example.it"));
    assert!(formatted.contains("Subject: Quote PRE-009 from Studio Bianchi"));
    assert!(formatted.contains("multipart/mixed"));
    assert!(formatted.contains("application/pdf"));
    assert!(formatted.contains("PRE-009.pdf"));
}

#[test]
fn test_builds_plain_html_message_without_attachment() {
    let mut mail = sample_mail();
    mail.attachment = None;

    let message = build_message("billing@bianchi.it", &mail).unwrap();
    let formatted = String::from_utf8_lossy(&message.formatted()).to_string();

    assert!(formatted.contains("text/html"));
    assert!(!formatted.contains("multipart/mixed"));
}

#[test]
fn test_empty_recipient_is_rejected() {
    let mut mail = sample_mail();
    mail.to = String::new();
    assert!(build_message("billing@bianchi.it", &mail).is_err());

    mail.to = "   ".to_string();
    assert!(build_message("billing@bianchi.it", &mail).is_err());
}

#[test]
fn test_invalid_addresses_are_rejected() {
    let mut mail = sample_mail();
    mail.to = "not-an-address".to_string();
    assert!(build_message("billing@bianchi.it", &mail).is_err());

    let mail = sample_mail();
    assert!(build_message("not an address", &mail).is_err());
}

#[test]
fn test_resolve_recipient_prefers_explicit_address() {
    let to = resolve_recipient(Some("a@b.it".to_string()), Some("c@d.it")).unwrap();
    assert_eq!(to, "a@b.it");
}

#[test]
fn test_resolve_recipient_falls_back_to_stored_address() {
    let to = resolve_recipient(None, Some("c@d.it")).unwrap();
    assert_eq!(to, "c@d.it");

    let to = resolve_recipient(Some("  ".to_string()), Some("c@d.it")).unwrap();
    assert_eq!(to, "c@d.it");
}

#[test]
fn test_resolve_recipient_requires_an_address() {
    assert!(resolve_recipient(None, None).is_err());
    assert!(resolve_recipient(Some(String::new()), None).is_err());
}

#[test]
fn test_delivery_body_defaults_and_overrides() {
    let body = delivery_body(None, "quote", "PRE-001");
    assert!(body.contains("quote PRE-001"));

    let body = delivery_body(Some("  "), "invoice", "INV-001");
    assert!(body.contains("invoice INV-001"));

    let body = delivery_body(Some("Hi, here is the paperwork."), "quote", "PRE-001");
    assert_eq!(body, "<p>Hi, here is the paperwork.</p>");
}
