// Document delivery over SMTP. Dispatch is attempted before any status
// change is persisted; a failure surfaces to the caller and the document
// stays in its prior state. There is no retry.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;

use crate::config::SmtpConfig;
use crate::core::{AppError, Result};

/// Send-by-email request shared by the quote and invoice endpoints; the
/// recipient falls back to the client's stored address
#[derive(Debug, Clone, Deserialize)]
pub struct SendDocumentRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// A rendered document attached to an outgoing message
#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// One outgoing email
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachment: Option<MailAttachment>,
}

/// Email dispatch seam; the SMTP implementation is swapped out in tests
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let credentials = Credentials::new(config.user.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AppError::Configuration(format!("Failed to create SMTP relay: {}", e)))?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }
}

/// Picks the recipient: an explicit address wins, otherwise the client's
/// stored one; no address at all is a validation error.
pub fn resolve_recipient(requested: Option<String>, fallback: Option<&str>) -> Result<String> {
    let recipient = requested
        .filter(|to| !to.trim().is_empty())
        .or_else(|| fallback.map(str::to_string))
        .unwrap_or_default();

    if recipient.trim().is_empty() {
        return Err(AppError::validation(
            "No recipient: provide one or set the client's email address",
        ));
    }
    Ok(recipient)
}

/// HTML body for a document email, defaulting when no message was given
pub fn delivery_body(message: Option<&str>, kind: &str, number: &str) -> String {
    match message {
        Some(text) if !text.trim().is_empty() => format!("<p>{}</p>", text),
        _ => format!("<p>Please find attached {} {}.</p>", kind, number),
    }
}

/// Builds the lettre message: HTML body, optionally with a PDF attachment
pub fn build_message(from_address: &str, mail: &OutgoingMail) -> Result<Message> {
    if mail.to.trim().is_empty() {
        return Err(AppError::validation("Recipient email address is required"));
    }

    let from_mailbox: Mailbox = from_address
        .parse()
        .map_err(|_| AppError::Configuration("Invalid SMTP from address".to_string()))?;
    let to_mailbox: Mailbox = mail
        .to
        .parse()
        .map_err(|_| AppError::validation("Invalid recipient email address"))?;

    let builder = Message::builder()
        .from(from_mailbox)
        .to(to_mailbox)
        .subject(&mail.subject);

    let html_part = SinglePart::builder()
        .header(ContentType::TEXT_HTML)
        .body(mail.html_body.clone());

    let message = match &mail.attachment {
        Some(attachment) => {
            let pdf_part = Attachment::new(attachment.filename.clone()).body(
                attachment.bytes.clone(),
                ContentType::parse("application/pdf")
                    .map_err(|e| AppError::internal(e.to_string()))?,
            );
            builder
                .multipart(MultiPart::mixed().singlepart(html_part).singlepart(pdf_part))
                .map_err(|e| AppError::delivery(format!("Failed to build email: {}", e)))?
        }
        None => builder
            .singlepart(html_part)
            .map_err(|e| AppError::delivery(format!("Failed to build email: {}", e)))?,
    };

    Ok(message)
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        let message = build_message(&self.from_address, &mail)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::delivery(format!("Failed to send email: {}", e)))?;

        tracing::info!(to = %mail.to, subject = %mail.subject, "Document email sent");
        Ok(())
    }
}
