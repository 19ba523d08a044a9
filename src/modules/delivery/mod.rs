// Email delivery module

pub mod mailer;

pub use mailer::{
    build_message, delivery_body, resolve_recipient, MailAttachment, Mailer, OutgoingMail,
    SendDocumentRequest, SmtpMailer,
};
