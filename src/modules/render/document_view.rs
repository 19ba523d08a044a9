// Renderer-neutral projection of a fully-populated aggregate. Quotes and
// invoices map into this shape so the PDF layout code has a single input.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::modules::billing::{LineItem, Totals};
use crate::modules::clients::Client;

use super::font_size::FontSize;

/// Which aggregate the document came from; controls the title and the
/// label of the secondary date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Quote,
    Invoice,
}

impl DocumentKind {
    pub fn title(self) -> &'static str {
        match self {
            DocumentKind::Quote => "QUOTE",
            DocumentKind::Invoice => "INVOICE",
        }
    }

    pub fn secondary_date_label(self) -> &'static str {
        match self {
            DocumentKind::Quote => "Valid until",
            DocumentKind::Invoice => "Due date",
        }
    }
}

/// Client details as printed on the document
#[derive(Debug, Clone)]
pub struct ClientBlock {
    pub name: String,
    pub address: Option<String>,
    pub vat_number: Option<String>,
}

impl From<&Client> for ClientBlock {
    fn from(client: &Client) -> Self {
        Self {
            name: client.display_name().to_string(),
            address: client.address.clone(),
            vat_number: client.vat_number.clone(),
        }
    }
}

/// Everything the renderer needs, independent of persistence
#[derive(Debug, Clone)]
pub struct DocumentView {
    pub kind: DocumentKind,
    pub number: String,
    pub issue_date: NaiveDate,
    pub secondary_date: Option<NaiveDate>,
    pub client: ClientBlock,
    pub items: Vec<LineItem>,
    pub totals: Totals,
    pub tax_rate: Decimal,
    pub logo_url: Option<String>,
    pub font_size: FontSize,
    pub footer_text: Option<String>,
}
