// PDF assembly for quotes and invoices. Single pass over a DocumentView,
// top to bottom, with automatic page breaks in the item table. Output is a
// byte stream; the HTTP layer decides the download filename.
//
// Layout order: title + number, optional logo, company block mirrored by
// the date block, client block, item table with alternating row shading,
// right-aligned totals, optional footer text, signature rule.

use std::io::BufWriter;

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rect, Rgb,
};
use rust_decimal::Decimal;

use crate::core::money::{format_currency, format_rate};
use crate::core::{AppError, Result};
use crate::modules::settings::CompanySettings;

use super::document_view::DocumentView;
use super::logo::LogoImage;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 195.0;
const BOTTOM_LIMIT: f32 = 25.0;

const TITLE_SIZE: f32 = 22.0;
const SECTION_SIZE: f32 = 12.0;

// Item table column x positions (mm)
const COL_DESCRIPTION: f32 = 15.0;
const COL_QUANTITY: f32 = 105.0;
const COL_UNIT_PRICE: f32 = 125.0;
const COL_VAT: f32 = 152.0;
const COL_LINE_TOTAL: f32 = 168.0;

/// Point-to-mm factor for the width estimate used in right alignment
const PT_TO_MM: f32 = 0.3528;

struct Page {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    body_size: f32,
    y: f32,
}

impl Page {
    fn text(&self, text: &str, size: f32, bold: bool, x: f32, y: f32) {
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    /// Right-aligned text based on an average Helvetica glyph width.
    /// Exact metrics are not available for built-in fonts.
    fn text_right(&self, text: &str, size: f32, bold: bool, right_edge: f32, y: f32) {
        let width = text.chars().count() as f32 * size * 0.5 * PT_TO_MM;
        self.text(text, size, bold, right_edge - width, y);
    }

    fn hline(&self, y: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_LEFT), Mm(y)), false),
                (Point::new(Mm(MARGIN_RIGHT), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    /// Fills a full-width band behind a table row, then restores the text
    /// fill color.
    fn shade_band(&self, top: f32, height: f32) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.93, 0.93, 0.93, None)));
        self.layer.add_rect(
            Rect::new(Mm(MARGIN_LEFT), Mm(top - height), Mm(MARGIN_RIGHT), Mm(top))
                .with_mode(PaintMode::Fill),
        );
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    }

    fn break_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - 15.0;
    }

    fn row_height(&self) -> f32 {
        self.body_size * 0.6
    }
}

/// Renders a document to PDF bytes. The logo is optional; a missing or
/// undecodable image degrades to a document without one.
pub fn render_document(
    view: &DocumentView,
    company: &CompanySettings,
    logo: Option<&LogoImage>,
) -> Result<Vec<u8>> {
    if view.number.trim().is_empty() {
        return Err(AppError::render("Document has no number"));
    }

    let title = format!("{} {}", view.kind.title(), view.number);
    let (doc, page1, layer1) = PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::render(e.to_string()))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::render(e.to_string()))?;

    let mut page = Page {
        doc,
        layer,
        font,
        font_bold,
        body_size: view.font_size.body_points(),
        y: PAGE_HEIGHT - 15.0,
    };

    draw_title(&mut page, view);
    if let Some(logo) = logo {
        embed_logo(&page, logo);
    }
    draw_company_and_dates(&mut page, view, company);
    draw_client_block(&mut page, view);
    draw_item_table(&mut page, view);
    draw_totals(&mut page, view);
    draw_footer(&mut page, view);
    draw_signature(&mut page);

    let mut writer = BufWriter::new(Vec::<u8>::new());
    page.doc
        .save(&mut writer)
        .map_err(|e| AppError::render(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| AppError::render(e.to_string()))
}

fn draw_title(page: &mut Page, view: &DocumentView) {
    page.text(view.kind.title(), TITLE_SIZE, true, MARGIN_LEFT, page.y);
    page.y -= 8.0;
    page.text(&view.number, SECTION_SIZE, true, MARGIN_LEFT, page.y);
    page.y -= 10.0;
}

fn embed_logo(page: &Page, logo: &LogoImage) {
    // Decode failures degrade to a document without the logo
    let Some(image) = logo.decode() else {
        tracing::warn!("Logo image could not be decoded, rendering without it");
        return;
    };

    image.add_to_layer(
        page.layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(155.0)),
            translate_y: Some(Mm(PAGE_HEIGHT - 35.0)),
            dpi: Some(300.0),
            ..Default::default()
        },
    );
}

fn draw_company_and_dates(page: &mut Page, view: &DocumentView, company: &CompanySettings) {
    let size = page.body_size;
    let block_top = page.y;

    // Company block, left
    page.text(&company.company_name, SECTION_SIZE, true, MARGIN_LEFT, page.y);
    page.y -= 6.0;
    if let Some(address) = &company.address {
        page.text(address, size, false, MARGIN_LEFT, page.y);
        page.y -= 5.0;
    }
    if let Some(vat) = &company.vat_number {
        page.text(&format!("VAT {}", vat), size, false, MARGIN_LEFT, page.y);
        page.y -= 5.0;
    }
    if let Some(tax_code) = &company.tax_code {
        page.text(
            &format!("Tax code {}", tax_code),
            size,
            false,
            MARGIN_LEFT,
            page.y,
        );
        page.y -= 5.0;
    }
    for contact in [company.email.as_deref(), company.phone.as_deref()]
        .into_iter()
        .flatten()
    {
        page.text(contact, size, false, MARGIN_LEFT, page.y);
        page.y -= 5.0;
    }

    // Date block, right, mirrored at the same starting height
    let mut right_y = block_top;
    page.text(
        &format!("Date: {}", view.issue_date.format("%d/%m/%Y")),
        size,
        false,
        130.0,
        right_y,
    );
    right_y -= 5.0;
    if let Some(date) = view.secondary_date {
        page.text(
            &format!(
                "{}: {}",
                view.kind.secondary_date_label(),
                date.format("%d/%m/%Y")
            ),
            size,
            false,
            130.0,
            right_y,
        );
        right_y -= 5.0;
    }

    page.y = page.y.min(right_y) - 6.0;
    page.hline(page.y);
    page.y -= 8.0;
}

fn draw_client_block(page: &mut Page, view: &DocumentView) {
    let size = page.body_size;

    page.text("Bill to:", SECTION_SIZE, true, MARGIN_LEFT, page.y);
    page.y -= 6.0;
    page.text(&view.client.name, size, true, MARGIN_LEFT, page.y);
    page.y -= 5.0;
    if let Some(address) = &view.client.address {
        page.text(address, size, false, MARGIN_LEFT, page.y);
        page.y -= 5.0;
    }
    if let Some(vat) = &view.client.vat_number {
        page.text(&format!("VAT {}", vat), size, false, MARGIN_LEFT, page.y);
        page.y -= 5.0;
    }
    page.y -= 6.0;
}

fn draw_table_header(page: &mut Page) {
    let size = page.body_size;

    page.text("Description", size, true, COL_DESCRIPTION, page.y);
    page.text("Qty", size, true, COL_QUANTITY, page.y);
    page.text("Unit price", size, true, COL_UNIT_PRICE, page.y);
    page.text("VAT", size, true, COL_VAT, page.y);
    page.text("Total", size, true, COL_LINE_TOTAL, page.y);
    page.y -= 2.0;
    page.hline(page.y);
    page.y -= page.row_height();
}

fn draw_item_table(page: &mut Page, view: &DocumentView) {
    draw_table_header(page);
    let size = page.body_size;
    let row_height = page.row_height();

    for (index, item) in view.items.iter().enumerate() {
        if page.y < BOTTOM_LIMIT + row_height {
            page.break_page();
            draw_table_header(page);
        }

        if index % 2 == 1 {
            page.shade_band(page.y + row_height * 0.75, row_height);
        }

        let vat_label = item
            .vat_rate
            .map(format_rate)
            .unwrap_or_else(|| format_rate(view.tax_rate));

        page.text(&truncate(&item.description, 52), size, false, COL_DESCRIPTION, page.y);
        page.text(&item.quantity.normalize().to_string(), size, false, COL_QUANTITY, page.y);
        page.text(&format_currency(item.unit_price), size, false, COL_UNIT_PRICE, page.y);
        page.text(&vat_label, size, false, COL_VAT, page.y);
        page.text(&format_currency(item.line_total()), size, false, COL_LINE_TOTAL, page.y);

        page.y -= row_height;
    }

    page.y -= 2.0;
    page.hline(page.y);
    page.y -= 8.0;
}

fn draw_totals(page: &mut Page, view: &DocumentView) {
    if page.y < BOTTOM_LIMIT + 30.0 {
        page.break_page();
    }

    let size = page.body_size;
    let label_x = 130.0;

    page.text("Subtotal", size, false, label_x, page.y);
    page.text_right(
        &format_currency(view.totals.subtotal),
        size,
        false,
        MARGIN_RIGHT,
        page.y,
    );
    page.y -= 6.0;

    if view.tax_rate > Decimal::ZERO {
        page.text(
            &format!("VAT ({})", format_rate(view.tax_rate)),
            size,
            false,
            label_x,
            page.y,
        );
        page.text_right(
            &format_currency(view.totals.tax_amount),
            size,
            false,
            MARGIN_RIGHT,
            page.y,
        );
        page.y -= 6.0;
    }

    page.text("Total", SECTION_SIZE, true, label_x, page.y);
    page.text_right(
        &format_currency(view.totals.total),
        SECTION_SIZE,
        true,
        MARGIN_RIGHT,
        page.y,
    );
    page.y -= 12.0;
}

fn draw_footer(page: &mut Page, view: &DocumentView) {
    let Some(footer) = view
        .footer_text
        .as_deref()
        .filter(|text| !text.trim().is_empty())
    else {
        return;
    };

    let size = page.body_size;
    for line in footer.lines() {
        for wrapped in wrap(line, 95) {
            if page.y < BOTTOM_LIMIT {
                page.break_page();
            }
            page.text(&wrapped, size, false, MARGIN_LEFT, page.y);
            page.y -= 5.0;
        }
    }
    page.y -= 6.0;
}

fn draw_signature(page: &mut Page) {
    if page.y < BOTTOM_LIMIT + 15.0 {
        page.break_page();
    }

    // Fixed-width signature rule, right side
    let rule_left = 135.0;
    page.layer.add_line(Line {
        points: vec![
            (Point::new(Mm(rule_left), Mm(page.y)), false),
            (Point::new(Mm(MARGIN_RIGHT), Mm(page.y)), false),
        ],
        is_closed: false,
    });
    page.y -= 5.0;
    page.text("Signature", page.body_size, false, rule_left, page.y);
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('\u{2026}');
        out
    }
}

fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}
