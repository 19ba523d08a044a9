// Document rendering module

pub mod document_view;
pub mod font_size;
pub mod logo;
pub mod pdf_renderer;

pub use document_view::{ClientBlock, DocumentKind, DocumentView};
pub use font_size::FontSize;
pub use logo::{fetch_logo, LogoImage};
pub use pdf_renderer::render_document;
