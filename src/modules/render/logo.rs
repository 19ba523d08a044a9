// Best-effort logo handling. Fetch and decode failures never abort a
// render; the document simply goes out without the image.

use printpdf::image_crate::codecs::{jpeg::JpegDecoder, png::PngDecoder};
use printpdf::Image;
use std::io::Cursor;

/// Raw logo bytes fetched from the document's logo URL
#[derive(Debug, Clone)]
pub struct LogoImage {
    bytes: Vec<u8>,
}

impl LogoImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Decodes PNG or JPEG by magic bytes; anything else yields None
    pub fn decode(&self) -> Option<Image> {
        if self.bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            PngDecoder::new(Cursor::new(self.bytes.as_slice()))
                .ok()
                .and_then(|decoder| Image::try_from(decoder).ok())
        } else if self.bytes.starts_with(&[0xFF, 0xD8]) {
            JpegDecoder::new(Cursor::new(self.bytes.as_slice()))
                .ok()
                .and_then(|decoder| Image::try_from(decoder).ok())
        } else {
            None
        }
    }
}

/// Fetches the logo over HTTP. Network failures and non-success responses
/// are logged at warn and swallowed.
pub async fn fetch_logo(http: &reqwest::Client, url: &str) -> Option<LogoImage> {
    let response = match http.get(url).send().await {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!(url, %error, "Logo fetch failed, rendering without it");
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::warn!(
            url,
            status = %response.status(),
            "Logo fetch returned an error status, rendering without it"
        );
        return None;
    }

    match response.bytes().await {
        Ok(bytes) => Some(LogoImage::new(bytes.to_vec())),
        Err(error) => {
            tracing::warn!(url, %error, "Logo body read failed, rendering without it");
            None
        }
    }
}
