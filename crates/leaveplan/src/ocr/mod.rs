//! Turning uploaded files into raw text.
//!
//! Images and PDFs go through the external OCR service. Plain-text uploads
//! are decoded directly.

mod client;
mod error;

pub use client::OcrClient;
pub use error::OcrError;

/// Extensions that are already text and skip the OCR service.
const PLAIN_TEXT_EXTENSIONS: &[&str] = &["txt", "csv"];

/// True if `file_name` has a plain-text extension (case-insensitive).
pub fn is_plain_text(file_name: &str) -> bool {
    extension(file_name).is_some_and(|ext| PLAIN_TEXT_EXTENSIONS.contains(&ext.as_str()))
}

fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    (!stem.is_empty() && !ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Returns the raw text of an uploaded file.
pub async fn extract_text(
    client: &OcrClient,
    bytes: &[u8],
    file_name: &str,
) -> Result<String, OcrError> {
    if is_plain_text(file_name) {
        return Ok(String::from_utf8_lossy(bytes).into_owned());
    }
    client.recognize(bytes, file_name).await
}
