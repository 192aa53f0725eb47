//! Text Extractor: flattens an uploaded CV (PDF) into plain text.
//!
//! Pages are read in increasing page number; each page's text fragments are
//! kept in content-stream order, joined by a single space, and followed by a
//! newline. No positional sorting happens here.

pub mod decode;
pub mod handlers;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("not a readable PDF: {0}")]
    Decode(String),

    #[error("document is encrypted")]
    Encrypted,
}

impl From<lopdf::Error> for ExtractError {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::Decryption(_) => ExtractError::Encrypted,
            _ => ExtractError::Decode(err.to_string()),
        }
    }
}

/// One page of a decoded source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePage {
    /// 1-based page number.
    pub number: u32,
    pub fragments: Vec<String>,
}

/// A decoded, immutable source document: pages of positioned text fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDocument {
    pub pages: Vec<SourcePage>,
}

impl SourceDocument {
    /// Decodes PDF bytes into pages of text fragments.
    pub fn decode(bytes: &[u8]) -> Result<Self, ExtractError> {
        decode::decode_pdf(bytes)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Flattens a document into a single text blob.
pub fn extract_text(document: &SourceDocument) -> String {
    let mut text = String::new();
    for page in &document.pages {
        text.push_str(&page.fragments.join(" "));
        text.push('\n');
    }
    text
}
