//! lopdf-backed decoding of PDF pages into text fragments.

use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, warn};

use crate::extract::{ExtractError, SourceDocument, SourcePage};

pub fn decode_pdf(bytes: &[u8]) -> Result<SourceDocument, ExtractError> {
    let doc = Document::load_mem(bytes)?;
    // lopdf loads encrypted files without decrypting them; their strings are ciphertext.
    if doc.is_encrypted() {
        return Err(ExtractError::Encrypted);
    }

    let pages = doc
        .get_pages()
        .into_iter()
        .map(|(number, page_id)| SourcePage {
            number,
            fragments: page_fragments(&doc, number, page_id),
        })
        .collect::<Vec<_>>();

    debug!("Decoded PDF with {} pages", pages.len());
    Ok(SourceDocument { pages })
}

/// Collects one fragment per text-showing operator, in content-stream order.
/// A page whose content cannot be read yields no fragments.
fn page_fragments(doc: &Document, number: u32, page_id: ObjectId) -> Vec<String> {
    let data = match doc.get_page_content(page_id) {
        Ok(data) => data,
        Err(e) => {
            warn!("Page {number}: unreadable content stream: {e}");
            return Vec::new();
        }
    };
    let content = match Content::decode(&data) {
        Ok(content) => content,
        Err(e) => {
            warn!("Page {number}: content stream does not parse: {e}");
            return Vec::new();
        }
    };

    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
    let mut current_font: Option<Vec<u8>> = None;
    let mut fragments = Vec::new();

    for op in &content.operations {
        match op.operator.as_str() {
            "Tf" => {
                current_font = op
                    .operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| n.to_vec());
            }
            "Tj" | "'" | "\"" => {
                let index = if op.operator == "\"" { 2 } else { 0 };
                if let Some(Object::String(bytes, _)) = op.operands.get(index) {
                    fragments.push(decode_with_font(doc, &fonts, current_font.as_deref(), bytes));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    let mut combined = String::new();
                    for item in items {
                        // Numbers are kerning adjustments.
                        if let Object::String(bytes, _) = item {
                            combined.push_str(&decode_with_font(
                                doc,
                                &fonts,
                                current_font.as_deref(),
                                bytes,
                            ));
                        }
                    }
                    fragments.push(combined);
                }
            }
            _ => {}
        }
    }
    fragments
}

fn decode_with_font(
    doc: &Document,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    font_name: Option<&[u8]>,
    bytes: &[u8],
) -> String {
    if let Some(font_dict) = font_name.and_then(|name| fonts.get(name)) {
        if let Ok(encoding) = font_dict.get_font_encoding(doc) {
            if let Ok(text) = Document::decode_text(&encoding, bytes) {
                return text;
            }
        }
    }
    decode_text_simple(bytes)
}

/// Encoding-free fallback: UTF-16BE with BOM, then UTF-8, then Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
