//! Bundle Composer: letter pages first, then every attachment in order.
//!
//! Flow: layout_letter → letter pages → for each attachment: copy PDF pages
//! or add one image page → serialise.
//!
//! An attachment that cannot be read contributes zero pages and is reported in
//! `ComposedBundle::skipped`; only a failure to render the letter or to
//! serialise the result aborts the build.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::bundle::attachment::{AttachmentError, AttachmentFile, AttachmentKind, SkippedAttachment};
use crate::bundle::font_metrics::{encode_win_ansi, BASE_FONT, HELVETICA};
use crate::bundle::image::{deflate, embed_jpeg, embed_png, place_image, EmbeddedImage, IMAGE_PAGE_MARGIN};
use crate::bundle::text_layout::{layout_letter, LetterLayout, PlacedLine, A4_HEIGHT, A4_WIDTH};

/// Page-tree attributes a page may inherit from its ancestors.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against cyclic `Parent` chains in damaged files.
const MAX_PAGE_TREE_DEPTH: usize = 64;

#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("failed to render letter: {0}")]
    Render(String),

    #[error("failed to serialise bundle: {0}")]
    Serialize(String),
}

/// The finished bundle.
#[derive(Debug, Clone)]
pub struct ComposedBundle {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub letter_pages: usize,
    pub skipped: Vec<SkippedAttachment>,
}

/// Builds the bundle for one submission. Attachments are consumed one at a
/// time and dropped as soon as their pages are in.
pub fn compose_bundle(
    letter: &str,
    attachments: Vec<AttachmentFile>,
) -> Result<ComposedBundle, CompositionError> {
    let mut builder = BundleBuilder::new();
    let letter_pages = builder.add_letter(letter, &LetterLayout::default())?;

    let mut skipped = Vec::new();
    for attachment in attachments {
        match builder.add_attachment(&attachment) {
            Ok(pages) => debug!("Attachment '{}': {pages} page(s) appended", attachment.name),
            Err(e) => {
                warn!("Skipping attachment '{}': {e}", attachment.name);
                skipped.push(SkippedAttachment {
                    name: attachment.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let page_count = builder.page_count();
    let bytes = builder.finish()?;
    info!(
        "Bundle composed: {page_count} page(s), {letter_pages} letter page(s), {} attachment(s) skipped, {} bytes",
        skipped.len(),
        bytes.len()
    );

    Ok(ComposedBundle {
        bytes,
        page_count,
        letter_pages,
        skipped,
    })
}

/// Incrementally assembles the composite document.
struct BundleBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl BundleBuilder {
    fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Renders the letter onto fresh A4 pages. Returns the number of pages.
    fn add_letter(&mut self, text: &str, layout: &LetterLayout) -> Result<usize, CompositionError> {
        let font_id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => BASE_FONT,
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = self.doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let pages = layout_letter(text, &HELVETICA, layout);
        for lines in &pages {
            let content = letter_page_content(lines, layout.font_size);
            let encoded = content
                .encode()
                .map_err(|e| CompositionError::Render(e.to_string()))?;
            let compressed = deflate(&encoded).map_err(|e| CompositionError::Render(e.to_string()))?;
            let content_id = self.doc.add_object(Stream::new(
                dictionary! { "Filter" => "FlateDecode" },
                compressed,
            ));

            self.push_page(dictionary! {
                "Type" => "Page",
                "MediaBox" => media_box(layout.page_width, layout.page_height),
                "Contents" => content_id,
                "Resources" => resources_id,
            });
        }
        Ok(pages.len())
    }

    fn add_attachment(&mut self, attachment: &AttachmentFile) -> Result<usize, AttachmentError> {
        match &attachment.kind {
            AttachmentKind::Pdf => self.append_pdf(&attachment.bytes),
            AttachmentKind::Jpeg => self.add_image_page(embed_jpeg(&attachment.bytes)?),
            AttachmentKind::Png => self.add_image_page(embed_png(&attachment.bytes)?),
            AttachmentKind::Other(media_type) => Err(AttachmentError::Unsupported(media_type.clone())),
        }
    }

    /// Copies every page of a PDF attachment, in order, to the end of the bundle.
    fn append_pdf(&mut self, bytes: &[u8]) -> Result<usize, AttachmentError> {
        let mut source = Document::load_mem(bytes)?;
        if source.is_encrypted() {
            return Err(AttachmentError::Encrypted);
        }

        source.renumber_objects_with(self.doc.max_id + 1);
        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(AttachmentError::Pdf("document has no pages".to_string()));
        }

        // Pages are re-parented below, so inherited attributes must be copied
        // down before the source page tree is dropped.
        for &page_id in &page_ids {
            let inherited = inherited_attributes(&source, page_id);
            if let Ok(page) = source.get_dictionary_mut(page_id) {
                for (key, value) in inherited {
                    page.set(key, value);
                }
                if !page.has(b"MediaBox") {
                    page.set("MediaBox", media_box(A4_WIDTH, A4_HEIGHT));
                }
            }
        }

        self.doc.max_id = self.doc.max_id.max(source.max_id);
        for (id, object) in source.objects {
            if is_page_tree_root(&object) {
                continue;
            }
            self.doc.objects.insert(id, object);
        }

        for &page_id in &page_ids {
            if let Ok(page) = self.doc.get_dictionary_mut(page_id) {
                page.set("Parent", self.pages_id);
            }
            self.kids.push(page_id);
        }
        Ok(page_ids.len())
    }

    /// Adds one A4 page holding the image, scaled down to fit if needed.
    fn add_image_page(&mut self, image: EmbeddedImage) -> Result<usize, AttachmentError> {
        let EmbeddedImage {
            width,
            height,
            mut xobject,
            soft_mask,
        } = image;

        if let Some(mask) = soft_mask {
            let mask_id = self.doc.add_object(mask);
            xobject.dict.set("SMask", mask_id);
        }
        let image_id = self.doc.add_object(xobject);

        let placement = place_image(width as f32, height as f32, A4_WIDTH, A4_HEIGHT, IMAGE_PAGE_MARGIN);
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        placement.width.into(),
                        0.into(),
                        0.into(),
                        placement.height.into(),
                        placement.x.into(),
                        placement.y.into(),
                    ],
                ),
                Operation::new("Do", vec!["Im1".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| AttachmentError::Image(e.to_string()))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, encoded));

        debug!(
            "Image {width}x{height} placed at scale {:.3} ({:.1}x{:.1} pt)",
            placement.scale, placement.width, placement.height
        );
        self.push_page(dictionary! {
            "Type" => "Page",
            "MediaBox" => media_box(A4_WIDTH, A4_HEIGHT),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im1" => image_id },
            },
        });
        Ok(1)
    }

    fn push_page(&mut self, mut page: Dictionary) {
        page.set("Parent", self.pages_id);
        let page_id = self.doc.add_object(page);
        self.kids.push(page_id);
    }

    /// Writes the page tree and catalog, then serialises the document.
    fn finish(mut self) -> Result<Vec<u8>, CompositionError> {
        let kids: Vec<Object> = self.kids.iter().map(|&id| id.into()).collect();
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.kids.len() as i64,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| CompositionError::Serialize(e.to_string()))?;
        Ok(bytes)
    }
}

fn letter_page_content(lines: &[PlacedLine], font_size: f32) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), font_size.into()]),
    ];
    for line in lines.iter().filter(|l| !l.text.is_empty()) {
        operations.push(Operation::new(
            "Tm",
            vec![1.into(), 0.into(), 0.into(), 1.into(), line.x.into(), line.y.into()],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(&line.text))],
        ));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

fn media_box(width: f32, height: f32) -> Vec<Object> {
    vec![0.into(), 0.into(), width.into(), height.into()]
}

/// Attributes the page would inherit from its `Parent` chain and does not
/// already define itself. The nearest ancestor wins.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let mut found: Vec<(&'static [u8], Object)> = Vec::new();
    let Ok(page) = doc.get_dictionary(page_id) else {
        return found;
    };

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(parent_id) = parent {
        depth += 1;
        if depth > MAX_PAGE_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE_KEYS {
            if page.has(key) || found.iter().any(|(k, _)| *k == key) {
                continue;
            }
            if let Ok(value) = node.get(key) {
                found.push((key, value.clone()));
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    found
}

/// The source's catalog and page-tree nodes are replaced by the bundle's own.
fn is_page_tree_root(object: &Object) -> bool {
    let Object::Dictionary(dict) = object else {
        return false;
    };
    matches!(
        dict.get(b"Type").and_then(Object::as_name),
        Ok(b"Catalog") | Ok(b"Pages")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract_text, SourceDocument};
    use crate::test_support::{
        encrypted_pdf_with_pages, jpeg_bytes, pdf_with_inherited_media_box, pdf_with_pages, png_bytes,
    };

    const LETTER: &str = "Dear Hiring Manager,\n\nI am excited to apply.\n\nSincerely,\nJane Roe";

    fn letter_only_pages(text: &str) -> usize {
        layout_letter(text, &HELVETICA, &LetterLayout::default()).len()
    }

    fn reload(bundle: &ComposedBundle) -> Document {
        Document::load_mem(&bundle.bytes).expect("bundle must be a readable PDF")
    }

    #[test]
    fn test_no_attachments_matches_letter_pages() {
        let long_letter = "Paragraph with several words in it. ".repeat(400);
        for text in [LETTER, long_letter.as_str()] {
            let bundle = compose_bundle(text, vec![]).unwrap();
            assert_eq!(bundle.page_count, letter_only_pages(text));
            assert_eq!(bundle.letter_pages, bundle.page_count);
            assert_eq!(reload(&bundle).get_pages().len(), bundle.page_count);
            assert!(bundle.skipped.is_empty());
        }
        assert!(letter_only_pages(&long_letter) > 1);
    }

    #[test]
    fn test_letter_text_is_extractable() {
        let bundle = compose_bundle(LETTER, vec![]).unwrap();
        let doc = SourceDocument::decode(&bundle.bytes).unwrap();
        assert_eq!(
            extract_text(&doc),
            "Dear Hiring Manager, I am excited to apply. Sincerely, Jane Roe\n"
        );
    }

    #[test]
    fn test_pdf_attachment_pages_follow_letter_in_order() {
        let cert = AttachmentFile::new(
            "cert.pdf",
            AttachmentKind::Pdf,
            pdf_with_pages(&[&["Certificate", "One"], &["Certificate", "Two"]]),
        );
        let portfolio = AttachmentFile::new(
            "portfolio.pdf",
            AttachmentKind::Pdf,
            pdf_with_pages(&[&["Portfolio"]]),
        );
        let bundle = compose_bundle(LETTER, vec![cert, portfolio]).unwrap();
        assert_eq!(bundle.page_count, 4);

        let doc = SourceDocument::decode(&bundle.bytes).unwrap();
        let pages: Vec<String> = doc.pages.iter().map(|p| p.fragments.join(" ")).collect();
        assert!(pages[0].starts_with("Dear Hiring Manager,"));
        assert_eq!(pages[1..], ["Certificate One", "Certificate Two", "Portfolio"]);
    }

    #[test]
    fn test_inherited_media_box_survives_merge() {
        let attachment = AttachmentFile::new(
            "letter-size.pdf",
            AttachmentKind::Pdf,
            pdf_with_inherited_media_box(612.0, 792.0),
        );
        let bundle = compose_bundle(LETTER, vec![attachment]).unwrap();
        let doc = reload(&bundle);
        let last = *doc.get_pages().values().last().unwrap();
        let media_box = doc.get_dictionary(last).unwrap().get(b"MediaBox").unwrap();
        let values: Vec<f32> = media_box
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_float().unwrap())
            .collect();
        assert_eq!(values, vec![0.0, 0.0, 612.0, 792.0]);
    }

    #[test]
    fn test_corrupt_pdf_is_skipped() {
        let baseline = compose_bundle(LETTER, vec![]).unwrap();
        let corrupt = AttachmentFile::new("broken.pdf", AttachmentKind::Pdf, b"%PDF-1.7 garbage".to_vec());
        let bundle = compose_bundle(LETTER, vec![corrupt]).unwrap();

        assert_eq!(bundle.page_count, baseline.page_count);
        assert_eq!(bundle.skipped.len(), 1);
        assert_eq!(bundle.skipped[0].name, "broken.pdf");
    }

    #[test]
    fn test_encrypted_pdf_is_skipped() {
        let sealed = AttachmentFile::new(
            "sealed.pdf",
            AttachmentKind::Pdf,
            encrypted_pdf_with_pages(&[&["Secret"], &["More"]]),
        );
        let bundle = compose_bundle(LETTER, vec![sealed]).unwrap();

        assert_eq!(bundle.page_count, letter_only_pages(LETTER));
        assert_eq!(bundle.skipped.len(), 1);
        assert_eq!(bundle.skipped[0].name, "sealed.pdf");
        assert_eq!(bundle.skipped[0].reason, "PDF is encrypted");
    }

    #[test]
    fn test_oversized_jpeg_adds_one_scaled_page() {
        let photo = AttachmentFile::new("scan.jpg", AttachmentKind::Jpeg, jpeg_bytes(2000, 3000));
        let bundle = compose_bundle(LETTER, vec![photo]).unwrap();
        assert_eq!(bundle.page_count, letter_only_pages(LETTER) + 1);

        let doc = reload(&bundle);
        let last = *doc.get_pages().values().last().unwrap();
        let content = Content::decode(&doc.get_page_content(last).unwrap()).unwrap();
        let cm = content
            .operations
            .iter()
            .find(|op| op.operator == "cm")
            .expect("image page draws with cm");
        let w = cm.operands[0].as_float().unwrap();
        let h = cm.operands[3].as_float().unwrap();

        assert!(w < 2000.0 && h < 3000.0);
        assert!(w <= A4_WIDTH - 2.0 * IMAGE_PAGE_MARGIN + 0.01);
        assert!(h <= A4_HEIGHT - 2.0 * IMAGE_PAGE_MARGIN + 0.01);
        assert!((w / h - 2000.0 / 3000.0).abs() < 1e-3);
    }

    #[test]
    fn test_png_attachment_adds_one_page() {
        let logo = AttachmentFile::new("logo.png", AttachmentKind::Png, png_bytes(40, 40, true));
        let bundle = compose_bundle(LETTER, vec![logo]).unwrap();
        assert_eq!(bundle.page_count, letter_only_pages(LETTER) + 1);
        assert!(bundle.skipped.is_empty());
    }

    #[test]
    fn test_unsupported_types_contribute_nothing() {
        let baseline = compose_bundle(LETTER, vec![]).unwrap();
        let webp = AttachmentFile::new(
            "photo.webp",
            AttachmentKind::Other("image/webp".to_string()),
            vec![0u8; 16],
        );
        let bundle = compose_bundle(LETTER, vec![webp]).unwrap();
        assert_eq!(bundle.page_count, baseline.page_count);
    }

    #[test]
    fn test_mixed_attachments_keep_input_order() {
        let attachments = vec![
            AttachmentFile::new("a.png", AttachmentKind::Png, png_bytes(8, 8, false)),
            AttachmentFile::new("b.pdf", AttachmentKind::Pdf, b"nope".to_vec()),
            AttachmentFile::new("c.pdf", AttachmentKind::Pdf, pdf_with_pages(&[&["Reference"]])),
        ];
        let bundle = compose_bundle(LETTER, attachments).unwrap();
        let letter_pages = letter_only_pages(LETTER);
        assert_eq!(bundle.page_count, letter_pages + 2);

        let doc = SourceDocument::decode(&bundle.bytes).unwrap();
        // image page has no text; the PDF page comes after it
        assert!(doc.pages[letter_pages].fragments.is_empty());
        assert_eq!(doc.pages[letter_pages + 1].fragments, vec!["Reference"]);
    }
}
