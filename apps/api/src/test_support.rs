//! In-memory PDF and image fixtures for unit tests.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// One page per entry, one `Tj` per fragment, Helvetica as `/F1`.
pub fn pdf_with_pages(pages: &[&[&str]]) -> Vec<u8> {
    let streams = pages
        .iter()
        .map(|fragments| {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
            ];
            for fragment in fragments.iter() {
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(fragment.as_bytes().to_vec())],
                ));
                operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
            }
            operations.push(Operation::new("ET", vec![]));
            Content { operations }.encode().unwrap()
        })
        .collect();
    pdf_from_streams(streams)
}

/// A text PDF whose trailer declares Standard security handler encryption.
/// Content streams stay plain, so only the `/Encrypt` entry marks it.
pub fn encrypted_pdf_with_pages(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::load_mem(&pdf_with_pages(pages)).unwrap();
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "O" => Object::string_literal(vec![0u8; 32]),
        "U" => Object::string_literal(vec![0u8; 32]),
        "P" => -44,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// One page per raw content stream.
pub fn pdf_from_streams(streams: Vec<Vec<u8>>) -> Vec<u8> {
    build_pdf(streams, |_| {}, true)
}

/// A one-page PDF whose MediaBox lives only on the Pages node.
pub fn pdf_with_inherited_media_box(width: f32, height: f32) -> Vec<u8> {
    let stream = b"BT /F1 12 Tf 72 700 Td (Inherited) Tj ET".to_vec();
    build_pdf(
        vec![stream],
        |pages| {
            pages.set(
                "MediaBox",
                vec![0.into(), 0.into(), width.into(), height.into()],
            );
        },
        false,
    )
}

fn build_pdf(
    streams: Vec<Vec<u8>>,
    decorate_pages: impl FnOnce(&mut lopdf::Dictionary),
    page_media_box: bool,
) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<ObjectId> = streams
        .into_iter()
        .map(|content| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            };
            if page_media_box {
                page.set("MediaBox", vec![0.into(), 0.into(), 595.into(), 842.into()]);
            }
            doc.add_object(page)
        })
        .collect();

    let mut pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids.iter().map(|&id| Object::from(id)).collect::<Vec<_>>(),
        "Count" => kids.len() as i64,
        "Resources" => resources_id,
    };
    decorate_pages(&mut pages);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
    out.into_inner()
}

pub fn png_bytes(width: u32, height: u32, alpha: bool) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    if alpha {
        let img = RgbaImage::from_fn(width, height, |x, _| Rgba([200, 10, 10, (x * 25 % 256) as u8]));
        img.write_to(&mut out, ImageFormat::Png).unwrap();
    } else {
        let img = RgbImage::from_fn(width, height, |_, y| Rgb([10, (y * 30 % 256) as u8, 10]));
        img.write_to(&mut out, ImageFormat::Png).unwrap();
    }
    out.into_inner()
}
