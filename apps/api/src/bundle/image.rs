//! Image XObjects for JPEG and PNG attachments, plus the fit-to-page math.

use std::io::{Cursor, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::jpeg::JpegDecoder;
use image::{ExtendedColorType, ImageDecoder, ImageFormat};
use lopdf::{dictionary, Object, Stream};

use crate::bundle::attachment::AttachmentError;

/// Margin kept around an image on its own page.
pub const IMAGE_PAGE_MARGIN: f32 = 50.0;

/// An image ready to be added to a document as an XObject.
pub struct EmbeddedImage {
    /// Natural width in pixels (drawn at 1 pt per pixel before scaling).
    pub width: u32,
    pub height: u32,
    pub xobject: Stream,
    /// Alpha channel, when the source had one.
    pub soft_mask: Option<Stream>,
}

/// Wraps JPEG bytes as-is behind a `DCTDecode` filter.
pub fn embed_jpeg(bytes: &[u8]) -> Result<EmbeddedImage, AttachmentError> {
    let decoder = JpegDecoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions();

    let (color_space, invert) = jpeg_color_space(decoder.original_color_type(), has_adobe_marker(bytes));

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
        "Filter" => "DCTDecode",
    };
    if invert {
        let decode: Vec<Object> = [1, 0, 1, 0, 1, 0, 1, 0].iter().map(|&v| v.into()).collect();
        dict.set("Decode", decode);
    }

    Ok(EmbeddedImage {
        width,
        height,
        xobject: Stream::new(dict, bytes.to_vec()),
        soft_mask: None,
    })
}

/// Decodes a PNG and re-encodes its pixels as Flate-compressed RGB, with any
/// alpha channel split into a grayscale soft mask.
pub fn embed_png(bytes: &[u8]) -> Result<EmbeddedImage, AttachmentError> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    let (width, height) = (decoded.width(), decoded.height());

    let (rgb, alpha) = if decoded.color().has_alpha() {
        let rgba = decoded.to_rgba8();
        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for px in rgba.pixels() {
            rgb.extend_from_slice(&px.0[..3]);
            alpha.push(px.0[3]);
        }
        (rgb, Some(alpha))
    } else {
        (decoded.to_rgb8().into_raw(), None)
    };

    let soft_mask = match alpha {
        Some(alpha) => Some(Stream::new(
            image_dict(width, height, "DeviceGray"),
            deflate_pixels(&alpha)?,
        )),
        None => None,
    };

    Ok(EmbeddedImage {
        width,
        height,
        xobject: Stream::new(image_dict(width, height, "DeviceRGB"), deflate_pixels(&rgb)?),
        soft_mask,
    })
}

/// PDF colour space for a JPEG, and whether its components need a `Decode`
/// array to undo inversion. Only Adobe-written CMYK JPEGs store inverted data.
fn jpeg_color_space(color: ExtendedColorType, adobe: bool) -> (&'static str, bool) {
    match color {
        ExtendedColorType::L8 | ExtendedColorType::L16 => ("DeviceGray", false),
        ExtendedColorType::Cmyk8 => ("DeviceCMYK", adobe),
        _ => ("DeviceRGB", false),
    }
}

/// Scans the marker segments ahead of the scan data for an APP14 "Adobe" segment.
fn has_adobe_marker(bytes: &[u8]) -> bool {
    const SOI: [u8; 2] = [0xFF, 0xD8];
    const APP14: u8 = 0xEE;
    const SOS: u8 = 0xDA;

    if !bytes.starts_with(&SOI) {
        return false;
    }
    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return false;
        }
        let marker = bytes[pos + 1];
        if marker == 0xFF {
            // fill byte
            pos += 1;
            continue;
        }
        if marker == SOS {
            return false;
        }
        let len = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let body = pos + 4;
        if marker == APP14 && bytes.get(body..body + 5) == Some(b"Adobe".as_slice()) {
            return true;
        }
        pos += 2 + len;
    }
    false
}

fn image_dict(width: u32, height: u32, color_space: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    }
}

/// Zlib-compresses a stream body for a `FlateDecode` filter.
pub(crate) fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

fn deflate_pixels(data: &[u8]) -> Result<Vec<u8>, AttachmentError> {
    deflate(data).map_err(|e| AttachmentError::Image(format!("compression failed: {e}")))
}

/// Where and how large to draw an image, in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Applied uniform scale; 1.0 when the image already fits.
    pub scale: f32,
}

/// Fits a `width` x `height` image inside the page minus `margin` on every
/// side. Only ever scales down, keeping the aspect ratio. The result is
/// centred horizontally with its top edge `margin` below the page top.
pub fn place_image(width: f32, height: f32, page_width: f32, page_height: f32, margin: f32) -> ImagePlacement {
    let max_w = page_width - 2.0 * margin;
    let max_h = page_height - 2.0 * margin;

    let scale = if width > max_w || height > max_h {
        (max_w / width).min(max_h / height)
    } else {
        1.0
    };
    let (w, h) = (width * scale, height * scale);

    ImagePlacement {
        x: page_width / 2.0 - w / 2.0,
        y: page_height - margin - h,
        width: w,
        height: h,
        scale,
    }
}
