//! Supporting files appended after the letter.

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::upload::UploadedFile;

/// How an attachment will be merged into the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentKind {
    Pdf,
    Jpeg,
    Png,
    /// Anything else, including other image formats. Contributes no pages.
    Other(String),
}

impl AttachmentKind {
    /// Classifies by declared media type. A missing or generic type falls back
    /// to the file extension.
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Self {
        match content_type.map(str::to_ascii_lowercase).as_deref() {
            Some("application/pdf") => AttachmentKind::Pdf,
            Some("image/jpeg") | Some("image/jpg") => AttachmentKind::Jpeg,
            Some("image/png") => AttachmentKind::Png,
            Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => {
                AttachmentKind::Other(ct.to_string())
            }
            _ => Self::from_extension(file_name),
        }
    }

    fn from_extension(file_name: &str) -> Self {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => AttachmentKind::Pdf,
            "jpg" | "jpeg" => AttachmentKind::Jpeg,
            "png" => AttachmentKind::Png,
            _ => AttachmentKind::Other(format!("unknown (.{ext})")),
        }
    }
}

/// One user-supplied supporting file, owned by the composer for one build.
#[derive(Debug, Clone)]
pub struct AttachmentFile {
    pub name: String,
    pub kind: AttachmentKind,
    pub bytes: Bytes,
}

impl AttachmentFile {
    pub fn new(name: impl Into<String>, kind: AttachmentKind, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            kind,
            bytes: bytes.into(),
        }
    }
}

impl From<UploadedFile> for AttachmentFile {
    fn from(file: UploadedFile) -> Self {
        let kind = AttachmentKind::detect(file.content_type.as_deref(), &file.file_name);
        Self::new(file.file_name, kind, file.bytes)
    }
}

/// Why a single attachment was left out. Recovered locally, never propagated.
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("cannot read PDF: {0}")]
    Pdf(String),

    #[error("PDF is encrypted")]
    Encrypted,

    #[error("cannot embed image: {0}")]
    Image(String),

    #[error("unsupported type {0}")]
    Unsupported(String),
}

impl From<lopdf::Error> for AttachmentError {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::Decryption(_) => AttachmentError::Encrypted,
            _ => AttachmentError::Pdf(err.to_string()),
        }
    }
}

impl From<image::ImageError> for AttachmentError {
    fn from(err: image::ImageError) -> Self {
        AttachmentError::Image(err.to_string())
    }
}

/// A skipped attachment, reported back to the caller alongside the bundle.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedAttachment {
    pub name: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_content_type() {
        assert_eq!(AttachmentKind::detect(Some("application/pdf"), "x"), AttachmentKind::Pdf);
        assert_eq!(AttachmentKind::detect(Some("image/jpeg"), "x"), AttachmentKind::Jpeg);
        assert_eq!(AttachmentKind::detect(Some("IMAGE/PNG"), "x"), AttachmentKind::Png);
        assert_eq!(
            AttachmentKind::detect(Some("image/webp"), "photo.png"),
            AttachmentKind::Other("image/webp".to_string())
        );
    }

    #[test]
    fn test_detect_falls_back_to_extension() {
        assert_eq!(AttachmentKind::detect(None, "cert.PDF"), AttachmentKind::Pdf);
        assert_eq!(
            AttachmentKind::detect(Some("application/octet-stream"), "scan.jpeg"),
            AttachmentKind::Jpeg
        );
        assert!(matches!(
            AttachmentKind::detect(None, "notes.docx"),
            AttachmentKind::Other(_)
        ));
        assert!(matches!(AttachmentKind::detect(None, "README"), AttachmentKind::Other(_)));
    }

    #[test]
    fn test_from_uploaded_file_detects_kind() {
        let upload = UploadedFile {
            file_name: "scan.JPG".to_string(),
            content_type: Some("application/octet-stream".to_string()),
            bytes: Bytes::from_static(b"\xFF\xD8"),
        };
        let attachment = AttachmentFile::from(upload);
        assert_eq!(attachment.name, "scan.JPG");
        assert_eq!(attachment.kind, AttachmentKind::Jpeg);
        assert_eq!(attachment.bytes.len(), 2);
    }
}
