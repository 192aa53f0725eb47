//! Multipart upload helpers shared by the extract and bundle handlers.

use axum::extract::multipart::Field;
use bytes::{Bytes, BytesMut};

use crate::errors::AppError;

/// A file field read fully into memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// True when the declared type or, failing that, the extension says PDF.
    pub fn is_pdf(&self) -> bool {
        match self.content_type.as_deref() {
            Some("application/pdf") => true,
            Some(ct) if ct != "application/octet-stream" => false,
            _ => self.file_name.to_ascii_lowercase().ends_with(".pdf"),
        }
    }
}

/// Reads a file field, failing as soon as it grows past `limit` bytes.
pub async fn read_file_field(mut field: Field<'_>, limit: usize) -> Result<UploadedFile, AppError> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase());

    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await? {
        if buf.len() + chunk.len() > limit {
            return Err(AppError::PayloadTooLarge(format!(
                "'{file_name}' exceeds the {} MB upload limit",
                limit / (1024 * 1024)
            )));
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(UploadedFile {
        file_name,
        content_type,
        bytes: buf.freeze(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content_type: Option<&str>) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes: Bytes::new(),
        }
    }

    #[test]
    fn test_is_pdf_by_content_type() {
        assert!(file("cv.bin", Some("application/pdf")).is_pdf());
        assert!(!file("cv.pdf", Some("image/png")).is_pdf());
    }

    #[test]
    fn test_is_pdf_falls_back_to_extension() {
        assert!(file("CV.PDF", None).is_pdf());
        assert!(file("cv.pdf", Some("application/octet-stream")).is_pdf());
        assert!(!file("cv.docx", None).is_pdf());
    }
}
