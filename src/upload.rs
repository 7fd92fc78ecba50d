//! File ingestion: MIME validation and data-URI handling.

use std::fmt;
use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::Serialize;

use crate::error::{AnnotatorError, Result};

/// Identifies one uploaded document for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

/// Broad category of an accepted upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Image,
}

impl FileKind {
    /// Classify a MIME type; `None` for anything that is not PDF or `image/*`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime == "application/pdf" {
            Some(FileKind::Pdf)
        } else if mime.starts_with("image/") {
            Some(FileKind::Image)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Image => "image",
        }
    }
}

/// The active document.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub id: DocumentId,
    /// `data:` URI of the original bytes, as handed to the viewer.
    pub url: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    pub mime: String,
    /// Known for images (always 1) and for PDFs that parse.
    pub page_count: Option<u32>,
    #[serde(skip)]
    bytes: Vec<u8>,
}

impl UploadedFile {
    /// Validate `mime` and wrap `bytes`.
    pub fn from_bytes(id: DocumentId, mime: &str, bytes: Vec<u8>) -> Result<Self> {
        let kind =
            FileKind::from_mime(mime).ok_or_else(|| AnnotatorError::unsupported_file_type(mime))?;
        let mime = mime.trim().to_ascii_lowercase();

        let page_count = match kind {
            FileKind::Image => Some(1),
            FileKind::Pdf => match ritease_render::page_count(&bytes) {
                Ok(count) => Some(count),
                Err(e) => {
                    log::warn!("⚠️  Could not count PDF pages: {}", e);
                    None
                }
            },
        };

        let url = encode_data_url(&mime, &bytes);
        Ok(Self {
            id,
            url,
            kind,
            mime,
            page_count,
            bytes,
        })
    }

    /// Same as [`UploadedFile::from_bytes`] for a `data:<mime>;base64,` URI.
    pub fn from_data_url(id: DocumentId, url: &str) -> Result<Self> {
        let (mime, bytes) = decode_data_url(url)?;
        Self::from_bytes(id, &mime, bytes)
    }

    /// Original file bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_pdf(&self) -> bool {
        self.kind == FileKind::Pdf
    }
}

/// Build a base64 `data:` URI.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Split a base64 `data:` URI into its MIME type and payload.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| AnnotatorError::decode("Not a data URI"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AnnotatorError::decode("Data URI has no payload"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| AnnotatorError::decode("Only base64 data URIs are supported"))?;
    Ok((mime.to_string(), BASE64.decode(payload.trim())?))
}

/// Guess a MIME type from a file extension.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_classification() {
        assert_eq!(FileKind::from_mime("application/pdf"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_mime("image/png"), Some(FileKind::Image));
        assert_eq!(FileKind::from_mime("IMAGE/JPEG"), Some(FileKind::Image));
        assert_eq!(FileKind::from_mime("text/plain"), None);
        assert_eq!(FileKind::from_mime("application/pdfx"), None);
    }

    #[test]
    fn test_rejects_text() {
        let err = UploadedFile::from_bytes(DocumentId(1), "text/plain", b"hello".to_vec());
        assert!(matches!(
            err,
            Err(AnnotatorError::UnsupportedFileType { ref mime }) if mime == "text/plain"
        ));
    }

    #[test]
    fn test_image_upload_has_one_page() {
        let file = UploadedFile::from_bytes(DocumentId(7), "image/png", vec![1, 2, 3]).unwrap();
        assert_eq!(file.kind, FileKind::Image);
        assert_eq!(file.page_count, Some(1));
        assert_eq!(file.url, "data:image/png;base64,AQID");
        assert_eq!(file.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_unparsable_pdf_has_unknown_page_count() {
        let file =
            UploadedFile::from_bytes(DocumentId(1), "application/pdf", b"not a pdf".to_vec())
                .unwrap();
        assert!(file.is_pdf());
        assert_eq!(file.page_count, None);
    }

    #[test]
    fn test_data_url_roundtrip() {
        let url = encode_data_url("image/gif", b"GIF89a");
        let (mime, bytes) = decode_data_url(&url).unwrap();
        assert_eq!(mime, "image/gif");
        assert_eq!(bytes, b"GIF89a");

        assert!(decode_data_url("https://example.com/a.png").is_err());
        assert!(decode_data_url("data:image/png,raw").is_err());
        assert!(decode_data_url("data:image/png;base64,***").is_err());
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(
            mime_from_extension(Path::new("scan.PDF")),
            Some("application/pdf")
        );
        assert_eq!(mime_from_extension(Path::new("a/b.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_from_extension(Path::new("README")), None);
    }
}
