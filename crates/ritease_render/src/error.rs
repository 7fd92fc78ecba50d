use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to allocate a {width}x{height} raster surface")]
    SurfaceAllocation { width: u32, height: u32 },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG encoding error: {0}")]
    PngEncode(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF write error: {0}")]
    PdfWrite(String),

    #[error("Page {page} does not exist (document has {count} pages)")]
    PageOutOfRange { page: u32, count: u32 },

    #[error("Malformed PDF: {0}")]
    MalformedPdf(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;
