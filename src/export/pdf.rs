use ritease_render::{PdfPage, RenderError};

use super::{replay, surface_error, surface_size};
use crate::annotation::Annotation;
use crate::config::ExportSettings;
use crate::error::Result;
use crate::upload::{FileKind, UploadedFile};

/// Render `page` of `file` with its annotations to a one-page PDF.
///
/// Image documents are stretched over a fresh page; PDF documents keep the
/// source page with the annotations drawn on top as vector content.
pub(super) fn render_pdf(
    file: &UploadedFile,
    annotations: &[&Annotation],
    page: u32,
    viewport: (f32, f32),
    settings: &ExportSettings,
) -> Result<Vec<u8>> {
    let (width, height) = surface_size(viewport);
    if width == 0 || height == 0 {
        return Err(surface_error(RenderError::SurfaceAllocation { width, height }));
    }

    let mut pdf = match file.kind {
        FileKind::Image => {
            let image = image::load_from_memory(file.bytes())?;
            let mut pdf = PdfPage::blank(
                settings.pdf_page_width,
                settings.pdf_page_height,
                viewport,
            );
            pdf.place_image(&image, settings.jpeg_quality)?;
            pdf
        }
        FileKind::Pdf => PdfPage::from_source(file.bytes(), page, viewport)?,
    };

    replay(&mut pdf, annotations, settings);
    Ok(pdf.finish()?)
}
