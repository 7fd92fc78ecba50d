use ritease_render::RasterCanvas;

use super::{replay, surface_error, surface_size};
use crate::annotation::Annotation;
use crate::config::ExportSettings;
use crate::error::Result;
use crate::upload::UploadedFile;

/// Render an image document and its annotations to PNG at viewport size.
pub(super) fn render_png(
    file: &UploadedFile,
    annotations: &[&Annotation],
    viewport: (f32, f32),
    settings: &ExportSettings,
) -> Result<Vec<u8>> {
    let (width, height) = surface_size(viewport);
    let mut canvas = RasterCanvas::new(width, height).map_err(surface_error)?;

    let image = image::load_from_memory(file.bytes())?;
    canvas.draw_background(&image);
    replay(&mut canvas, annotations, settings);

    Ok(canvas.encode_png()?)
}
