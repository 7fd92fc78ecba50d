//! Offscreen raster surface backed by a tiny-skia pixmap.

use image::DynamicImage;
use image::imageops::FilterType;
use tiny_skia::{ColorU8, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::error::{RenderError, Result};
use crate::geometry::{RectF, Rgba};
use crate::surface::Surface;
use crate::text;

/// Largest edge we are willing to allocate for an export raster.
pub const MAX_RASTER_DIMENSION: u32 = 16_384;

/// An offscreen canvas the size of the on-screen viewer.
pub struct RasterCanvas {
    pixmap: Pixmap,
}

impl RasterCanvas {
    /// Allocate a transparent canvas. Fails for zero-sized or oversized dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width > MAX_RASTER_DIMENSION || height > MAX_RASTER_DIMENSION {
            return Err(RenderError::SurfaceAllocation { width, height });
        }
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::SurfaceAllocation { width, height })?;
        log::debug!("Allocated {}x{} raster canvas", width, height);
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Paint `image` stretched over the whole canvas.
    pub fn draw_background(&mut self, image: &DynamicImage) {
        let scaled = image::imageops::resize(
            &image.to_rgba8(),
            self.pixmap.width(),
            self.pixmap.height(),
            FilterType::Triangle,
        );
        for (dst, src) in self.pixmap.pixels_mut().iter_mut().zip(scaled.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
    }

    /// Straight-alpha color of a single pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgba {
            r: c.red(),
            g: c.green(),
            b: c.blue(),
            a: c.alpha(),
        })
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::PngEncode(e.to_string()))
    }
}

fn solid_paint(color: Rgba, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = anti_alias;
    paint
}

impl Surface for RasterCanvas {
    fn viewport_size(&self) -> (f32, f32) {
        (self.pixmap.width() as f32, self.pixmap.height() as f32)
    }

    fn fill_rect(&mut self, rect: RectF, color: Rgba) {
        let rect = rect.normalized();
        let Some(rect) = Rect::from_xywh(rect.x, rect.y, rect.width, rect.height) else {
            return;
        };
        // Pixel-aligned fills must not bleed into neighbours
        let paint = solid_paint(color, false);
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn stroke_polyline(&mut self, points: &[(f32, f32)], color: Rgba, width: f32) {
        let [first, rest @ ..] = points else {
            return;
        };
        if rest.is_empty() {
            return;
        }

        let mut builder = PathBuilder::new();
        builder.move_to(first.0, first.1);
        for &(x, y) in rest {
            builder.line_to(x, y);
        }
        let Some(path) = builder.finish() else {
            return;
        };

        let paint = solid_paint(color, true);
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    fn fill_text(&mut self, text: &str, x: f32, baseline_y: f32, size: f32, color: Rgba) {
        text::draw_caption(&mut self.pixmap, text, x, baseline_y, size, color);
    }
}
