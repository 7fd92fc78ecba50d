use crate::geometry::{RectF, Rgba};

/// A drawing target that annotation primitives are replayed onto.
///
/// All coordinates are viewport pixels with the origin at the top-left.
pub trait Surface {
    /// Viewport size the surface maps from, in pixels.
    fn viewport_size(&self) -> (f32, f32);

    /// Fill a rectangle. Negative extents are normalized.
    fn fill_rect(&mut self, rect: RectF, color: Rgba);

    /// Stroke an open polyline. Fewer than two points draws nothing.
    fn stroke_polyline(&mut self, points: &[(f32, f32)], color: Rgba, width: f32);

    /// Draw a single line of text with its baseline at `baseline_y`.
    fn fill_text(&mut self, text: &str, x: f32, baseline_y: f32, size: f32, color: Rgba);
}
