//! Caption rasterization.
//!
//! Captions are rendered by building a one-element SVG document and handing
//! it to resvg. The font database holds a bundled DejaVu Sans face (the only
//! face available on wasm32) plus system fonts on native targets, and is
//! loaded once per process.

use std::sync::{Arc, OnceLock};

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use crate::geometry::Rgba;

/// Font stack for captions.
const CAPTION_FONT_FAMILY: &str = "DejaVu Sans, sans-serif";

const BUNDLED_FAMILY: &str = "DejaVu Sans";
const BUNDLED_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

static FONT_DATABASE: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

fn font_database() -> Arc<usvg::fontdb::Database> {
    FONT_DATABASE
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_font_data(BUNDLED_FONT.to_vec());
            #[cfg(not(target_arch = "wasm32"))]
            db.load_system_fonts();
            db.set_sans_serif_family(BUNDLED_FAMILY);
            log::debug!("Loaded {} font faces for captions", db.len());
            Arc::new(db)
        })
        .clone()
}

/// Build an SVG document of `width`x`height` holding a single caption.
///
/// Line breaks are flattened to spaces, matching how a 2D canvas draws text.
pub fn caption_svg(
    text: &str,
    x: f32,
    baseline_y: f32,
    size: f32,
    color: Rgba,
    width: u32,
    height: u32,
) -> String {
    let flattened = text.replace(['\r', '\n'], " ");
    let escaped = quick_xml::escape::escape(flattened.as_str());
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><text x="{x}" y="{baseline_y}" font-family="{CAPTION_FONT_FAMILY}" font-size="{size}" fill="{fill}" fill-opacity="{opacity}" xml:space="preserve">{escaped}</text></svg>"#,
        fill = color.to_hex(),
        opacity = color.opacity(),
    )
}

pub(crate) fn draw_caption(
    pixmap: &mut Pixmap,
    text: &str,
    x: f32,
    baseline_y: f32,
    size: f32,
    color: Rgba,
) {
    if text.trim().is_empty() {
        return;
    }

    let svg = caption_svg(
        text,
        x,
        baseline_y,
        size,
        color,
        pixmap.width(),
        pixmap.height(),
    );

    let mut options = usvg::Options::default();
    options.fontdb = font_database();

    match usvg::Tree::from_str(&svg, &options) {
        Ok(tree) => {
            resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
            log::trace!("Rendered caption {:?} at ({:.1}, {:.1})", text, x, baseline_y);
        }
        Err(e) => {
            log::error!("Failed to parse caption SVG: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_svg_escapes_markup() {
        let svg = caption_svg("a <b> & c", 10.0, 24.0, 14.0, Rgba::rgb(255, 0, 0), 100, 50);
        assert!(svg.contains("a &lt;b&gt; &amp; c"));
        assert!(svg.contains(r##"fill="#ff0000""##));
        assert!(svg.contains(r#"font-size="14""#));
    }

    #[test]
    fn test_caption_svg_flattens_newlines() {
        let svg = caption_svg("one\ntwo", 0.0, 14.0, 14.0, Rgba::rgb(0, 0, 0), 10, 10);
        assert!(svg.contains(">one two<"));
    }

    fn painted_pixels(pixmap: &Pixmap) -> usize {
        pixmap.pixels().iter().filter(|p| p.alpha() > 0).count()
    }

    #[test]
    fn test_bundled_font_is_loaded() {
        let db = font_database();
        let query = usvg::fontdb::Query {
            families: &[usvg::fontdb::Family::SansSerif],
            ..Default::default()
        };
        assert!(db.query(&query).is_some());
    }

    #[test]
    fn test_draw_caption_paints_text() {
        let mut pixmap = Pixmap::new(120, 30).unwrap();
        draw_caption(&mut pixmap, "HELLO", 2.0, 16.0, 14.0, Rgba::rgb(255, 0, 0));
        assert!(painted_pixels(&pixmap) > 20);

        // Glyphs sit above the baseline
        let below = (18..30)
            .flat_map(|y| (0..120).map(move |x| (x, y)))
            .filter(|&(x, y)| pixmap.pixel(x, y).is_some_and(|p| p.alpha() > 0))
            .count();
        assert_eq!(below, 0);
    }

    #[test]
    fn test_blank_caption_paints_nothing() {
        let mut pixmap = Pixmap::new(40, 20).unwrap();
        draw_caption(&mut pixmap, "  ", 2.0, 16.0, 14.0, Rgba::rgb(255, 0, 0));
        assert_eq!(painted_pixels(&pixmap), 0);
    }

    #[test]
    fn test_caption_svg_is_parseable() {
        let svg = caption_svg("hi", 1.0, 15.0, 14.0, Rgba::rgb(0, 0, 0), 40, 20);
        assert!(usvg::Tree::from_str(&svg, &usvg::Options::default()).is_ok());
    }
}
