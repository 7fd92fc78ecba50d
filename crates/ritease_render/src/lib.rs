//! Rendering backends for the Ritease annotator.
//!
//! Annotations are replayed through the [`Surface`] trait, which has two
//! implementations:
//!
//! - [`RasterCanvas`]: an offscreen tiny-skia pixmap, encoded to PNG.
//!   Captions are rasterized through resvg with the system font database.
//! - [`PdfPage`]: a single PDF page assembled with lopdf, either a blank page
//!   with a stretched background image or one page lifted out of a source PDF.
//!
//! Surfaces take coordinates in viewport pixels (origin top-left); each
//! backend maps them onto its own output space.

pub mod error;
mod geometry;
pub mod pdf;
mod raster;
mod surface;
mod text;

pub use error::{RenderError, Result};
pub use geometry::{RectF, Rgba};
pub use pdf::{A4_HEIGHT_PT, A4_WIDTH_PT, PdfPage, page_count};
pub use raster::RasterCanvas;
pub use surface::Surface;
pub use text::caption_svg;
