//! Single-page PDF assembly.
//!
//! A [`PdfPage`] is either a blank page carrying a stretched background image
//! or one page cut out of an existing PDF. Annotation primitives are appended
//! as an extra content stream, mapped from viewport pixels onto the page box
//! (PDF origin is bottom-left, so y is flipped).

use std::collections::BTreeMap;

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::error::{RenderError, Result};
use crate::geometry::{RectF, Rgba};
use crate::surface::Surface;

/// Default page width (A4) in points.
pub const A4_WIDTH_PT: f32 = 595.28;
/// Default page height (A4) in points.
pub const A4_HEIGHT_PT: f32 = 841.89;

// Resource names are prefixed so they never shadow names in a source page.
const FONT_RESOURCE: &str = "RtF1";
const IMAGE_RESOURCE: &str = "RtIm0";

/// Number of pages in a PDF.
pub fn page_count(pdf_bytes: &[u8]) -> Result<u32> {
    let doc = Document::load_mem(pdf_bytes)?;
    Ok(doc.get_pages().len() as u32)
}

/// Page box in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PageBox {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl PageBox {
    fn a4() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: A4_WIDTH_PT,
            height: A4_HEIGHT_PT,
        }
    }
}

/// A one-page PDF under construction.
pub struct PdfPage {
    doc: Document,
    page_id: ObjectId,
    page_box: PageBox,
    viewport: (f32, f32),
    operations: Vec<Operation>,
    image_id: Option<ObjectId>,
    font_id: Option<ObjectId>,
    alpha_states: BTreeMap<u8, ObjectId>,
}

impl PdfPage {
    /// Create a new document with one empty page of the given size.
    pub fn blank(width_pt: f32, height_pt: f32, viewport: (f32, f32)) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                width_pt.into(),
                height_pt.into(),
            ],
            "Resources" => dictionary! {},
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        Self::with_document(
            doc,
            page_id,
            PageBox {
                x: 0.0,
                y: 0.0,
                width: width_pt,
                height: height_pt,
            },
            viewport,
        )
    }

    /// Load `pdf_bytes` and keep only page `page` (1-based).
    pub fn from_source(pdf_bytes: &[u8], page: u32, viewport: (f32, f32)) -> Result<Self> {
        let mut doc = Document::load_mem(pdf_bytes)?;
        let pages = doc.get_pages();
        let count = pages.len() as u32;
        let Some(&page_id) = pages.get(&page) else {
            return Err(RenderError::PageOutOfRange { page, count });
        };

        let others: Vec<u32> = pages.keys().copied().filter(|&n| n != page).collect();
        if !others.is_empty() {
            doc.delete_pages(&others);
            doc.prune_objects();
            log::debug!("Dropped {} pages, keeping page {}", others.len(), page);
        }

        let page_box = media_box(&doc, page_id).unwrap_or_else(|| {
            log::warn!("Page {} has no usable MediaBox, assuming A4", page);
            PageBox::a4()
        });

        Ok(Self::with_document(doc, page_id, page_box, viewport))
    }

    fn with_document(
        doc: Document,
        page_id: ObjectId,
        page_box: PageBox,
        viewport: (f32, f32),
    ) -> Self {
        Self {
            doc,
            page_id,
            page_box,
            viewport,
            operations: Vec::new(),
            image_id: None,
            font_id: None,
            alpha_states: BTreeMap::new(),
        }
    }

    /// Page size in points.
    pub fn page_size(&self) -> (f32, f32) {
        (self.page_box.width, self.page_box.height)
    }

    /// Draw `image` stretched over the whole page (embedded as JPEG).
    pub fn place_image(&mut self, image: &DynamicImage, jpeg_quality: u8) -> Result<()> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, jpeg_quality).encode_image(&rgb)?;

        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        );
        self.image_id = Some(self.doc.add_object(stream));

        let PageBox {
            x,
            y,
            width: w,
            height: h,
        } = self.page_box;
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    w.into(),
                    Object::Integer(0),
                    Object::Integer(0),
                    h.into(),
                    x.into(),
                    y.into(),
                ],
            ),
            Operation::new("Do", vec![name(IMAGE_RESOURCE)]),
            Operation::new("Q", vec![]),
        ]);
        log::debug!("Placed {}x{} background image on PDF page", width, height);
        Ok(())
    }

    /// Write resources and the annotation stream, then serialize once.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if let Some(id) = self.image_id {
            self.register_resource("XObject", IMAGE_RESOURCE, id)?;
        }
        if let Some(id) = self.font_id {
            self.register_resource("Font", FONT_RESOURCE, id)?;
        }
        let states: Vec<(u8, ObjectId)> = self.alpha_states.iter().map(|(a, id)| (*a, *id)).collect();
        for (alpha, id) in states {
            self.register_resource("ExtGState", &alpha_state_name(alpha), id)?;
        }

        let content = Content {
            operations: std::mem::take(&mut self.operations),
        };
        let bytes = content
            .encode()
            .map_err(|e| RenderError::PdfWrite(e.to_string()))?;
        self.append_contents(bytes)?;

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| RenderError::PdfWrite(e.to_string()))?;
        log::debug!("Serialized PDF page ({} bytes)", buffer.len());
        Ok(buffer)
    }

    /// Viewport pixel to PDF user space.
    fn map_point(&self, x: f32, y: f32) -> (f32, f32) {
        let (sx, sy) = self.scale();
        (
            self.page_box.x + x * sx,
            self.page_box.y + self.page_box.height - y * sy,
        )
    }

    fn scale(&self) -> (f32, f32) {
        (
            self.page_box.width / self.viewport.0.max(1.0),
            self.page_box.height / self.viewport.1.max(1.0),
        )
    }

    fn font(&mut self) -> ObjectId {
        if let Some(id) = self.font_id {
            return id;
        }
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        self.font_id = Some(id);
        id
    }

    /// Push a `gs` operator selecting the color's opacity, if it has one.
    fn push_opacity(&mut self, color: Rgba) {
        if color.is_opaque() {
            return;
        }
        if !self.alpha_states.contains_key(&color.a) {
            let opacity = color.opacity();
            let id = self.doc.add_object(dictionary! {
                "Type" => "ExtGState",
                "ca" => opacity,
                "CA" => opacity,
            });
            self.alpha_states.insert(color.a, id);
        }
        self.operations.push(Operation::new(
            "gs",
            vec![name(&alpha_state_name(color.a))],
        ));
    }

    /// Add `name -> target` to the page's `category` resource dictionary.
    ///
    /// Resources are copied inline onto the page so inherited or shared
    /// dictionaries are never modified.
    fn register_resource(&mut self, category: &str, name: &str, target: ObjectId) -> Result<()> {
        let mut resources = self.page_resources()?;
        let mut entries = resources
            .get(category.as_bytes())
            .ok()
            .and_then(|obj| resolve_dict(&self.doc, obj))
            .unwrap_or_else(Dictionary::new);
        entries.set(name, Object::Reference(target));
        resources.set(category, Object::Dictionary(entries));

        let page = self
            .doc
            .get_object_mut(self.page_id)
            .and_then(|o| o.as_dict_mut())?;
        page.set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    fn page_resources(&self) -> Result<Dictionary> {
        let mut current = Some(self.page_id);
        while let Some(id) = current {
            let dict = self.doc.get_dictionary(id)?;
            if let Ok(obj) = dict.get(b"Resources") {
                return resolve_dict(&self.doc, obj).ok_or_else(|| {
                    RenderError::MalformedPdf("Resources is not a dictionary".to_string())
                });
            }
            current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
        }
        Ok(Dictionary::new())
    }

    /// Append `bytes` as a new content stream.
    ///
    /// Existing page content is bracketed with `q`/`Q` so whatever graphics
    /// state it leaves behind does not leak into the annotations.
    fn append_contents(&mut self, bytes: Vec<u8>) -> Result<()> {
        let existing = {
            let page = self.doc.get_dictionary(self.page_id)?;
            match page.get(b"Contents") {
                Ok(Object::Reference(id)) => vec![Object::Reference(*id)],
                Ok(Object::Array(items)) => items.clone(),
                _ => Vec::new(),
            }
        };

        let mut contents = Vec::with_capacity(existing.len() + 3);
        if !existing.is_empty() {
            let save_id = self
                .doc
                .add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
            let restore_id = self
                .doc
                .add_object(Stream::new(dictionary! {}, b"Q\n".to_vec()));
            contents.push(Object::Reference(save_id));
            contents.extend(existing);
            contents.push(Object::Reference(restore_id));
        }
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, bytes));
        contents.push(Object::Reference(content_id));

        let page = self
            .doc
            .get_object_mut(self.page_id)
            .and_then(|o| o.as_dict_mut())?;
        page.set("Contents", contents);
        Ok(())
    }
}

impl Surface for PdfPage {
    fn viewport_size(&self) -> (f32, f32) {
        self.viewport
    }

    fn fill_rect(&mut self, rect: RectF, color: Rgba) {
        let rect = rect.normalized();
        if rect.is_empty() {
            return;
        }
        let (sx, sy) = self.scale();
        // PDF rectangles are anchored at their lower-left corner
        let (x, y) = self.map_point(rect.x, rect.y + rect.height);
        let (r, g, b) = color.to_unit_rgb();

        self.operations.push(Operation::new("q", vec![]));
        self.push_opacity(color);
        self.operations.extend([
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new(
                "re",
                vec![
                    x.into(),
                    y.into(),
                    (rect.width * sx).into(),
                    (rect.height * sy).into(),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn stroke_polyline(&mut self, points: &[(f32, f32)], color: Rgba, width: f32) {
        if points.len() < 2 {
            return;
        }
        let (sx, _) = self.scale();
        let (r, g, b) = color.to_unit_rgb();

        self.operations.push(Operation::new("q", vec![]));
        self.push_opacity(color);
        self.operations.extend([
            Operation::new("RG", vec![r.into(), g.into(), b.into()]),
            Operation::new("w", vec![(width * sx).into()]),
        ]);
        for (i, &(px, py)) in points.iter().enumerate() {
            let (x, y) = self.map_point(px, py);
            let op = if i == 0 { "m" } else { "l" };
            self.operations
                .push(Operation::new(op, vec![x.into(), y.into()]));
        }
        self.operations.extend([
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn fill_text(&mut self, text: &str, x: f32, baseline_y: f32, size: f32, color: Rgba) {
        if text.trim().is_empty() {
            return;
        }
        self.font();
        let (_, sy) = self.scale();
        let (px, py) = self.map_point(x, baseline_y);
        let (r, g, b) = color.to_unit_rgb();

        self.operations.push(Operation::new("q", vec![]));
        self.push_opacity(color);
        self.operations.extend([
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![name(FONT_RESOURCE), (size * sy).into()]),
            Operation::new("Td", vec![px.into(), py.into()]),
            Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

fn alpha_state_name(alpha: u8) -> String {
    format!("RtGs{}", alpha)
}

/// Best-effort single-byte encoding for the standard Helvetica font.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\r' | '\n' => b' ',
            c if (c as u32) < 0x100 => c as u8,
            _ => b'?',
        })
        .collect()
}

fn resolve_dict(doc: &Document, obj: &Object) -> Option<Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict.clone()),
        Object::Reference(id) => doc.get_dictionary(*id).ok().cloned(),
        _ => None,
    }
}

/// MediaBox of a page, following `Parent` links for inherited boxes.
fn media_box(doc: &Document, page_id: ObjectId) -> Option<PageBox> {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let dict = doc.get_dictionary(id).ok()?;
        if let Ok(raw) = dict.get(b"MediaBox") {
            let resolved = match raw {
                Object::Reference(id) => doc.get_object(*id).ok()?,
                other => other,
            };
            let values: Vec<f32> = resolved
                .as_array()
                .ok()?
                .iter()
                .filter_map(number)
                .collect();
            let [llx, lly, urx, ury] = values[..] else {
                return None;
            };
            return Some(PageBox {
                x: llx.min(urx),
                y: lly.min(ury),
                width: (urx - llx).abs(),
                height: (ury - lly).abs(),
            });
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }
    None
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f),
        _ => None,
    }
}
