//! Document viewer state: current page, viewport, and the overlay render set.

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use serde::Serialize;

use crate::annotation::{AnnotationKind, BoundingBox};
use crate::color::Color;
use crate::config::ExportSettings;
use crate::error::{AnnotatorError, Result};
use crate::interpreter::CommentDraft;
use crate::store::AnnotationStore;

/// One visual element drawn over the current page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "element", rename_all = "snake_case")]
pub enum OverlayElement {
    /// Freehand stroke (draw, signature)
    Path {
        d: String,
        color: Color,
        stroke_width: f32,
    },
    /// Tinted box; bounds are normalized
    Highlight {
        bounds: BoundingBox,
        color: Color,
        opacity: f32,
    },
    /// Solid bar
    Underline { bounds: BoundingBox, color: Color },
    /// Pending text input
    CommentInput {
        kind: AnnotationKind,
        bounds: BoundingBox,
    },
}

/// Page navigation and viewport for the active document.
#[derive(Debug, Clone)]
pub struct DocumentViewer {
    current_page: u32,
    page_count: Option<u32>,
    viewport: (f32, f32),
}

impl Default for DocumentViewer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl DocumentViewer {
    /// Viewer on page 1 with an unset (zero) viewport.
    pub fn new(page_count: Option<u32>) -> Self {
        Self {
            current_page: 1,
            page_count,
            viewport: (0.0, 0.0),
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    /// Displayed size of the document in pixels.
    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width.max(0.0), height.max(0.0));
        log::debug!("📐 Viewport {:.0}x{:.0}", self.viewport.0, self.viewport.1);
    }

    /// Advance one page. Stays put on the last page when the count is known.
    pub fn next_page(&mut self) -> bool {
        if self.page_count.is_some_and(|count| self.current_page >= count) {
            return false;
        }
        self.current_page += 1;
        log::debug!("➡️  Page {}", self.current_page);
        true
    }

    /// Go back one page, never below page 1.
    pub fn previous_page(&mut self) -> bool {
        if self.current_page <= 1 {
            return false;
        }
        self.current_page -= 1;
        log::debug!("⬅️  Page {}", self.current_page);
        true
    }

    /// Elements for the current page, in store order, then the pending draft.
    pub fn render_set(
        &self,
        store: &AnnotationStore,
        draft: Option<&CommentDraft>,
        style: &ExportSettings,
    ) -> Vec<OverlayElement> {
        let mut elements: Vec<OverlayElement> = store
            .on_page(self.current_page)
            .filter_map(|a| match a.kind {
                AnnotationKind::Draw | AnnotationKind::Signature => {
                    a.path.as_ref().map(|path| OverlayElement::Path {
                        d: path.to_string(),
                        color: a.color,
                        stroke_width: style.stroke_width,
                    })
                }
                AnnotationKind::Highlight => Some(OverlayElement::Highlight {
                    bounds: a.bounds().normalized(),
                    color: a.color,
                    opacity: style.highlight_opacity,
                }),
                AnnotationKind::Underline => Some(OverlayElement::Underline {
                    bounds: a.bounds().normalized(),
                    color: a.color,
                }),
                // Committed captions only appear in exports
                AnnotationKind::Comment | AnnotationKind::Text => None,
            })
            .collect();

        if let Some(draft) = draft.filter(|d| d.page == self.current_page) {
            elements.push(OverlayElement::CommentInput {
                kind: draft.kind,
                bounds: BoundingBox::new(draft.anchor.x, draft.anchor.y, draft.width, draft.height),
            });
        }
        elements
    }
}

/// Serialize a render set as a standalone SVG document.
pub fn overlay_to_svg(elements: &[OverlayElement], width: f32, height: f32) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    let mut root = BytesStart::new("svg");
    root.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
    root.push_attribute(("width", width.to_string().as_str()));
    root.push_attribute(("height", height.to_string().as_str()));
    root.push_attribute(("viewBox", format!("0 0 {} {}", width, height).as_str()));
    writer.write_event(Event::Start(root)).map_err(overlay_error)?;

    for element in elements {
        let node = match element {
            OverlayElement::Path {
                d,
                color,
                stroke_width,
            } => {
                let mut node = BytesStart::new("path");
                node.push_attribute(("d", d.as_str()));
                node.push_attribute(("stroke", color.to_string().as_str()));
                node.push_attribute(("stroke-width", stroke_width.to_string().as_str()));
                node.push_attribute(("fill", "none"));
                node
            }
            OverlayElement::Highlight {
                bounds,
                color,
                opacity,
            } => {
                let mut node = rect_node(bounds);
                node.push_attribute(("fill", color.to_string().as_str()));
                node.push_attribute(("opacity", opacity.to_string().as_str()));
                node
            }
            OverlayElement::Underline { bounds, color } => {
                let mut node = rect_node(bounds);
                node.push_attribute(("fill", color.to_string().as_str()));
                node
            }
            OverlayElement::CommentInput { bounds, .. } => {
                let mut node = rect_node(bounds);
                node.push_attribute(("class", "comment-input"));
                node.push_attribute(("fill", "white"));
                node.push_attribute(("stroke", "#999999"));
                node.push_attribute(("stroke-dasharray", "4 2"));
                node
            }
        };
        writer
            .write_event(Event::Empty(node))
            .map_err(overlay_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("svg")))
        .map_err(overlay_error)?;
    String::from_utf8(writer.into_inner()).map_err(overlay_error)
}

fn overlay_error(err: impl std::fmt::Display) -> AnnotatorError {
    AnnotatorError::Overlay(err.to_string())
}

fn rect_node(bounds: &BoundingBox) -> BytesStart<'static> {
    let mut node = BytesStart::new("rect");
    node.push_attribute(("x", bounds.x.to_string().as_str()));
    node.push_attribute(("y", bounds.y.to_string().as_str()));
    node.push_attribute(("width", bounds.width.to_string().as_str()));
    node.push_attribute(("height", bounds.height.to_string().as_str()));
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, Point};
    use pretty_assertions::assert_eq;

    fn store_with_pages() -> AnnotationStore {
        let mut store = AnnotationStore::new();
        store.add(Annotation::boxed(
            AnnotationKind::Underline,
            BoundingBox::new(50.0, 50.0, 100.0, 2.0),
            Color::default(),
            1,
        ));
        store.add(Annotation::boxed(
            AnnotationKind::Highlight,
            BoundingBox::new(10.0, 10.0, -5.0, 20.0),
            Color::default(),
            2,
        ));
        store.add(Annotation::caption(
            AnnotationKind::Comment,
            BoundingBox::new(0.0, 0.0, 200.0, 20.0),
            "note",
            Color::default(),
            1,
        ));
        store
    }

    #[test]
    fn test_page_navigation_bounds() {
        let mut viewer = DocumentViewer::new(Some(2));
        assert!(!viewer.previous_page());
        assert!(viewer.next_page());
        assert!(!viewer.next_page());
        assert_eq!(viewer.current_page(), 2);
        assert!(viewer.previous_page());
        assert_eq!(viewer.current_page(), 1);
    }

    #[test]
    fn test_unknown_page_count_is_unbounded() {
        let mut viewer = DocumentViewer::new(None);
        for _ in 0..4 {
            assert!(viewer.next_page());
        }
        assert_eq!(viewer.current_page(), 5);
    }

    #[test]
    fn test_render_set_follows_current_page() {
        let store = store_with_pages();
        let style = ExportSettings::default();
        let mut viewer = DocumentViewer::new(Some(2));

        let page_one = viewer.render_set(&store, None, &style);
        assert_eq!(page_one.len(), 1);
        assert!(matches!(page_one[0], OverlayElement::Underline { .. }));

        viewer.next_page();
        let page_two = viewer.render_set(&store, None, &style);
        assert_eq!(
            page_two,
            vec![OverlayElement::Highlight {
                bounds: BoundingBox::new(5.0, 10.0, 5.0, 20.0),
                color: Color::default(),
                opacity: 0.4,
            }]
        );

        viewer.previous_page();
        assert_eq!(viewer.render_set(&store, None, &style), page_one);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_draft_only_on_its_page() {
        let store = AnnotationStore::new();
        let style = ExportSettings::default();
        let mut viewer = DocumentViewer::new(Some(3));
        let draft = CommentDraft {
            kind: AnnotationKind::Comment,
            anchor: Point::new(4.0, 8.0),
            width: 200.0,
            height: 32.0,
            page: 1,
        };

        let set = viewer.render_set(&store, Some(&draft), &style);
        assert_eq!(
            set,
            vec![OverlayElement::CommentInput {
                kind: AnnotationKind::Comment,
                bounds: BoundingBox::new(4.0, 8.0, 200.0, 32.0),
            }]
        );
        viewer.next_page();
        assert!(viewer.render_set(&store, Some(&draft), &style).is_empty());
    }

    #[test]
    fn test_svg_overlay() {
        let mut store = store_with_pages();
        let mut stroke = Annotation::stroke(
            AnnotationKind::Draw,
            Point::new(1.0, 2.0),
            Color::new(0xFF, 0x6B, 0x6B),
            1,
        );
        if let Some(path) = stroke.path.as_mut() {
            path.line_to(Point::new(3.0, 4.0));
        }
        store.add(stroke);

        let viewer = DocumentViewer::new(Some(2));
        let set = viewer.render_set(&store, None, &ExportSettings::default());
        let svg = overlay_to_svg(&set, 300.0, 200.0).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 300 200""#));
        assert!(svg.contains(r##"<path d="M1,2 L3,4" stroke="#FF6B6B" stroke-width="2" fill="none"/>"##));
        assert!(svg.contains(r##"<rect x="50" y="50" width="100" height="2" fill="#FFFF00"/>"##));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
