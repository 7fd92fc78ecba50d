//! Pointer-event interpreter.
//!
//! Turns pointer down/move/up events into annotation records according to
//! the selected tool. Only the last store entry is touched during a drag.

use serde::Serialize;

use crate::annotation::{Annotation, AnnotationKind, BoundingBox, Point, Tool};
use crate::color::Color;
use crate::config::ToolSettings;
use crate::store::AnnotationStore;

/// A comment or text input that has been opened but not committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentDraft {
    pub kind: AnnotationKind,
    pub anchor: Point,
    pub width: f32,
    pub height: f32,
    /// Page the draft was opened on
    pub page: u32,
}

/// Gesture state for the active document.
#[derive(Debug, Clone)]
pub struct PointerInterpreter {
    tool: Option<Tool>,
    color: Color,
    /// Set on pointer-down for drag tools, cleared on pointer-up.
    drawing: bool,
    draft: Option<CommentDraft>,
    settings: ToolSettings,
}

impl PointerInterpreter {
    pub fn new(color: Color, settings: ToolSettings) -> Self {
        Self {
            tool: None,
            color,
            drawing: false,
            draft: None,
            settings,
        }
    }

    pub fn tool(&self) -> Option<Tool> {
        self.tool
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn draft(&self) -> Option<&CommentDraft> {
        self.draft.as_ref()
    }

    /// Select a tool (or none). Switching ends any drag and drops a pending draft.
    pub fn set_tool(&mut self, tool: Option<Tool>) {
        if self.tool == tool {
            return;
        }
        self.reset_gesture();
        self.tool = tool;
        log::debug!(
            "🛠️  Tool: {}",
            tool.map_or("none", |t| t.name())
        );
    }

    /// Color for annotations created from now on.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        log::debug!("🎨 Color: {}", color);
    }

    /// End any drag and drop any pending draft.
    pub fn reset_gesture(&mut self) {
        if self.drawing {
            log::debug!("Drag interrupted");
        }
        if self.draft.take().is_some() {
            log::debug!("💬 Discarded pending comment draft");
        }
        self.drawing = false;
    }

    pub fn pointer_down(&mut self, store: &mut AnnotationStore, page: u32, point: Point) {
        let Some(tool) = self.tool else {
            log::trace!("Pointer down ignored, no tool selected");
            return;
        };
        if self.drawing {
            log::warn!("Starting new drag while previous drag still active - forcing end");
            self.drawing = false;
        }

        let color = self.color;
        match tool {
            Tool::Draw | Tool::Signature => {
                let kind = if tool == Tool::Draw {
                    AnnotationKind::Draw
                } else {
                    AnnotationKind::Signature
                };
                store.add(Annotation::stroke(kind, point, color, page));
                self.drawing = true;
                log::debug!("✏️  Started {} at ({:.1}, {:.1})", tool.name(), point.x, point.y);
            }
            Tool::Highlight => {
                let bounds = BoundingBox::new(point.x, point.y, 0.0, self.settings.highlight_height);
                store.add(Annotation::boxed(AnnotationKind::Highlight, bounds, color, page));
                self.drawing = true;
                log::debug!("🖍️  Started highlight at ({:.1}, {:.1})", point.x, point.y);
            }
            Tool::Underline => {
                let bounds = BoundingBox::new(
                    point.x,
                    point.y,
                    self.settings.underline_width,
                    self.settings.underline_height,
                );
                store.add(Annotation::boxed(AnnotationKind::Underline, bounds, color, page));
                log::info!("✅ Created underline at ({:.1}, {:.1})", point.x, point.y);
            }
            Tool::Comment | Tool::Text => {
                let kind = if tool == Tool::Comment {
                    AnnotationKind::Comment
                } else {
                    AnnotationKind::Text
                };
                if self.draft.is_some() {
                    log::debug!("💬 Replacing uncommitted draft");
                }
                self.draft = Some(CommentDraft {
                    kind,
                    anchor: point,
                    width: self.settings.comment_width,
                    height: self.settings.comment_height,
                    page,
                });
                log::debug!("💬 Opened {} input at ({:.1}, {:.1})", tool.name(), point.x, point.y);
            }
            Tool::Erase => {
                let removed = store.erase_at(page, point, self.settings.erase_tolerance);
                if removed > 0 {
                    log::info!("🗑️  Erased {} annotation(s) on page {}", removed, page);
                }
            }
        }
    }

    pub fn pointer_move(&mut self, store: &mut AnnotationStore, point: Point) {
        if !self.drawing {
            return;
        }
        match self.tool {
            Some(Tool::Draw | Tool::Signature) => {
                store.mutate_last(|a| {
                    if let Some(path) = a.path.as_mut() {
                        path.line_to(point);
                    }
                });
            }
            Some(Tool::Highlight) => {
                store.mutate_last(|a| a.width = point.x - a.x);
            }
            _ => {}
        }
    }

    pub fn pointer_up(&mut self, store: &AnnotationStore) {
        if !self.drawing {
            return;
        }
        self.drawing = false;
        if let Some(last) = store.last() {
            log::info!("✅ Created {:?} annotation on page {}", last.kind, last.page);
        }
    }

    /// Commit the pending draft with `text`.
    ///
    /// Surrounding whitespace is trimmed and blank text discards the draft.
    /// Returns true if an annotation was added.
    pub fn commit_comment(&mut self, store: &mut AnnotationStore, text: &str) -> bool {
        let Some(draft) = self.draft.take() else {
            log::debug!("Commit ignored, no comment draft open");
            return false;
        };
        let text = text.trim();
        if text.is_empty() {
            log::debug!("💬 Discarded empty comment");
            return false;
        }

        let bounds = BoundingBox::new(draft.anchor.x, draft.anchor.y, draft.width, draft.height);
        store.add(Annotation::caption(draft.kind, bounds, text, self.color, draft.page));
        log::info!("✅ Created {:?} on page {}", draft.kind, draft.page);
        true
    }
}
