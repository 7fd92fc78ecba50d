//! The top-level annotator session.
//!
//! [`Annotator`] owns the active document together with its annotation store,
//! the pointer interpreter, and the notification queue. Replacing or closing
//! the document drops its annotations.

#[cfg(test)]
mod tests;

use crate::annotation::{Annotation, Point, Tool};
use crate::color::{Color, Palette};
use crate::config::AnnotatorConfig;
use crate::constants::messages;
use crate::error::{AnnotatorError, Result};
use crate::export::{ExportArtifact, ExportFormat, Exporter};
use crate::interpreter::{CommentDraft, PointerInterpreter};
use crate::notify::Notification;
use crate::store::AnnotationStore;
use crate::upload::{DocumentId, UploadedFile};
use crate::viewer::{DocumentViewer, OverlayElement, overlay_to_svg};

/// A loaded document and everything scoped to it.
#[derive(Debug)]
struct OpenDocument {
    file: UploadedFile,
    store: AnnotationStore,
    viewer: DocumentViewer,
}

/// Annotator state for one user session.
#[derive(Debug)]
pub struct Annotator {
    config: AnnotatorConfig,
    document: Option<OpenDocument>,
    interpreter: PointerInterpreter,
    viewport: (f32, f32),
    notifications: Vec<Notification>,
    next_document_id: u64,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(AnnotatorConfig::default())
    }
}

impl Annotator {
    pub fn new(config: AnnotatorConfig) -> Self {
        let interpreter = PointerInterpreter::new(config.palette.default, config.tools.clone());
        Self {
            config,
            document: None,
            interpreter,
            viewport: (0.0, 0.0),
            notifications: Vec::new(),
            next_document_id: 1,
        }
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Load a new document, replacing the current one and its annotations.
    ///
    /// Rejected types leave the session untouched and queue an error.
    pub fn upload(&mut self, mime: &str, bytes: Vec<u8>) -> Result<DocumentId> {
        let id = DocumentId(self.next_document_id);
        match UploadedFile::from_bytes(id, mime, bytes) {
            Ok(file) => Ok(self.open(file)),
            Err(e) => Err(self.reject_upload(e)),
        }
    }

    /// Same as [`Annotator::upload`] for a base64 `data:` URI.
    pub fn upload_data_url(&mut self, url: &str) -> Result<DocumentId> {
        let id = DocumentId(self.next_document_id);
        match UploadedFile::from_data_url(id, url) {
            Ok(file) => Ok(self.open(file)),
            Err(e) => Err(self.reject_upload(e)),
        }
    }

    fn open(&mut self, file: UploadedFile) -> DocumentId {
        self.next_document_id += 1;
        let id = file.id;
        let mut viewer = DocumentViewer::new(file.page_count);
        viewer.set_viewport(self.viewport.0, self.viewport.1);

        if let Some(previous) = self.document.take() {
            log::debug!(
                "Dropping {} with {} annotations",
                previous.file.id,
                previous.store.len()
            );
        }
        self.interpreter.reset_gesture();
        log::info!(
            "📂 Loaded {} ({}, {} pages)",
            id,
            file.mime,
            file.page_count.map_or("unknown".to_string(), |n| n.to_string())
        );
        self.document = Some(OpenDocument {
            file,
            store: AnnotationStore::new(),
            viewer,
        });
        self.notify(Notification::success(messages::UPLOAD_SUCCESS));
        id
    }

    fn reject_upload(&mut self, err: AnnotatorError) -> AnnotatorError {
        log::warn!("⚠️  Upload rejected: {}", err);
        let message = match &err {
            AnnotatorError::UnsupportedFileType { .. } => messages::UNSUPPORTED_FILE.to_string(),
            other => other.to_string(),
        };
        self.notify(Notification::error(message));
        err
    }

    /// Close the document and drop its annotations.
    pub fn close_document(&mut self) {
        if let Some(doc) = self.document.take() {
            self.interpreter.reset_gesture();
            log::info!("Closed {}", doc.file.id);
        }
    }

    pub fn document(&self) -> Option<&UploadedFile> {
        self.document.as_ref().map(|d| &d.file)
    }

    // ========================================================================
    // Tools
    // ========================================================================

    pub fn select_tool(&mut self, tool: Option<Tool>) {
        self.interpreter.set_tool(tool);
    }

    pub fn tool(&self) -> Option<Tool> {
        self.interpreter.tool()
    }

    pub fn set_color(&mut self, color: Color) {
        self.interpreter.set_color(color);
    }

    pub fn color(&self) -> Color {
        self.interpreter.color()
    }

    pub fn palette(&self) -> &Palette {
        &self.config.palette
    }

    // ========================================================================
    // Pointer events
    // ========================================================================

    /// Displayed size of the document, used for exports.
    ///
    /// Negative and non-finite sizes are stored as zero.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        let side = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        self.viewport = (side(width), side(height));
        if let Some(doc) = self.document.as_mut() {
            doc.viewer.set_viewport(self.viewport.0, self.viewport.1);
        }
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    /// Host coordinates; NaN or infinite positions are dropped.
    fn pointer_point(x: f32, y: f32) -> Option<Point> {
        if x.is_finite() && y.is_finite() {
            Some(Point::new(x, y))
        } else {
            log::warn!("⚠️  Ignoring pointer event at ({}, {})", x, y);
            None
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        let Some(point) = Self::pointer_point(x, y) else {
            return;
        };
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        let page = doc.viewer.current_page();
        self.interpreter.pointer_down(&mut doc.store, page, point);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let Some(point) = Self::pointer_point(x, y) else {
            return;
        };
        if let Some(doc) = self.document.as_mut() {
            self.interpreter.pointer_move(&mut doc.store, point);
        }
    }

    pub fn pointer_up(&mut self) {
        if let Some(doc) = self.document.as_ref() {
            self.interpreter.pointer_up(&doc.store);
        }
    }

    /// Commit the open comment input. Returns true if an annotation was added.
    pub fn commit_comment(&mut self, text: &str) -> bool {
        match self.document.as_mut() {
            Some(doc) => self.interpreter.commit_comment(&mut doc.store, text),
            None => false,
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.interpreter.is_drawing()
    }

    pub fn draft(&self) -> Option<&CommentDraft> {
        self.interpreter.draft()
    }

    // ========================================================================
    // Pages
    // ========================================================================

    pub fn next_page(&mut self) -> bool {
        self.change_page(DocumentViewer::next_page)
    }

    pub fn previous_page(&mut self) -> bool {
        self.change_page(DocumentViewer::previous_page)
    }

    fn change_page(&mut self, step: fn(&mut DocumentViewer) -> bool) -> bool {
        let Some(doc) = self.document.as_mut() else {
            return false;
        };
        let changed = step(&mut doc.viewer);
        if changed {
            self.interpreter.reset_gesture();
        }
        changed
    }

    pub fn current_page(&self) -> Option<u32> {
        self.document.as_ref().map(|d| d.viewer.current_page())
    }

    pub fn page_count(&self) -> Option<u32> {
        self.document.as_ref().and_then(|d| d.viewer.page_count())
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// All annotations of the active document, every page.
    pub fn annotations(&self) -> &[Annotation] {
        self.document
            .as_ref()
            .map(|d| d.store.all())
            .unwrap_or_default()
    }

    pub fn annotations_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.annotations())?)
    }

    /// Overlay elements for the current page.
    pub fn render_set(&self) -> Vec<OverlayElement> {
        match &self.document {
            Some(doc) => doc.viewer.render_set(
                &doc.store,
                self.interpreter.draft(),
                &self.config.export,
            ),
            None => Vec::new(),
        }
    }

    /// Current overlay as a standalone SVG document sized to the viewport.
    pub fn overlay_svg(&self) -> Result<String> {
        overlay_to_svg(&self.render_set(), self.viewport.0, self.viewport.1)
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Export the current page; `format` defaults by document kind.
    ///
    /// Failures queue an error notification and produce no artifact.
    pub fn export_current_page(&mut self, format: Option<ExportFormat>) -> Result<ExportArtifact> {
        let Some(doc) = self.document.as_ref() else {
            log::warn!("⚠️  Export requested with no document loaded");
            self.notify(Notification::error(messages::NO_DOCUMENT));
            return Err(AnnotatorError::export_precondition(messages::NO_DOCUMENT));
        };

        let result = Exporter::new(&self.config.export).export_page(
            &doc.file,
            &doc.store,
            doc.viewer.current_page(),
            doc.viewer.viewport(),
            format,
        );
        if let Err(e) = &result {
            log::error!("❌ Export failed: {}", e);
            let message = match e {
                AnnotatorError::ExportPrecondition(reason) => reason.clone(),
                other => other.to_string(),
            };
            self.notify(Notification::error(message));
        }
        result
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Drain queued notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}
