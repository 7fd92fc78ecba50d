//! Browser façade.
//!
//! The page reads files and pointer events itself and forwards them here;
//! structured results cross the boundary as JSON strings.

use js_sys::{Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

use crate::annotation::Tool;
use crate::color::Color;
use crate::config::AnnotatorConfig;
use crate::export::ExportFormat;
use crate::session::Annotator;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // The host page may have installed a logger already
    if console_log::init_with_level(log::Level::Trace).is_err() {
        log::warn!("Logger already initialised");
    }
    log::info!("🚀 Ritease annotator loaded");
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Annotator session exposed to JavaScript.
#[wasm_bindgen]
pub struct WebAnnotator {
    inner: Annotator,
}

#[wasm_bindgen]
impl WebAnnotator {
    /// Create a session, optionally from a JSON configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WebAnnotator, JsValue> {
        let config = match config_json {
            Some(json) => AnnotatorConfig::from_json(&json).map_err(js_error)?,
            None => AnnotatorConfig::default(),
        };
        log::set_max_level(config.log_level.to_level_filter());
        Ok(Self {
            inner: Annotator::new(config),
        })
    }

    /// Load a file; returns the document id.
    pub fn upload(&mut self, mime: &str, bytes: &[u8]) -> Result<String, JsValue> {
        self.inner
            .upload(mime, bytes.to_vec())
            .map(|id| id.to_string())
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = "closeDocument")]
    pub fn close_document(&mut self) {
        self.inner.close_document();
    }

    /// JSON of the active document (`null` when none).
    #[wasm_bindgen(js_name = "documentJson")]
    pub fn document_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.document()).map_err(js_error)
    }

    /// Select a tool by name; an empty string clears the selection.
    #[wasm_bindgen(js_name = "selectTool")]
    pub fn select_tool(&mut self, name: &str) -> Result<(), JsValue> {
        let tool = if name.trim().is_empty() {
            None
        } else {
            Some(name.parse::<Tool>().map_err(js_error)?)
        };
        self.inner.select_tool(tool);
        Ok(())
    }

    #[wasm_bindgen(js_name = "setColor")]
    pub fn set_color(&mut self, color: &str) -> Result<(), JsValue> {
        let color = Color::parse(color).map_err(js_error)?;
        self.inner.set_color(color);
        Ok(())
    }

    /// Palette colors as a JSON array of `#RRGGBB` strings.
    #[wasm_bindgen(js_name = "paletteJson")]
    pub fn palette_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.palette()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "setViewport")]
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.inner.set_viewport(width, height);
    }

    #[wasm_bindgen(js_name = "pointerDown")]
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.inner.pointer_down(x, y);
    }

    #[wasm_bindgen(js_name = "pointerMove")]
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.inner.pointer_move(x, y);
    }

    #[wasm_bindgen(js_name = "pointerUp")]
    pub fn pointer_up(&mut self) {
        self.inner.pointer_up();
    }

    #[wasm_bindgen(js_name = "commitComment")]
    pub fn commit_comment(&mut self, text: &str) -> bool {
        self.inner.commit_comment(text)
    }

    #[wasm_bindgen(js_name = "nextPage")]
    pub fn next_page(&mut self) -> bool {
        self.inner.next_page()
    }

    #[wasm_bindgen(js_name = "previousPage")]
    pub fn previous_page(&mut self) -> bool {
        self.inner.previous_page()
    }

    #[wasm_bindgen(js_name = "currentPage")]
    pub fn current_page(&self) -> Option<u32> {
        self.inner.current_page()
    }

    #[wasm_bindgen(js_name = "renderSetJson")]
    pub fn render_set_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.render_set()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "overlaySvg")]
    pub fn overlay_svg(&self) -> Result<String, JsValue> {
        self.inner.overlay_svg().map_err(js_error)
    }

    #[wasm_bindgen(js_name = "annotationsJson")]
    pub fn annotations_json(&self) -> Result<String, JsValue> {
        self.inner.annotations_json().map_err(js_error)
    }

    /// Export the current page.
    ///
    /// Resolves to `{ fileName, mime, bytes }`; `format` is `"png"`, `"pdf"`
    /// or empty for the document's default.
    #[wasm_bindgen(js_name = "exportCurrentPage")]
    pub fn export_current_page(&mut self, format: &str) -> Result<JsValue, JsValue> {
        let format = if format.trim().is_empty() {
            None
        } else {
            Some(format.parse::<ExportFormat>().map_err(js_error)?)
        };
        let artifact = self.inner.export_current_page(format).map_err(js_error)?;

        let result = Object::new();
        Reflect::set(&result, &"fileName".into(), &artifact.file_name.as_str().into())?;
        Reflect::set(&result, &"mime".into(), &artifact.mime().into())?;
        Reflect::set(
            &result,
            &"bytes".into(),
            &Uint8Array::from(artifact.bytes.as_slice()).into(),
        )?;
        Ok(result.into())
    }

    /// Drain pending notifications as a JSON array.
    #[wasm_bindgen(js_name = "takeNotificationsJson")]
    pub fn take_notifications_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.take_notifications()).map_err(js_error)
    }
}
