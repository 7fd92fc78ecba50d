//! Ritease - document annotation engine
//!
//! Upload a PDF or image, mark it up with strokes, highlights, underlines,
//! signatures and comments, and export the annotated page as PNG or PDF.
//! [`Annotator`] is the entry point; the browser drives it through the wasm
//! façade and `ritease-native` drives it from gesture scripts.

pub mod annotation;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod interpreter;
pub mod notify;
pub mod script;
pub mod session;
pub mod store;
pub mod upload;
pub mod viewer;

pub use annotation::{Annotation, AnnotationKind, BoundingBox, Point, StrokePath, Tool};
pub use color::{Color, Palette};
pub use config::{AnnotatorConfig, ConfigError, LogLevel};
pub use error::{AnnotatorError, Result};
pub use export::{ExportArtifact, ExportFormat};
pub use notify::{Notification, NotificationLevel};
pub use script::GestureScript;
pub use session::Annotator;
pub use upload::{DocumentId, FileKind, UploadedFile};
pub use viewer::OverlayElement;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
