//! Export of the current page to a downloadable artifact.
//!
//! Annotations are replayed onto a [`Surface`]: a raster canvas for PNG
//! output or a PDF page for PDF output. Only current-page annotations are
//! drawn and the artifact always covers a single page.

mod pdf;
mod raster;


use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ritease_render::{RenderError, Rgba, Surface};
use serde::{Deserialize, Serialize};

use crate::annotation::{Annotation, AnnotationKind};
use crate::config::ExportSettings;
use crate::constants::messages;
use crate::error::{AnnotatorError, Result};
use crate::store::AnnotationStore;
use crate::upload::{FileKind, UploadedFile, encode_data_url};

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    /// PNG for images, PDF for PDFs.
    pub fn default_for(kind: FileKind) -> Self {
        match kind {
            FileKind::Image => ExportFormat::Png,
            FileKind::Pdf => ExportFormat::Pdf,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("Unknown export format: {other} (expected png or pdf)")),
        }
    }
}

/// A finished export, ready to download or write to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    /// `data:` URI suitable for a download link.
    pub fn data_url(&self) -> String {
        encode_data_url(self.mime(), &self.bytes)
    }

    /// Write into `dir` under the artifact's file name.
    pub fn write_to_dir(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Renders one page of a document with its annotations.
pub struct Exporter<'a> {
    settings: &'a ExportSettings,
}

impl<'a> Exporter<'a> {
    pub fn new(settings: &'a ExportSettings) -> Self {
        Self { settings }
    }

    /// Export `page` of `file` as seen in a `viewport`-sized view.
    ///
    /// `format` defaults by document kind. PNG output of a PDF is rejected.
    pub fn export_page(
        &self,
        file: &UploadedFile,
        store: &AnnotationStore,
        page: u32,
        viewport: (f32, f32),
        format: Option<ExportFormat>,
    ) -> Result<ExportArtifact> {
        let format = format.unwrap_or_else(|| ExportFormat::default_for(file.kind));
        let annotations: Vec<&Annotation> = store.on_page(page).collect();
        log::debug!(
            "Exporting page {} of {} as {} ({} annotations)",
            page,
            file.id,
            format,
            annotations.len()
        );

        let (bytes, file_name) = match (format, file.kind) {
            (ExportFormat::Png, FileKind::Image) => (
                raster::render_png(file, &annotations, viewport, self.settings)?,
                &self.settings.png_file_name,
            ),
            (ExportFormat::Png, FileKind::Pdf) => {
                return Err(AnnotatorError::UnsupportedExport {
                    document: FileKind::Pdf.name(),
                    format: ExportFormat::Png.name(),
                });
            }
            (ExportFormat::Pdf, _) => (
                pdf::render_pdf(file, &annotations, page, viewport, self.settings)?,
                &self.settings.pdf_file_name,
            ),
        };

        log::info!("📦 Exported {} ({} bytes)", file_name, bytes.len());
        Ok(ExportArtifact {
            file_name: file_name.clone(),
            format,
            bytes,
        })
    }
}

/// Draw `annotations` in order onto `surface`.
pub(crate) fn replay<S: Surface>(
    surface: &mut S,
    annotations: &[&Annotation],
    settings: &ExportSettings,
) {
    for annotation in annotations {
        let color = Rgba::from(annotation.color);
        match annotation.kind {
            AnnotationKind::Draw | AnnotationKind::Signature => {
                if let Some(path) = &annotation.path {
                    let points: Vec<(f32, f32)> =
                        path.points().into_iter().map(Into::into).collect();
                    surface.stroke_polyline(&points, color, settings.stroke_width);
                }
            }
            AnnotationKind::Highlight => {
                surface.fill_rect(
                    annotation.bounds().to_rect(),
                    color.with_opacity(settings.highlight_opacity),
                );
            }
            AnnotationKind::Underline => {
                surface.fill_rect(annotation.bounds().to_rect(), color);
            }
            AnnotationKind::Comment | AnnotationKind::Text => {
                if let Some(text) = &annotation.text {
                    surface.fill_text(
                        text,
                        annotation.x,
                        annotation.y + settings.caption_size,
                        settings.caption_size,
                        color,
                    );
                }
            }
        }
    }
}

/// Pixel size of the offscreen surface for a viewport.
fn surface_size(viewport: (f32, f32)) -> (u32, u32) {
    let side = |v: f32| {
        if v.is_finite() && v >= 1.0 {
            v.round() as u32
        } else {
            0
        }
    };
    (side(viewport.0), side(viewport.1))
}

/// Surface allocation failures are export preconditions, not render faults.
fn surface_error(err: RenderError) -> AnnotatorError {
    match err {
        RenderError::SurfaceAllocation { width, height } => {
            log::error!("❌ Cannot allocate {}x{} export surface", width, height);
            AnnotatorError::export_precondition(messages::NO_SURFACE)
        }
        other => other.into(),
    }
}
