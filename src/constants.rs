//! Global constants for the annotator.

/// Colors offered by the color picker.
pub const PALETTE: [&str; 5] = ["#FFFF00", "#FF6B6B", "#4ECDC4", "#A8DADC", "#FCA311"];

/// Color selected on startup.
pub const DEFAULT_COLOR: &str = "#FFFF00";

/// Height of a freshly started highlight box.
pub const HIGHLIGHT_HEIGHT: f32 = 20.0;

/// Underline bar width.
pub const UNDERLINE_WIDTH: f32 = 100.0;

/// Underline bar height.
pub const UNDERLINE_HEIGHT: f32 = 2.0;

/// Width of the comment input and of committed comment boxes.
pub const COMMENT_WIDTH: f32 = 200.0;

/// Height of a committed comment box.
pub const COMMENT_HEIGHT: f32 = 20.0;

/// Maximum distance (viewport pixels) at which erase hits a stroke.
pub const ERASE_TOLERANCE: f32 = 5.0;

/// Opacity of highlight boxes, live and exported.
pub const HIGHLIGHT_OPACITY: f32 = 0.4;

/// Stroke width for exported paths.
pub const EXPORT_STROKE_WIDTH: f32 = 2.0;

/// Caption font size for exported comments.
pub const CAPTION_SIZE: f32 = 14.0;

/// JPEG quality for images embedded in exported PDFs.
pub const JPEG_QUALITY: u8 = 90;

/// File name of the PNG export.
pub const PNG_FILE_NAME: &str = "annotated-image.png";

/// File name of the PDF export.
pub const PDF_FILE_NAME: &str = "annotated-document.pdf";

/// Notification texts shown to the user.
pub mod messages {
    pub const UPLOAD_SUCCESS: &str = "File upload successful";
    pub const UNSUPPORTED_FILE: &str = "Unsupported file type. Please upload a PDF or image.";
    pub const NO_DOCUMENT: &str = "No document to export!";
    pub const NO_SURFACE: &str = "Failed to create canvas context!";
}
