//! Replayable gesture scripts.
//!
//! A script is a JSON document listing the events a user would produce in the
//! browser, used by the native driver and in tests:
//!
//! ```json
//! {
//!   "viewport": { "width": 800, "height": 600 },
//!   "actions": [
//!     { "action": "select_tool", "tool": "draw" },
//!     { "action": "pointer_down", "x": 10, "y": 10 },
//!     { "action": "pointer_move", "x": 20, "y": 20 },
//!     { "action": "pointer_up" }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::annotation::Tool;
use crate::color::Color;
use crate::error::Result;
use crate::session::Annotator;

/// Displayed document size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// One recorded user event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GestureAction {
    SelectTool {
        #[serde(default)]
        tool: Option<Tool>,
    },
    SetColor {
        color: Color,
    },
    PointerDown {
        x: f32,
        y: f32,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    PointerUp,
    CommitComment {
        text: String,
    },
    NextPage,
    PreviousPage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureScript {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    #[serde(default)]
    pub actions: Vec<GestureAction>,
}

impl GestureScript {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let script = Self::from_json(&std::fs::read_to_string(path)?)?;
        log::debug!(
            "Loaded gesture script {:?} ({} actions)",
            path,
            script.actions.len()
        );
        Ok(script)
    }

    /// Feed every action to `annotator`, setting the viewport first if given.
    pub fn apply(&self, annotator: &mut Annotator) {
        if let Some(viewport) = self.viewport {
            annotator.set_viewport(viewport.width, viewport.height);
        }
        for action in &self.actions {
            match action {
                GestureAction::SelectTool { tool } => annotator.select_tool(*tool),
                GestureAction::SetColor { color } => annotator.set_color(*color),
                GestureAction::PointerDown { x, y } => annotator.pointer_down(*x, *y),
                GestureAction::PointerMove { x, y } => annotator.pointer_move(*x, *y),
                GestureAction::PointerUp => annotator.pointer_up(),
                GestureAction::CommitComment { text } => {
                    annotator.commit_comment(text);
                }
                GestureAction::NextPage => {
                    annotator.next_page();
                }
                GestureAction::PreviousPage => {
                    annotator.previous_page();
                }
            }
        }
        log::info!("▶️  Replayed {} gesture actions", self.actions.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationKind;
    use pretty_assertions::assert_eq;

    const SCRIPT: &str = r##"{
        "viewport": { "width": 320, "height": 240 },
        "actions": [
            { "action": "select_tool", "tool": "draw" },
            { "action": "set_color", "color": "#4ECDC4" },
            { "action": "pointer_down", "x": 10, "y": 10 },
            { "action": "pointer_move", "x": 20, "y": 20 },
            { "action": "pointer_up" },
            { "action": "select_tool", "tool": "comment" },
            { "action": "pointer_down", "x": 40, "y": 40 },
            { "action": "commit_comment", "text": "check this" },
            { "action": "select_tool" },
            { "action": "pointer_down", "x": 90, "y": 90 }
        ]
    }"##;

    #[test]
    fn test_parse() {
        let script = GestureScript::from_json(SCRIPT).unwrap();
        assert_eq!(
            script.viewport,
            Some(Viewport {
                width: 320.0,
                height: 240.0
            })
        );
        assert_eq!(script.actions.len(), 10);
        assert_eq!(
            script.actions[0],
            GestureAction::SelectTool {
                tool: Some(Tool::Draw)
            }
        );
        assert_eq!(script.actions[8], GestureAction::SelectTool { tool: None });
    }

    #[test]
    fn test_rejects_unknown_action() {
        assert!(GestureScript::from_json(r#"{"actions": [{"action": "zoom"}]}"#).is_err());
        assert!(
            GestureScript::from_json(r#"{"actions": [{"action": "select_tool", "tool": "lasso"}]}"#)
                .is_err()
        );
    }

    #[test]
    fn test_apply() {
        let mut annotator = Annotator::default();
        annotator.upload("application/pdf", b"%PDF-1.7".to_vec()).unwrap();
        GestureScript::from_json(SCRIPT).unwrap().apply(&mut annotator);

        assert_eq!(annotator.viewport(), (320.0, 240.0));
        assert_eq!(annotator.tool(), None);
        let kinds: Vec<AnnotationKind> = annotator.annotations().iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AnnotationKind::Draw, AnnotationKind::Comment]);
        assert_eq!(
            annotator.annotations()[0]
                .path
                .as_ref()
                .map(|p| p.to_string()),
            Some("M10,10 L20,20".to_string())
        );
        assert_eq!(annotator.annotations()[1].color, Color::new(0x4E, 0xCD, 0xC4));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        std::fs::write(&path, SCRIPT).unwrap();
        assert_eq!(GestureScript::load(&path).unwrap().actions.len(), 10);
    }
}
