//! Annotation data model.
//!
//! This module provides the core types for document annotations:
//! - Geometry (points, boxes, stroke paths)
//! - The tool set and the persisted annotation kinds
//! - The [`Annotation`] record itself

use std::fmt;
use std::str::FromStr;

use ritease_render::RectF;
use serde::{Deserialize, Serialize};

use crate::color::Color;

// ============================================================================
// Core Geometry Types
// ============================================================================

/// A 2D point in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Distance to the segment `a`-`b`.
    pub fn distance_to_segment(&self, a: &Point, b: &Point) -> f32 {
        let (vx, vy) = (b.x - a.x, b.y - a.y);
        let len_sq = vx * vx + vy * vy;
        if len_sq == 0.0 {
            return self.distance_to(a);
        }
        let t = (((self.x - a.x) * vx + (self.y - a.y) * vy) / len_sq).clamp(0.0, 1.0);
        self.distance_to(&Point::new(a.x + t * vx, a.y + t * vy))
    }
}

impl From<Point> for (f32, f32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// An axis-aligned box anchored at `(x, y)`.
///
/// Width may be negative for a highlight dragged leftwards; the stored value
/// keeps its sign and [`BoundingBox::normalized`] is used for hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Anchor X coordinate
    pub x: f32,
    /// Anchor Y coordinate
    pub y: f32,
    /// Signed width
    pub width: f32,
    /// Signed height
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Same area with non-negative extents.
    pub fn normalized(&self) -> Self {
        let rect = self.to_rect().normalized();
        Self::new(rect.x, rect.y, rect.width, rect.height)
    }

    /// Check if a point is inside this box (edges included).
    pub fn contains(&self, point: &Point) -> bool {
        let b = self.normalized();
        point.x >= b.x && point.x <= b.x + b.width && point.y >= b.y && point.y <= b.y + b.height
    }

    pub fn to_rect(&self) -> RectF {
        RectF::new(self.x, self.y, self.width, self.height)
    }
}

// ============================================================================
// Stroke Paths
// ============================================================================

/// One step of a stroke path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
}

impl PathCommand {
    pub fn point(&self) -> Point {
        match self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => *p,
        }
    }
}

/// A freehand stroke: a move followed by line segments.
///
/// Serialized in SVG path syntax, e.g. `M10,10 L20,20`.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokePath {
    commands: Vec<PathCommand>,
}

impl StrokePath {
    /// Start a path with a single move command.
    pub fn start(at: Point) -> Self {
        Self {
            commands: vec![PathCommand::MoveTo(at)],
        }
    }

    /// Append a line segment to `to`.
    pub fn line_to(&mut self, to: Point) {
        self.commands.push(PathCommand::LineTo(to));
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn points(&self) -> Vec<Point> {
        self.commands.iter().map(PathCommand::point).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Shortest distance from `point` to the drawn polyline.
    pub fn distance_to(&self, point: &Point) -> f32 {
        let points = self.points();
        match points.as_slice() {
            [] => f32::INFINITY,
            [only] => point.distance_to(only),
            _ => points
                .windows(2)
                .map(|w| point.distance_to_segment(&w[0], &w[1]))
                .fold(f32::INFINITY, f32::min),
        }
    }
}

impl fmt::Display for StrokePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match cmd {
                PathCommand::MoveTo(p) => write!(f, "M{},{}", p.x, p.y)?,
                PathCommand::LineTo(p) => write!(f, "L{},{}", p.x, p.y)?,
            }
        }
        Ok(())
    }
}

impl FromStr for StrokePath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut commands = Vec::new();
        for token in s.split_whitespace() {
            let (op, coords) = token.split_at(token.chars().next().map_or(0, char::len_utf8));
            let (x, y) = coords
                .split_once(',')
                .ok_or_else(|| format!("Malformed path segment: {token}"))?;
            let parse = |v: &str| {
                v.parse::<f32>()
                    .map_err(|_| format!("Malformed coordinate in: {token}"))
            };
            let point = Point::new(parse(x)?, parse(y)?);
            let cmd = match (op, commands.is_empty()) {
                ("M", true) => PathCommand::MoveTo(point),
                ("L", false) => PathCommand::LineTo(point),
                _ => return Err(format!("Unexpected path command: {token}")),
            };
            commands.push(cmd);
        }
        if commands.is_empty() {
            return Err("Empty path".to_string());
        }
        Ok(Self { commands })
    }
}

impl Serialize for StrokePath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StrokePath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Tools and Kinds
// ============================================================================

/// Tools the user can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Highlight,
    Draw,
    Signature,
    Underline,
    Comment,
    Text,
    Erase,
}

impl Tool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Highlight => "Highlight",
            Tool::Draw => "Draw",
            Tool::Signature => "Signature",
            Tool::Underline => "Underline",
            Tool::Comment => "Comment",
            Tool::Text => "Text",
            Tool::Erase => "Erase",
        }
    }

    /// Get all available tools.
    pub fn all() -> &'static [Tool] {
        &[
            Tool::Highlight,
            Tool::Draw,
            Tool::Signature,
            Tool::Underline,
            Tool::Comment,
            Tool::Text,
            Tool::Erase,
        ]
    }

    /// The annotation kind this tool creates. Erase creates none.
    pub fn annotation_kind(&self) -> Option<AnnotationKind> {
        match self {
            Tool::Highlight => Some(AnnotationKind::Highlight),
            Tool::Draw => Some(AnnotationKind::Draw),
            Tool::Signature => Some(AnnotationKind::Signature),
            Tool::Underline => Some(AnnotationKind::Underline),
            Tool::Comment => Some(AnnotationKind::Comment),
            Tool::Text => Some(AnnotationKind::Text),
            Tool::Erase => None,
        }
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::all()
            .iter()
            .copied()
            .find(|tool| tool.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown tool: {s}"))
    }
}

/// Kinds of persisted annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Highlight,
    Draw,
    Signature,
    Underline,
    Comment,
    Text,
}

impl AnnotationKind {
    /// Kinds drawn as a stroke path.
    pub fn is_stroke(&self) -> bool {
        matches!(self, AnnotationKind::Draw | AnnotationKind::Signature)
    }

    /// Kinds that carry a text caption.
    pub fn is_caption(&self) -> bool {
        matches!(self, AnnotationKind::Comment | AnnotationKind::Text)
    }
}

// ============================================================================
// Annotation
// ============================================================================

/// One user-made mark on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
    /// 1-based page index
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<StrokePath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Annotation {
    /// A box annotation (highlight, underline).
    pub fn boxed(kind: AnnotationKind, bounds: BoundingBox, color: Color, page: u32) -> Self {
        Self {
            kind,
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            color,
            page,
            path: None,
            text: None,
        }
    }

    /// A stroke annotation with a single-point path and a zero box.
    pub fn stroke(kind: AnnotationKind, at: Point, color: Color, page: u32) -> Self {
        Self {
            path: Some(StrokePath::start(at)),
            ..Self::boxed(kind, BoundingBox::new(at.x, at.y, 0.0, 0.0), color, page)
        }
    }

    /// A captioned annotation (comment, text).
    pub fn caption(
        kind: AnnotationKind,
        bounds: BoundingBox,
        text: impl Into<String>,
        color: Color,
        page: u32,
    ) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::boxed(kind, bounds, color, page)
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }

    /// Whether `point` hits this annotation.
    ///
    /// Strokes match within `tolerance` of the polyline, boxes by containment.
    pub fn hit_test(&self, point: &Point, tolerance: f32) -> bool {
        match &self.path {
            Some(path) => path.distance_to(point) <= tolerance,
            None => self.bounds().contains(point),
        }
    }
}
