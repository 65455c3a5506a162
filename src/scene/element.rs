//! Scene elements
//!
//! An element is one positioned emission point. Elements are owned by
//! exactly one [`Layer`](super::Layer) and carry no references back into the
//! editor that created them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Provenance tag of an element. Informational only for the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Placed with the free-draw brush.
    Free,
    /// Generated by the circle tool.
    Circle,
    /// Generated by the square tool.
    Square,
    /// Generated by the line tool.
    Line,
    /// Produced by the pixel importer.
    Image,
    /// Produced by the mesh importer.
    Obj,
    /// Fallback for documents with a missing or unknown tag.
    #[default]
    Point,
}

impl ElementKind {
    /// Map a document tag to a kind; unknown tags become [`ElementKind::Point`].
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "free" => ElementKind::Free,
            "circle" => ElementKind::Circle,
            "square" => ElementKind::Square,
            "line" => ElementKind::Line,
            "image" => ElementKind::Image,
            "obj" => ElementKind::Obj,
            _ => ElementKind::Point,
        }
    }

    /// The tag written to scene documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Free => "free",
            ElementKind::Circle => "circle",
            ElementKind::Square => "square",
            ElementKind::Line => "line",
            ElementKind::Image => "image",
            ElementKind::Obj => "obj",
            ElementKind::Point => "point",
        }
    }
}

impl<'de> Deserialize<'de> for ElementKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(ElementKind::from_tag(&tag))
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal-plane offset from the scene origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, z: 0.0 };

    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Squared Euclidean distance in the (x, z) plane.
    #[inline]
    pub fn distance_sq(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, z): (f64, f64)) -> Self {
        Self { x, z }
    }
}

/// One positioned emission point.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Provenance tag.
    pub kind: ElementKind,
    /// Offset from the scene origin.
    pub position: Position,
    /// Element's own vertical offset, added to the layer offset.
    pub y_offset: f64,
    /// Color override; `None` means the owning layer's color applies.
    pub color: Option<String>,
    /// Optional per-element window. Layer timing drives scheduling.
    pub tick_start: Option<i64>,
    pub tick_end: Option<i64>,
}

impl Element {
    /// Create an element at `position` with no offset and no color override.
    pub fn new(kind: ElementKind, position: impl Into<Position>) -> Self {
        Self {
            kind,
            position: position.into(),
            y_offset: 0.0,
            color: None,
            tick_start: None,
            tick_end: None,
        }
    }

    pub fn with_y_offset(mut self, y_offset: f64) -> Self {
        self.y_offset = y_offset;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_ticks(mut self, start: i64, end: i64) -> Self {
        self.tick_start = Some(start);
        self.tick_end = Some(end);
        self
    }

    /// The color this element is drawn with, given its layer's default.
    pub fn effective_color<'a>(&'a self, layer_color: &'a str) -> &'a str {
        self.color.as_deref().unwrap_or(layer_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_color_falls_back_to_layer() {
        let plain = Element::new(ElementKind::Free, (1.0, 2.0));
        assert_eq!(plain.effective_color("#123456"), "#123456");

        let tinted = plain.clone().with_color("#ff0000");
        assert_eq!(tinted.effective_color("#123456"), "#ff0000");
    }

    #[test]
    fn test_distance_sq() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(a.distance_sq(&b), 25.0);
    }

    #[test]
    fn test_unknown_kind_deserializes_as_point() {
        let kind: ElementKind = serde_json::from_str("\"spiral\"").unwrap();
        assert_eq!(kind, ElementKind::Point);
        let kind: ElementKind = serde_json::from_str("\"circle\"").unwrap();
        assert_eq!(kind, ElementKind::Circle);
    }
}
