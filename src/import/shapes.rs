//! Editor shape tools
//!
//! The drawing tools work in canvas pixels. A [`CanvasFrame`] converts a
//! pixel to scene units: `(pixel - centre) / 10` on both axes, with the
//! canvas's vertical axis becoming the scene's `z`.
//!
//! Mirror modes reflect each generated point across the canvas centre line
//! (`X`: left/right, `Z`: top/bottom) or through the centre (`Double`).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scene::{Element, ElementKind, ElementSource, Layer, Position};

/// Canvas pixels per scene unit.
pub const PIXELS_PER_UNIT: f64 = 10.0;

/// Point count used when the count field holds nothing usable.
pub const DEFAULT_SHAPE_COUNT: usize = 10;

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasFrame {
    pub width: f64,
    pub height: f64,
}

impl CanvasFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
        }
    }

    /// Integer centre, as the canvas reports it.
    fn center(&self) -> (f64, f64) {
        ((self.width / 2.0).floor(), (self.height / 2.0).floor())
    }

    /// Scene position of canvas pixel `(px, py)`.
    pub fn to_scene(&self, px: f64, py: f64) -> Position {
        let (cx, cy) = self.center();
        Position::new((px - cx) / PIXELS_PER_UNIT, (py - cy) / PIXELS_PER_UNIT)
    }
}

impl Default for CanvasFrame {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mirror {
    #[default]
    Off,
    /// Reflect left/right.
    X,
    /// Reflect top/bottom.
    Z,
    /// Reflect through the centre.
    Double,
}

impl Mirror {
    /// The mirrored pixel, if this mode adds one.
    fn reflect(&self, frame: &CanvasFrame, px: f64, py: f64) -> Option<(f64, f64)> {
        match self {
            Mirror::Off => None,
            Mirror::X => Some((frame.width - px, py)),
            Mirror::Z => Some((px, frame.height - py)),
            Mirror::Double => Some((frame.width - px, frame.height - py)),
        }
    }
}

/// One tool stroke, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Single free-draw point.
    Point { x: f64, y: f64 },
    /// `count` points evenly spaced on a ring.
    Circle {
        cx: f64,
        cy: f64,
        radius: f64,
        count: usize,
    },
    /// Points along the outline of an axis-aligned square.
    Square {
        cx: f64,
        cy: f64,
        size: f64,
        count: usize,
    },
    /// `count` points from the start towards (not including) the end.
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        count: usize,
    },
}

impl Shape {
    pub fn kind(&self) -> ElementKind {
        match self {
            Shape::Point { .. } => ElementKind::Free,
            Shape::Circle { .. } => ElementKind::Circle,
            Shape::Square { .. } => ElementKind::Square,
            Shape::Line { .. } => ElementKind::Line,
        }
    }

    /// Canvas pixels of the stroke, before mirroring.
    pub fn pixels(&self, scale: f64) -> Vec<(f64, f64)> {
        match *self {
            Shape::Point { x, y } => vec![(x, y)],

            Shape::Circle {
                cx,
                cy,
                radius,
                count,
            } => {
                let r = radius * scale;
                (0..count)
                    .map(|i| {
                        let angle = (i as f64 * (360.0 / count as f64)).to_radians();
                        (cx + r * angle.cos(), cy + r * angle.sin())
                    })
                    .collect()
            }

            Shape::Square {
                cx,
                cy,
                size,
                count,
            } => {
                let size = size * scale;
                let step = ((size / count.max(1) as f64).floor() as usize).max(1);
                let half = (size / 2.0).floor() as i64;
                let mut out = Vec::new();
                // Top and bottom edges, then left and right.
                for d in (-half..=half).step_by(step) {
                    for edge in [-half, half] {
                        out.push((cx + d as f64, cy + edge as f64));
                    }
                }
                for d in (-half..=half).step_by(step) {
                    for edge in [-half, half] {
                        out.push((cx + edge as f64, cy + d as f64));
                    }
                }
                out
            }

            Shape::Line {
                x1,
                y1,
                x2,
                y2,
                count,
            } => (0..count)
                .map(|i| {
                    let t = i as f64 / count as f64;
                    (x1 + (x2 - x1) * t, y1 + (y2 - y1) * t)
                })
                .collect(),
        }
    }
}

/// A shape stroke on a canvas, usable as an element source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeTool {
    pub shape: Shape,
    pub frame: CanvasFrame,
    pub mirror: Mirror,
    /// Canvas zoom applied to radii and sizes.
    pub scale: f64,
}

impl ShapeTool {
    pub fn new(shape: Shape, frame: CanvasFrame) -> Self {
        Self {
            shape,
            frame,
            mirror: Mirror::Off,
            scale: 1.0,
        }
    }

    pub fn with_mirror(mut self, mirror: Mirror) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Click with a circle, square or line tool of `size` pixels at `(x, y)`.
    /// A `count` of zero falls back to [`DEFAULT_SHAPE_COUNT`].
    pub fn click(kind: ElementKind, x: f64, y: f64, size: f64, count: usize) -> Option<Shape> {
        let count = if count == 0 { DEFAULT_SHAPE_COUNT } else { count };
        match kind {
            ElementKind::Free => Some(Shape::Point { x, y }),
            ElementKind::Circle => Some(Shape::Circle {
                cx: x,
                cy: y,
                radius: (size / 2.0).floor(),
                count,
            }),
            ElementKind::Square => Some(Shape::Square {
                cx: x,
                cy: y,
                size,
                count,
            }),
            ElementKind::Line => Some(Shape::Line {
                x1: x,
                y1: y,
                x2: x + size,
                y2: y,
                count,
            }),
            _ => None,
        }
    }
}

impl ElementSource for ShapeTool {
    fn elements(&self, layer: &Layer) -> Result<Vec<Element>> {
        let kind = self.shape.kind();
        let make = |px: f64, py: f64| {
            Element::new(kind, self.frame.to_scene(px, py))
                .with_ticks(layer.tick_start, layer.tick_end)
        };

        let mut elements = Vec::new();
        for (px, py) in self.shape.pixels(self.scale) {
            elements.push(make(px, py));
            if let Some((mx, my)) = self.mirror.reflect(&self.frame, px, py) {
                elements.push(make(mx, my));
            }
        }
        Ok(elements)
    }

    fn describe(&self) -> String {
        format!("Draw {}", self.shape.kind())
    }
}
