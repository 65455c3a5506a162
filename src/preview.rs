//! Preview feed
//!
//! Flattens the scene into raw `{x, y, z, color}` records for an external
//! 3D viewer. No mode transforms are applied: `y` is the element's own
//! vertical offset and colors fall back to the layer color.

use serde::Serialize;

use crate::color::hex_to_rgb;
use crate::error::Result;
use crate::scene::Layer;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub color: String,
}

impl PreviewPoint {
    /// Color as 8-bit RGB, for renderers that need channels.
    pub fn rgb(&self) -> Result<(u8, u8, u8)> {
        hex_to_rgb(&self.color)
    }
}

/// All elements of all layers, in layer then element order.
pub fn preview_points(layers: &[Layer]) -> Vec<PreviewPoint> {
    layers
        .iter()
        .flat_map(|layer| {
            layer.elements.iter().map(move |el| PreviewPoint {
                x: el.position.x,
                y: el.y_offset,
                z: el.position.z,
                color: el.effective_color(&layer.color).to_string(),
            })
        })
        .collect()
}
