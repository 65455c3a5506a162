//! Layers
//!
//! A layer is a named, ordered collection of elements sharing default
//! emission parameters. Element order is emission order unless a compile
//! mode reorders it.

use super::element::Element;
use super::targeter::Targeter;
use crate::error::{FxError, Result};

/// Particle used by new layers and by documents that omit one.
pub const DEFAULT_PARTICLE: &str = "reddust";

/// Default color of a freshly created layer.
pub const DEFAULT_LAYER_COLOR: &str = "#000000";

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Display name, not required to be unique.
    pub name: String,
    /// Whether the layer takes part in compilation.
    pub visible: bool,
    /// First tick of the layer's emission window.
    pub tick_start: i64,
    /// Last tick of the layer's emission window.
    pub tick_end: i64,
    /// Default per-emission cadence.
    pub tick_delay: i64,
    /// Particle identifier. Empty is legal.
    pub particle: String,
    /// `#rrggbb` default element color.
    pub color: String,
    /// Opacity multiplier in `[0, 1]`.
    pub alpha: f64,
    /// Display scale hint, not used by transforms.
    pub shape_size: f64,
    /// Sub-emissions per command, at least 1.
    pub repeat: u32,
    /// Ticks between sub-emissions, at least 1.
    pub repeat_interval: u32,
    /// Vertical bias added to every element's own offset.
    pub y_offset: f64,
    /// Anchor clause for offsets.
    pub targeter: Targeter,
    /// Owned elements, in emission order.
    pub elements: Vec<Element>,
}

impl Default for Layer {
    fn default() -> Self {
        Self::new("Layer")
    }
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            tick_start: 0,
            tick_end: 40,
            tick_delay: 20,
            particle: DEFAULT_PARTICLE.to_string(),
            color: DEFAULT_LAYER_COLOR.to_string(),
            alpha: 1.0,
            shape_size: 20.0,
            repeat: 1,
            repeat_interval: 1,
            y_offset: 0.0,
            targeter: Targeter::default(),
            elements: Vec::new(),
        }
    }

    pub fn with_tick_start(mut self, tick_start: i64) -> Self {
        self.tick_start = tick_start;
        self
    }

    pub fn with_particle(mut self, particle: impl Into<String>) -> Self {
        self.particle = particle.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_elements(mut self, elements: Vec<Element>) -> Self {
        self.elements = elements;
        self
    }

    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn remove_element(&mut self, index: usize) -> Result<Element> {
        if index >= self.elements.len() {
            return Err(FxError::ElementNotFound {
                layer: self.name.clone(),
                index,
            });
        }
        Ok(self.elements.remove(index))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Clamp fields that consumers assume are in range.
    pub fn normalize(&mut self) {
        self.alpha = if self.alpha.is_finite() {
            self.alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.repeat = self.repeat.max(1);
        self.repeat_interval = self.repeat_interval.max(1);
    }
}
