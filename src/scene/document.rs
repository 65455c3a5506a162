//! Scene documents (`.fxgen`)
//!
//! JSON persistence for the layer list. The record types mirror the file
//! format exactly and carry its defaults; the scene model never sees a
//! missing field.
//!
//! ```text
//! {
//!   "layers": [
//!     { "name": "...", "particle": "reddust", "tick_delay": 0,
//!       "tick_start": 0, "tick_end": 20, "color": "#ffffff",
//!       "alpha": 1, "shape_size": 1, "repeat": 1, "y_offset": 0.0,
//!       "elements": [ { "typ": "free", "position": [x, z],
//!                       "tick_start": 0, "tick_end": 20, "y_offset": 0.0 } ] }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::element::{Element, ElementKind, Position};
use super::layer::{Layer, DEFAULT_PARTICLE};
use super::targeter::{Targeter, DEFAULT_TARGETER};
use crate::error::{FxError, Result};

/// File extension for scene documents.
pub const SCENE_EXTENSION: &str = "fxgen";

fn default_layer_name() -> String {
    "Layer".to_string()
}

fn default_particle() -> String {
    DEFAULT_PARTICLE.to_string()
}

fn default_color() -> String {
    "#ffffff".to_string()
}

fn default_targeter() -> String {
    DEFAULT_TARGETER.to_string()
}

fn default_tick_end() -> i64 {
    20
}

fn default_one_f64() -> f64 {
    1.0
}

fn default_one_i64() -> i64 {
    1
}

fn default_true() -> bool {
    true
}

/// Root of a scene document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub layers: Vec<LayerRecord>,
}

/// Layer as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    #[serde(default = "default_layer_name")]
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_particle")]
    pub particle: String,
    #[serde(default)]
    pub tick_delay: i64,
    #[serde(default)]
    pub tick_start: i64,
    #[serde(default = "default_tick_end")]
    pub tick_end: i64,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_one_f64")]
    pub alpha: f64,
    #[serde(default = "default_one_f64")]
    pub shape_size: f64,
    #[serde(default = "default_one_i64")]
    pub repeat: i64,
    #[serde(default = "default_one_i64")]
    pub repeat_interval: i64,
    #[serde(default)]
    pub y_offset: f64,
    #[serde(default = "default_targeter")]
    pub targeter: String,
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
}

/// Element as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    #[serde(default)]
    pub typ: ElementKind,
    pub position: [f64; 2],
    #[serde(default)]
    pub tick_start: i64,
    #[serde(default = "default_tick_end")]
    pub tick_end: i64,
    #[serde(default)]
    pub y_offset: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl From<&Element> for ElementRecord {
    fn from(el: &Element) -> Self {
        Self {
            typ: el.kind,
            position: [el.position.x, el.position.z],
            tick_start: el.tick_start.unwrap_or(0),
            tick_end: el.tick_end.unwrap_or_else(default_tick_end),
            y_offset: el.y_offset,
            color: el.color.clone(),
        }
    }
}

impl From<ElementRecord> for Element {
    fn from(rec: ElementRecord) -> Self {
        Element {
            kind: rec.typ,
            position: Position::new(rec.position[0], rec.position[1]),
            y_offset: rec.y_offset,
            color: rec.color,
            tick_start: Some(rec.tick_start),
            tick_end: Some(rec.tick_end),
        }
    }
}

impl From<&Layer> for LayerRecord {
    fn from(layer: &Layer) -> Self {
        Self {
            name: layer.name.clone(),
            visible: layer.visible,
            particle: layer.particle.clone(),
            tick_delay: layer.tick_delay,
            tick_start: layer.tick_start,
            tick_end: layer.tick_end,
            color: layer.color.clone(),
            alpha: layer.alpha,
            shape_size: layer.shape_size,
            repeat: i64::from(layer.repeat),
            repeat_interval: i64::from(layer.repeat_interval),
            y_offset: layer.y_offset,
            targeter: layer.targeter.to_string(),
            elements: layer.elements.iter().map(ElementRecord::from).collect(),
        }
    }
}

impl From<LayerRecord> for Layer {
    fn from(rec: LayerRecord) -> Self {
        let mut layer = Layer {
            name: rec.name,
            visible: rec.visible,
            tick_start: rec.tick_start,
            tick_end: rec.tick_end,
            tick_delay: rec.tick_delay,
            particle: rec.particle,
            color: rec.color,
            alpha: rec.alpha,
            shape_size: rec.shape_size,
            repeat: clamp_count(rec.repeat),
            repeat_interval: clamp_count(rec.repeat_interval),
            y_offset: rec.y_offset,
            targeter: Targeter::parse(&rec.targeter),
            elements: rec.elements.into_iter().map(Element::from).collect(),
        };
        layer.normalize();
        layer
    }
}

fn clamp_count(value: i64) -> u32 {
    u32::try_from(value.max(1)).unwrap_or(u32::MAX)
}

impl SceneDocument {
    pub fn from_layers(layers: &[Layer]) -> Self {
        Self {
            layers: layers.iter().map(LayerRecord::from).collect(),
        }
    }

    pub fn into_layers(self) -> Vec<Layer> {
        self.layers.into_iter().map(Layer::from).collect()
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// SHA-256 of the serialized document, hex encoded.
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let digest = Sha256::digest(&bytes);
        Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Load a document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FxError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| FxError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let document = Self::from_json(&content).map_err(|e| FxError::InvalidScene {
            reason: format!("{}: {}", path.display(), e),
        })?;
        debug!(path = %path.display(), layers = document.layers.len(), "scene loaded");
        Ok(document)
    }

    /// Save the document, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| FxError::DirectoryCreateError {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let content = self.to_json()?;
        fs::write(path, content).map_err(|e| FxError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), "scene saved");
        Ok(())
    }
}
