//! Scene Model
//!
//! The scene is an ordered list of [`Layer`]s plus a linear undo/redo
//! [`SceneHistory`]. All mutation goes through explicit methods on
//! [`Scene`]; each one records a snapshot after it succeeds.
//!
//! The compiler never borrows the live scene. It works on
//! [`Scene::snapshot`], a detached copy, so edits made while a compilation
//! runs cannot leak into its output.

pub mod document;
pub mod edit;
mod element;
pub mod history;
mod layer;
mod targeter;

use std::sync::{Arc, RwLock};

use tracing::debug;

pub use document::SceneDocument;
pub use edit::LayerEdit;
pub use element::{Element, ElementKind, Position};
pub use history::{ActionType, HistoryEntry, SceneHistory, DEFAULT_MAX_HISTORY};
pub use layer::{Layer, DEFAULT_LAYER_COLOR, DEFAULT_PARTICLE};
pub use targeter::{Targeter, DEFAULT_TARGETER};

use crate::color::normalize_hex;
use crate::error::{FxError, Result};

/// Scene shared between the control thread, background jobs and autosave.
pub type SharedScene = Arc<RwLock<Scene>>;

/// How an element source's output is merged into its target layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Keep existing elements, add the new ones after them.
    Append,
    /// Drop existing elements first.
    Replace,
}

/// Anything that produces elements for a layer: editor tools, the pixel
/// importer, the mesh importer.
pub trait ElementSource {
    /// Produce elements for `layer`. The layer is read-only here; the scene
    /// does the appending.
    fn elements(&self, layer: &Layer) -> Result<Vec<Element>>;

    /// Whether the produced elements replace or extend the layer.
    fn import_mode(&self) -> ImportMode {
        ImportMode::Append
    }

    /// Label for history entries.
    fn describe(&self) -> String {
        "Add elements".to_string()
    }
}

/// Layers plus their edit history.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    layers: Vec<Layer>,
    history: SceneHistory,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene starting from `layers`, which becomes history entry 0.
    pub fn from_layers(layers: Vec<Layer>) -> Self {
        let history = SceneHistory::new(DEFAULT_MAX_HISTORY, &layers);
        Self { layers, history }
    }

    pub fn from_document(document: SceneDocument) -> Self {
        Self::from_layers(document.into_layers())
    }

    pub fn to_document(&self) -> SceneDocument {
        SceneDocument::from_layers(&self.layers)
    }

    /// Wrap in the lock shared with background workers.
    pub fn into_shared(self) -> SharedScene {
        Arc::new(RwLock::new(self))
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Result<&Layer> {
        let len = self.layers.len();
        self.layers
            .get(index)
            .ok_or(FxError::LayerNotFound { index, len })
    }

    pub fn history(&self) -> &SceneHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut SceneHistory {
        &mut self.history
    }

    /// Detached deep copy of the layer list for compilation.
    pub fn snapshot(&self) -> Vec<Layer> {
        self.layers.clone()
    }

    pub fn element_count(&self) -> usize {
        self.layers.iter().map(Layer::len).sum()
    }

    // ========================================================================
    // Layer operations
    // ========================================================================

    /// Append a new layer and return its index.
    pub fn add_layer(&mut self, name: impl Into<String>, tick_start: i64) -> usize {
        let layer = Layer::new(name).with_tick_start(tick_start);
        let description = format!("Add layer '{}'", layer.name);
        self.layers.push(layer);
        self.commit(ActionType::LayerChange, description);
        self.layers.len() - 1
    }

    /// Append an already built layer and return its index.
    pub fn push_layer(&mut self, layer: Layer) -> usize {
        let description = format!("Add layer '{}'", layer.name);
        self.layers.push(layer);
        self.commit(ActionType::LayerChange, description);
        self.layers.len() - 1
    }

    pub fn remove_layer(&mut self, index: usize) -> Result<Layer> {
        self.check_index(index)?;
        let removed = self.layers.remove(index);
        self.commit(
            ActionType::LayerChange,
            format!("Remove layer '{}'", removed.name),
        );
        Ok(removed)
    }

    pub fn rename_layer(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        self.edit_layer(index, LayerEdit::Name(name.into()))
    }

    /// Swap the layer with the one before it. Returns the new index.
    pub fn move_layer_up(&mut self, index: usize) -> Result<usize> {
        self.check_index(index)?;
        if index == 0 {
            return Ok(0);
        }
        self.layers.swap(index, index - 1);
        self.commit(ActionType::LayerChange, "Move layer up");
        Ok(index - 1)
    }

    /// Swap the layer with the one after it. Returns the new index.
    pub fn move_layer_down(&mut self, index: usize) -> Result<usize> {
        self.check_index(index)?;
        if index + 1 >= self.layers.len() {
            return Ok(index);
        }
        self.layers.swap(index, index + 1);
        self.commit(ActionType::LayerChange, "Move layer down");
        Ok(index + 1)
    }

    pub fn edit_layer(&mut self, index: usize, edit: LayerEdit) -> Result<()> {
        self.check_index(index)?;
        let description = format!("Set {}", edit.field_name());
        edit.apply(&mut self.layers[index]);
        self.commit(ActionType::LayerEdit, description);
        Ok(())
    }

    /// Set the layer color and re-color all of its elements to match.
    pub fn set_layer_color(&mut self, index: usize, color: &str) -> Result<()> {
        self.check_index(index)?;
        let color = normalize_hex(color)?;
        let layer = &mut self.layers[index];
        for element in &mut layer.elements {
            element.color = Some(color.clone());
        }
        layer.color = color;
        self.commit(ActionType::LayerEdit, "Set color");
        Ok(())
    }

    /// Make every layer visible again.
    pub fn show_all_layers(&mut self) {
        for layer in &mut self.layers {
            layer.visible = true;
        }
        self.commit(ActionType::LayerEdit, "Show all layers");
    }

    // ========================================================================
    // Element operations
    // ========================================================================

    pub fn append_elements(&mut self, index: usize, elements: Vec<Element>) -> Result<usize> {
        self.check_index(index)?;
        let count = elements.len();
        self.layers[index].elements.extend(elements);
        self.commit(ActionType::ElementChange, format!("Add {} elements", count));
        Ok(count)
    }

    /// Run an element source against a layer and merge its output.
    pub fn import(&mut self, index: usize, source: &dyn ElementSource) -> Result<usize> {
        self.check_index(index)?;
        let elements = source.elements(&self.layers[index])?;
        let count = elements.len();
        let layer = &mut self.layers[index];
        if source.import_mode() == ImportMode::Replace {
            layer.elements.clear();
        }
        layer.elements.extend(elements);
        debug!(layer = %layer.name, count, "elements imported");
        self.commit(ActionType::Import, source.describe());
        Ok(count)
    }

    pub fn remove_element(&mut self, layer: usize, element: usize) -> Result<Element> {
        self.check_index(layer)?;
        let removed = self.layers[layer].remove_element(element)?;
        self.commit(ActionType::ElementChange, "Remove element");
        Ok(removed)
    }

    pub fn clear_layer(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.layers[index].elements.clear();
        self.commit(ActionType::ElementChange, "Clear layer");
        Ok(())
    }

    /// Replace the whole scene from a document, resetting history.
    pub fn load_document(&mut self, document: SceneDocument) {
        self.layers = document.into_layers();
        self.history
            .reset(ActionType::Load, "Load scene", &self.layers);
    }

    // ========================================================================
    // Undo / Redo
    // ========================================================================

    pub fn undo(&mut self) -> Result<()> {
        let snapshot = self.history.undo()?.layers();
        self.layers = snapshot.as_ref().clone();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        let snapshot = self.history.redo()?.layers();
        self.layers = snapshot.as_ref().clone();
        Ok(())
    }

    /// Record the current layers in history.
    pub(crate) fn commit(&mut self, action_type: ActionType, description: impl Into<String>) {
        self.history.push(action_type, description, &self.layers);
    }

    /// Mutable access for chunked imports, which commit once at the end.
    pub(crate) fn layer_mut(&mut self, index: usize) -> Result<&mut Layer> {
        self.check_index(index)?;
        Ok(&mut self.layers[index])
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.layers.len() {
            return Err(FxError::LayerNotFound {
                index,
                len: self.layers.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(Vec<Element>, ImportMode);

    impl ElementSource for FixedSource {
        fn elements(&self, _layer: &Layer) -> Result<Vec<Element>> {
            Ok(self.0.clone())
        }

        fn import_mode(&self) -> ImportMode {
            self.1
        }
    }

    fn point(x: f64, z: f64) -> Element {
        Element::new(ElementKind::Free, (x, z))
    }

    #[test]
    fn test_add_and_remove_layer() {
        let mut scene = Scene::new();
        let idx = scene.add_layer("Layer 1", 5);
        assert_eq!(idx, 0);
        assert_eq!(scene.layer(0).unwrap().tick_start, 5);

        let removed = scene.remove_layer(0).unwrap();
        assert_eq!(removed.name, "Layer 1");
        assert!(scene.layers().is_empty());
        assert!(scene.remove_layer(0).is_err());
    }

    #[test]
    fn test_undo_redo_restores_whole_list() {
        let mut scene = Scene::new();
        scene.add_layer("A", 0);
        scene.append_elements(0, vec![point(1.0, 1.0)]).unwrap();
        scene.add_layer("B", 0);

        scene.undo().unwrap();
        assert_eq!(scene.layers().len(), 1);
        assert_eq!(scene.layers()[0].len(), 1);

        scene.undo().unwrap();
        assert_eq!(scene.layers()[0].len(), 0);

        scene.undo().unwrap();
        assert!(scene.layers().is_empty());
        assert!(matches!(scene.undo(), Err(FxError::NothingToUndo)));

        scene.redo().unwrap();
        scene.redo().unwrap();
        assert_eq!(scene.layers()[0].len(), 1);
    }

    #[test]
    fn test_move_layers() {
        let mut scene = Scene::new();
        scene.add_layer("A", 0);
        scene.add_layer("B", 0);
        assert_eq!(scene.move_layer_up(1).unwrap(), 0);
        assert_eq!(scene.layers()[0].name, "B");
        assert_eq!(scene.move_layer_up(0).unwrap(), 0);
        assert_eq!(scene.move_layer_down(0).unwrap(), 1);
        assert_eq!(scene.layers()[1].name, "B");
    }

    #[test]
    fn test_set_layer_color_recolors_elements() {
        let mut scene = Scene::new();
        scene.add_layer("A", 0);
        scene
            .append_elements(0, vec![point(0.0, 0.0), point(1.0, 0.0)])
            .unwrap();
        scene.set_layer_color(0, "#FF0000").unwrap();

        let layer = scene.layer(0).unwrap();
        assert_eq!(layer.color, "#ff0000");
        assert!(layer
            .elements
            .iter()
            .all(|e| e.color.as_deref() == Some("#ff0000")));
        assert!(scene.set_layer_color(0, "crimson").is_err());
    }

    #[test]
    fn test_import_replace_and_append() {
        let mut scene = Scene::new();
        scene.add_layer("A", 0);
        scene.append_elements(0, vec![point(9.0, 9.0)]).unwrap();

        let source = FixedSource(vec![point(1.0, 0.0)], ImportMode::Append);
        scene.import(0, &source).unwrap();
        assert_eq!(scene.layer(0).unwrap().len(), 2);

        let source = FixedSource(vec![point(2.0, 0.0)], ImportMode::Replace);
        scene.import(0, &source).unwrap();
        assert_eq!(scene.layer(0).unwrap().len(), 1);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut scene = Scene::new();
        scene.add_layer("A", 0);
        let snapshot = scene.snapshot();
        scene.rename_layer(0, "Renamed").unwrap();
        assert_eq!(snapshot[0].name, "A");
    }

    #[test]
    fn test_load_document_resets_history() {
        let mut scene = Scene::new();
        scene.add_layer("A", 0);
        scene.load_document(SceneDocument::from_layers(&[Layer::new("X")]));
        assert_eq!(scene.layers()[0].name, "X");
        assert!(!scene.history().can_undo());
    }
}
