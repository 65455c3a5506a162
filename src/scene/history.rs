//! Undo/Redo history
//!
//! A bounded, linear list of immutable layer snapshots with a cursor.
//! Every entry stores the complete layer list as it was after the action,
//! so restoring is a wholesale replacement and never a partial merge.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::layer::Layer;
use crate::error::{FxError, Result};

/// Default maximum number of snapshots to keep.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Kinds of scene mutation recorded in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    /// State the history was created with.
    Initial,
    /// Layer added, removed, renamed or reordered.
    LayerChange,
    /// Layer parameter edited.
    LayerEdit,
    /// Elements added or removed by the editor.
    ElementChange,
    /// Elements produced by an importer.
    Import,
    /// Whole scene replaced from a document.
    Load,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::Initial => write!(f, "Initial"),
            ActionType::LayerChange => write!(f, "Layer Change"),
            ActionType::LayerEdit => write!(f, "Layer Edit"),
            ActionType::ElementChange => write!(f, "Element Change"),
            ActionType::Import => write!(f, "Import"),
            ActionType::Load => write!(f, "Load"),
        }
    }
}

/// One snapshot in the history.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Unique identifier for this entry.
    pub id: String,
    /// Type of action that produced the snapshot.
    pub action_type: ActionType,
    /// Human-readable description of the action.
    pub description: String,
    /// When the action was performed.
    pub timestamp: DateTime<Utc>,
    layers: Arc<Vec<Layer>>,
}

impl HistoryEntry {
    fn new(action_type: ActionType, description: impl Into<String>, layers: &[Layer]) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action_type,
            description: description.into(),
            timestamp: Utc::now(),
            layers: Arc::new(layers.to_vec()),
        }
    }

    /// Shared handle to the snapshot.
    pub fn layers(&self) -> Arc<Vec<Layer>> {
        Arc::clone(&self.layers)
    }
}

/// Linear undo/redo history over layer snapshots.
#[derive(Debug, Clone)]
pub struct SceneHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    max_entries: usize,
    discarded: usize,
}

impl Default for SceneHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY, &[])
    }
}

impl SceneHistory {
    /// Create a history whose first entry is `initial`.
    ///
    /// `max_entries` is raised to 1 if given as 0; the current state is
    /// always kept.
    pub fn new(max_entries: usize, initial: &[Layer]) -> Self {
        Self {
            entries: vec![HistoryEntry::new(ActionType::Initial, "Initial state", initial)],
            cursor: 0,
            max_entries: max_entries.max(1),
            discarded: 0,
        }
    }

    /// Record the state after a mutation.
    ///
    /// Discards any redo tail, since history has diverged, then trims the
    /// oldest snapshots beyond the limit.
    pub fn push(&mut self, action_type: ActionType, description: impl Into<String>, layers: &[Layer]) {
        self.entries.truncate(self.cursor + 1);
        self.entries
            .push(HistoryEntry::new(action_type, description, layers));
        self.cursor = self.entries.len() - 1;
        self.trim_history();
    }

    /// Step back one snapshot and return it.
    pub fn undo(&mut self) -> Result<&HistoryEntry> {
        if self.cursor == 0 {
            return Err(FxError::NothingToUndo);
        }
        self.cursor -= 1;
        Ok(&self.entries[self.cursor])
    }

    /// Step forward one snapshot and return it.
    pub fn redo(&mut self) -> Result<&HistoryEntry> {
        if self.cursor + 1 >= self.entries.len() {
            return Err(FxError::NothingToRedo);
        }
        self.cursor += 1;
        Ok(&self.entries[self.cursor])
    }

    /// Entry at the cursor.
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn undo_count(&self) -> usize {
        self.cursor
    }

    pub fn redo_count(&self) -> usize {
        self.entries.len() - 1 - self.cursor
    }

    /// Number of snapshots dropped by trimming.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Set the limit, trimming immediately if the history is over it.
    pub fn set_max_entries(&mut self, max_entries: usize) {
        self.max_entries = max_entries.max(1);
        self.trim_history();
    }

    /// Drop all history and start again from `layers`.
    pub fn reset(&mut self, action_type: ActionType, description: impl Into<String>, layers: &[Layer]) {
        self.discarded += self.entries.len();
        self.entries = vec![HistoryEntry::new(action_type, description, layers)];
        self.cursor = 0;
    }

    /// Drop the oldest undo snapshots, then the newest redo snapshots, until
    /// within the limit. The entry at the cursor is never dropped.
    fn trim_history(&mut self) {
        while self.entries.len() > self.max_entries {
            if self.cursor > 0 {
                self.entries.remove(0);
                self.cursor -= 1;
            } else {
                self.entries.pop();
            }
            self.discarded += 1;
        }
    }
}
