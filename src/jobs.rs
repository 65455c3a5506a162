//! Background Jobs
//!
//! Compilation and large imports run on worker threads. Each job hands back
//! a handle holding:
//! - a progress channel the control thread polls with `try_recv`
//! - a cancellation flag checked at every batch boundary
//! - the join handle for the final result
//!
//! Workers never touch presentation state. A compile job works on a
//! detached layer snapshot; an import job mutates the shared scene only
//! under its write lock, one bounded chunk at a time, and records a single
//! undo snapshot when it stops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::error::{FxError, Result};
use crate::scene::{ActionType, ElementSource, ImportMode, Layer, SharedScene};
use crate::script::{CompileOptions, CompileOutput, Compiler, Progress};

/// Elements appended per write-lock acquisition by default.
pub const DEFAULT_IMPORT_CHUNK: usize = 100;

fn join<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    handle.join().map_err(|_| FxError::WorkerDisconnected)?
}

// ============================================================================
// Compile
// ============================================================================

/// Handle to a compilation running on a worker thread.
pub struct CompileJob {
    progress: Receiver<Progress>,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<Result<CompileOutput>>,
}

impl CompileJob {
    /// Progress reports, in emission order.
    pub fn progress(&self) -> &Receiver<Progress> {
        &self.progress
    }

    /// Reports that arrived since the last poll.
    pub fn poll_progress(&self) -> Vec<Progress> {
        self.progress.try_iter().collect()
    }

    /// Ask the worker to stop at its next batch boundary.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the worker is done.
    pub fn wait(self) -> Result<CompileOutput> {
        join(self.handle)
    }
}

/// Compile `layers` on a worker thread.
pub fn spawn_compile(layers: Vec<Layer>, options: CompileOptions) -> CompileJob {
    let (sender, receiver) = channel();
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);

    let handle = thread::spawn(move || {
        Compiler::new(&options)
            .with_cancel(&flag)
            .with_progress(|p| {
                // The receiver may be gone if the caller stopped listening.
                let _ = sender.send(p);
            })
            .compile(&layers)
    });

    CompileJob {
        progress: receiver,
        cancel,
        handle,
    }
}

/// Snapshot the shared scene under its read lock, then compile the snapshot.
pub fn spawn_scene_compile(scene: &SharedScene, options: CompileOptions) -> Result<CompileJob> {
    let layers = scene.read().map_err(|_| FxError::LockPoisoned)?.snapshot();
    Ok(spawn_compile(layers, options))
}

// ============================================================================
// Import
// ============================================================================

/// How an import job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Elements the source produced.
    pub total: usize,
    /// Elements actually added to the layer.
    pub appended: usize,
    pub cancelled: bool,
}

/// Handle to an import running on a worker thread.
pub struct ImportJob {
    progress: Receiver<f64>,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<Result<ImportSummary>>,
}

impl ImportJob {
    /// Fraction of produced elements appended so far.
    pub fn progress(&self) -> &Receiver<f64> {
        &self.progress
    }

    pub fn poll_progress(&self) -> Vec<f64> {
        self.progress.try_iter().collect()
    }

    /// Finish the current chunk, then stop.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn wait(self) -> Result<ImportSummary> {
        join(self.handle)
    }
}

/// Run `source` against layer `layer_index` of `scene` on a worker thread
/// and merge its elements in chunks of `chunk_size`.
pub fn spawn_import<S>(
    scene: SharedScene,
    layer_index: usize,
    source: S,
    chunk_size: usize,
) -> ImportJob
where
    S: ElementSource + Send + 'static,
{
    let (sender, receiver) = channel();
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    let chunk_size = chunk_size.max(1);

    let handle = thread::spawn(move || -> Result<ImportSummary> {
        // Generate from a copy so the lock is not held while decoding.
        let target = scene
            .read()
            .map_err(|_| FxError::LockPoisoned)?
            .layer(layer_index)?
            .clone();
        let elements = source.elements(&target)?;
        let total = elements.len();

        if source.import_mode() == ImportMode::Replace {
            let mut guard = scene.write().map_err(|_| FxError::LockPoisoned)?;
            guard.layer_mut(layer_index)?.elements.clear();
        }

        let mut appended = 0;
        let mut cancelled = false;
        for chunk in elements.chunks(chunk_size) {
            if flag.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }
            {
                let mut guard = scene.write().map_err(|_| FxError::LockPoisoned)?;
                guard.layer_mut(layer_index)?.elements.extend_from_slice(chunk);
            }
            appended += chunk.len();
            let _ = sender.send(appended as f64 / total as f64);
            debug!(appended, total, "import chunk merged");
        }

        scene
            .write()
            .map_err(|_| FxError::LockPoisoned)?
            .commit(ActionType::Import, source.describe());

        info!(layer = layer_index, appended, total, cancelled, "import finished");
        Ok(ImportSummary {
            total,
            appended,
            cancelled,
        })
    });

    ImportJob {
        progress: receiver,
        cancel,
        handle,
    }
}
