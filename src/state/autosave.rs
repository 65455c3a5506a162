//! Autosave Manager for AuraFX scenes.
//!
//! Periodically writes the scene document to a backups directory as
//! `autosave_YYYYMMDD_HHMMSS_mmm.fxgen`, keeping only the newest few. The scene
//! is serialized while its read lock is held, so an autosave can never
//! capture a half-applied undo or redo. Unchanged scenes are not written
//! again.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{FxError, Result};
use crate::scene::{Scene, SceneDocument, SharedScene};

/// Default autosave interval in seconds.
const DEFAULT_AUTOSAVE_INTERVAL: u64 = 30;

/// Default maximum number of autosaves to retain.
const DEFAULT_MAX_AUTOSAVES: usize = 10;

/// Prefix for autosave filenames.
const AUTOSAVE_PREFIX: &str = "autosave_";

/// Extension for autosave files.
const AUTOSAVE_EXTENSION: &str = ".fxgen";

/// How often the background loop wakes to check the stop flag.
const LOOP_TICK: Duration = Duration::from_millis(100);

/// User-facing autosave configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveSettings {
    pub enabled: bool,
    pub interval_seconds: u64,
    pub max_autosaves: usize,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: DEFAULT_AUTOSAVE_INTERVAL,
            max_autosaves: DEFAULT_MAX_AUTOSAVES,
        }
    }
}

/// Manages automatic periodic saving of scene state.
#[derive(Debug, Clone)]
pub struct AutosaveManager {
    pub settings: AutosaveSettings,

    /// Directory autosaves are written to.
    backups_dir: PathBuf,

    /// When the scene was last written or found unchanged.
    pub last_save_time: Option<DateTime<Utc>>,

    /// Fingerprint of the last document written.
    last_fingerprint: Option<String>,
}

impl AutosaveManager {
    /// Manager with default settings writing to `backups_dir`.
    pub fn new(backups_dir: impl Into<PathBuf>) -> Self {
        Self::with_settings(backups_dir, AutosaveSettings::default())
    }

    pub fn with_settings(backups_dir: impl Into<PathBuf>, settings: AutosaveSettings) -> Self {
        Self {
            settings,
            backups_dir: backups_dir.into(),
            last_save_time: None,
            last_fingerprint: None,
        }
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Enabled, and the interval has elapsed since the last autosave.
    pub fn should_autosave(&self) -> bool {
        if !self.settings.enabled {
            return false;
        }

        match self.last_save_time {
            None => true,
            Some(last_time) => {
                let elapsed = Utc::now().signed_duration_since(last_time);
                elapsed.num_seconds() >= self.settings.interval_seconds as i64
            }
        }
    }

    /// Autosave the shared scene, holding its read lock while serializing.
    ///
    /// Returns the written path, or `None` when nothing changed since the
    /// last autosave.
    pub fn autosave(&mut self, scene: &SharedScene) -> Result<Option<PathBuf>> {
        let (fingerprint, content) = {
            let guard = scene.read().map_err(|_| FxError::LockPoisoned)?;
            serialize(&guard)?
        };
        self.write_if_changed(fingerprint, content)
    }

    /// Autosave a scene the caller already has exclusive access to.
    pub fn autosave_scene(&mut self, scene: &Scene) -> Result<Option<PathBuf>> {
        let (fingerprint, content) = serialize(scene)?;
        self.write_if_changed(fingerprint, content)
    }

    fn write_if_changed(&mut self, fingerprint: String, content: String) -> Result<Option<PathBuf>> {
        if self.last_fingerprint.as_deref() == Some(fingerprint.as_str()) {
            debug!("scene unchanged, autosave skipped");
            self.last_save_time = Some(Utc::now());
            return Ok(None);
        }

        if !self.backups_dir.exists() {
            fs::create_dir_all(&self.backups_dir).map_err(|e| FxError::DirectoryCreateError {
                path: self.backups_dir.clone(),
                source: e,
            })?;
        }

        let now = Utc::now();
        let autosave_path = self.next_autosave_path(&now);

        fs::write(&autosave_path, content).map_err(|e| FxError::FileWriteError {
            path: autosave_path.clone(),
            source: e,
        })?;

        self.last_save_time = Some(now);
        self.last_fingerprint = Some(fingerprint);
        self.rotate_autosaves()?;

        info!(path = %autosave_path.display(), "autosaved");
        Ok(Some(autosave_path))
    }

    /// `autosave_YYYYMMDD_HHMMSS_mmm.fxgen`, with a `_NNN` counter when that
    /// name is already taken.
    fn next_autosave_path(&self, now: &DateTime<Utc>) -> PathBuf {
        let stamp = now.format("%Y%m%d_%H%M%S_%3f").to_string();
        let mut path = self
            .backups_dir
            .join(format!("{}{}{}", AUTOSAVE_PREFIX, stamp, AUTOSAVE_EXTENSION));

        let mut counter = 1;
        while path.exists() {
            path = self.backups_dir.join(format!(
                "{}{}_{:03}{}",
                AUTOSAVE_PREFIX, stamp, counter, AUTOSAVE_EXTENSION
            ));
            counter += 1;
        }
        path
    }

    /// Delete the oldest autosaves beyond `max_autosaves`.
    pub fn rotate_autosaves(&self) -> Result<()> {
        let mut autosaves = Self::list_autosaves(&self.backups_dir)?;

        // Newest first, so the oldest are at the end.
        while autosaves.len() > self.settings.max_autosaves {
            if let Some(oldest) = autosaves.pop() {
                fs::remove_file(&oldest).map_err(|e| FxError::FileWriteError {
                    path: oldest,
                    source: e,
                })?;
            }
        }

        Ok(())
    }

    /// Autosave files in `backups_dir`, newest first by filename timestamp.
    pub fn list_autosaves(backups_dir: &Path) -> Result<Vec<PathBuf>> {
        if !backups_dir.exists() {
            return Ok(Vec::new());
        }

        let mut autosaves: Vec<PathBuf> = WalkDir::new(backups_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy();
                name.starts_with(AUTOSAVE_PREFIX) && name.ends_with(AUTOSAVE_EXTENSION)
            })
            .map(|entry| entry.path().to_path_buf())
            .collect();

        autosaves.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
        Ok(autosaves)
    }

    pub fn get_latest_autosave(backups_dir: &Path) -> Result<Option<PathBuf>> {
        Ok(Self::list_autosaves(backups_dir)?.into_iter().next())
    }
}

fn serialize(scene: &Scene) -> Result<(String, String)> {
    let document: SceneDocument = scene.to_document();
    Ok((document.fingerprint()?, document.to_json()?))
}

// ============================================================================
// Background loop
// ============================================================================

/// Handle to a running autosave loop.
pub struct AutosaveLoop {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<AutosaveManager>,
}

impl AutosaveLoop {
    /// Stop the loop and get the manager back.
    pub fn stop(self) -> Result<AutosaveManager> {
        self.stop.store(true, Ordering::Relaxed);
        self.handle.join().map_err(|_| FxError::WorkerDisconnected)
    }
}

/// Run `manager` on its own timer thread until stopped.
///
/// Autosave failures are logged and retried on the next interval.
pub fn spawn_autosave_loop(mut manager: AutosaveManager, scene: SharedScene) -> AutosaveLoop {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);

    let handle = thread::spawn(move || {
        while !flag.load(Ordering::Relaxed) {
            if manager.should_autosave() {
                if let Err(e) = manager.autosave(&scene) {
                    warn!(error = %e, "autosave failed");
                    manager.last_save_time = Some(Utc::now());
                }
            }
            thread::sleep(LOOP_TICK);
        }
        manager
    });

    AutosaveLoop { stop, handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_creates_defaults() {
        let manager = AutosaveManager::new("backups");
        assert_eq!(manager.settings.interval_seconds, DEFAULT_AUTOSAVE_INTERVAL);
        assert_eq!(manager.settings.max_autosaves, DEFAULT_MAX_AUTOSAVES);
        assert!(manager.last_save_time.is_none());
        assert!(manager.should_autosave());
    }

    #[test]
    fn test_disabled_never_saves() {
        let settings = AutosaveSettings {
            enabled: false,
            ..AutosaveSettings::default()
        };
        assert!(!AutosaveManager::with_settings("b", settings).should_autosave());
    }

    #[test]
    fn test_list_autosaves_nonexistent_dir() {
        let path = PathBuf::from("/nonexistent/path/that/does/not/exist");
        assert!(AutosaveManager::list_autosaves(&path).unwrap().is_empty());
    }

    #[test]
    fn test_list_autosaves_sorted_newest_first() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("autosave_20240115_100000.fxgen"), "{}").unwrap();
        fs::write(temp.path().join("autosave_20240115_120000.fxgen"), "{}").unwrap();
        fs::write(temp.path().join("autosave_20240115_110000.fxgen"), "{}").unwrap();
        fs::write(temp.path().join("scene.fxgen"), "{}").unwrap();
        fs::write(temp.path().join("autosave_incomplete"), "{}").unwrap();

        let names: Vec<String> = AutosaveManager::list_autosaves(temp.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(
            names,
            vec![
                "autosave_20240115_120000.fxgen",
                "autosave_20240115_110000.fxgen",
                "autosave_20240115_100000.fxgen",
            ]
        );
    }

    #[test]
    fn test_rotate_autosaves_removes_oldest() {
        let temp = tempdir().unwrap();
        for i in 0..5 {
            fs::write(
                temp.path().join(format!("autosave_20240115_10000{}.fxgen", i)),
                "{}",
            )
            .unwrap();
        }

        let settings = AutosaveSettings {
            max_autosaves: 3,
            ..AutosaveSettings::default()
        };
        AutosaveManager::with_settings(temp.path(), settings)
            .rotate_autosaves()
            .unwrap();

        let latest = AutosaveManager::get_latest_autosave(temp.path()).unwrap().unwrap();
        assert!(latest.to_string_lossy().ends_with("100004.fxgen"));
        assert_eq!(AutosaveManager::list_autosaves(temp.path()).unwrap().len(), 3);
    }

    #[test]
    fn test_autosave_skips_unchanged_scene() {
        let temp = tempdir().unwrap();
        let mut scene = Scene::new();
        scene.add_layer("Layer 1", 0);
        let shared = scene.into_shared();

        let mut manager = AutosaveManager::new(temp.path().join("backups"));
        let path = manager.autosave(&shared).unwrap().unwrap();
        assert!(path.exists());
        assert!(manager.autosave(&shared).unwrap().is_none());

        shared.write().unwrap().add_layer("Layer 2", 0);
        assert!(manager.autosave(&shared).unwrap().is_some());

        let restored = SceneDocument::load(&path).unwrap();
        assert!(!restored.layers.is_empty());
    }

    #[test]
    fn test_autosaves_in_same_instant_keep_both() {
        let temp = tempdir().unwrap();
        let mut scene = Scene::new();
        scene.add_layer("Layer 1", 0);

        let mut manager = AutosaveManager::new(temp.path());
        let now = Utc::now();
        let first = manager.next_autosave_path(&now);
        fs::write(&first, "{}").unwrap();
        let second = manager.next_autosave_path(&now);
        assert_ne!(first, second);
        assert!(second.to_string_lossy().ends_with("_001.fxgen"));

        let a = manager.autosave_scene(&scene).unwrap().unwrap();
        scene.add_layer("Layer 2", 0);
        let b = manager.autosave_scene(&scene).unwrap().unwrap();
        assert_ne!(a, b);
        assert!(a.exists() && b.exists());

        let listed = AutosaveManager::list_autosaves(temp.path()).unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0], b);
    }
}
