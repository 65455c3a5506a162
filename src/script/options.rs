//! Compile options
//!
//! Everything the compiler needs besides the layers themselves: the skill
//! name, the command kind, a global vertical bias and the animation mode
//! flags. Options are plain serde data so they can live in a settings file
//! next to the scene.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FxError, Result};
use crate::geometry::rise_is_valid;

/// Skill name used when none (or only whitespace) is given.
pub const DEFAULT_SKILL_NAME: &str = "MySkill";

/// Which command kind non-persistent modes emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    #[default]
    Particles,
    Clouds,
}

/// Global rotation about the scene origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotateSettings {
    pub enabled: bool,
    pub speed: f64,
}

impl Default for RotateSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            speed: 2.0,
        }
    }
}

/// Each element orbiting its own position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalRotateSettings {
    pub enabled: bool,
    pub radius: f64,
    /// Degrees of phase per frame.
    pub speed: f64,
}

impl Default for LocalRotateSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            radius: 0.4,
            speed: 1.0,
        }
    }
}

/// Rising motion. Standalone, or layered on top of global rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiseSettings {
    pub enabled: bool,
    pub speed: f64,
    pub limit: f64,
}

impl Default for RiseSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            speed: 0.1,
            limit: 10.0,
        }
    }
}

impl RiseSettings {
    /// Enabled and usable. Disabled-by-invalid-parameters is reported
    /// separately as a compile warning.
    pub fn is_active(&self) -> bool {
        self.enabled && rise_is_valid(self.speed, self.limit)
    }
}

/// Nearest-neighbour ordering with periodic delays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximitySettings {
    pub enabled: bool,
    /// Insert a delay after every `step` commands; `<= 0` disables it.
    pub step: i64,
    /// Length of the inserted delay in ticks; `<= 0` disables it.
    pub delay_ticks: i64,
}

impl Default for ProximitySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            step: 5,
            delay_ticks: 5,
        }
    }
}

impl ProximitySettings {
    /// Whether the running command count calls for a delay line now.
    pub fn delay_due(&self, count: u64) -> bool {
        self.step > 0 && self.delay_ticks > 0 && count % self.step as u64 == 0
    }
}

/// Mode flags. The animation modes are mutually exclusive and resolved in
/// priority order by [`ModeSettings::animation`]; `rainbow` and
/// `performance` combine with any of them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeSettings {
    pub rotate: RotateSettings,
    pub local_rotate: LocalRotateSettings,
    pub rise: RiseSettings,
    pub proximity: ProximitySettings,
    pub persistent: bool,
    pub rainbow: bool,
    pub performance: bool,
}

/// The one animation strategy applied to every layer of a compilation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Animation {
    GlobalRotation {
        speed: f64,
        /// `(speed, limit)` of a rise running under the rotation.
        rise: Option<(f64, f64)>,
    },
    LocalRotation {
        radius: f64,
        speed: f64,
    },
    Rise {
        speed: f64,
        limit: f64,
    },
    Proximity(ProximitySettings),
    Persistent,
    Single,
}

impl ModeSettings {
    /// Resolve the flags into a strategy:
    /// global rotation > local rotation > rise > proximity > persistent > single.
    ///
    /// A rise with unusable parameters counts as not requested.
    pub fn animation(&self) -> Animation {
        let rise = self.rise.is_active().then_some((self.rise.speed, self.rise.limit));

        if self.rotate.enabled {
            Animation::GlobalRotation {
                speed: self.rotate.speed,
                rise,
            }
        } else if self.local_rotate.enabled {
            Animation::LocalRotation {
                radius: self.local_rotate.radius,
                speed: self.local_rotate.speed,
            }
        } else if let Some((speed, limit)) = rise {
            Animation::Rise { speed, limit }
        } else if self.proximity.enabled {
            Animation::Proximity(self.proximity)
        } else if self.persistent {
            Animation::Persistent
        } else {
            Animation::Single
        }
    }

    /// Rise was asked for but its parameters cannot drive it.
    pub fn rise_disabled(&self) -> bool {
        self.rise.enabled && !self.rise.is_active()
    }
}

/// Options for one compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub skill_name: String,
    pub effect_kind: EffectKind,
    /// Added to every layer's vertical offset.
    pub global_y_offset: f64,
    pub modes: ModeSettings,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            skill_name: DEFAULT_SKILL_NAME.to_string(),
            effect_kind: EffectKind::default(),
            global_y_offset: 0.0,
            modes: ModeSettings::default(),
        }
    }
}

impl CompileOptions {
    pub fn new(skill_name: impl Into<String>) -> Self {
        Self {
            skill_name: skill_name.into(),
            ..Self::default()
        }
    }

    /// Trimmed skill name, falling back to [`DEFAULT_SKILL_NAME`].
    pub fn resolved_skill_name(&self) -> &str {
        let name = self.skill_name.trim();
        if name.is_empty() {
            DEFAULT_SKILL_NAME
        } else {
            name
        }
    }

    /// Load options from a JSON settings file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FxError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path).map_err(|e| FxError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let options: Self = serde_json::from_reader(BufReader::new(file))?;
        debug!(path = %path.display(), "compile options loaded");
        Ok(options)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| FxError::DirectoryCreateError {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let file = File::create(path).map_err(|e| FxError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
