//! Script line formatting
//!
//! Every line the compiler writes comes from here. Command and delay lines
//! carry the `  - ` marker; the header and layer comments do not.

use std::fmt::Display;

use super::options::EffectKind;
use crate::scene::Layer;

/// Cloud duration for cloud-kind commands outside persistent mode.
pub const CLOUD_DURATION: u32 = 100;

/// Cloud duration used by persistent mode.
pub const PERSISTENT_CLOUD_DURATION: u32 = 200;

/// First two lines of every script.
pub fn header_lines(skill_name: &str) -> [String; 2] {
    [format!("{}:", skill_name), "  Skills:".to_string()]
}

pub fn comment_line(name: &str) -> String {
    format!("  # {}", name)
}

pub fn delay_line(ticks: impl Display) -> String {
    format!("  - delay {}", ticks)
}

/// Shape of the emitted command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Particles,
    Cloud { duration: u32 },
}

impl From<EffectKind> for CommandKind {
    fn from(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Particles => CommandKind::Particles,
            EffectKind::Clouds => CommandKind::Cloud {
                duration: CLOUD_DURATION,
            },
        }
    }
}

/// Per-layer command parameters, resolved once and rendered per point.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTemplate {
    pub kind: CommandKind,
    pub particle: String,
    pub alpha: f64,
    pub repeat: u32,
    pub repeat_interval: u32,
    pub targeter: String,
}

impl CommandTemplate {
    pub fn for_layer(layer: &Layer, kind: CommandKind) -> Self {
        Self {
            kind,
            particle: layer.particle.clone(),
            alpha: layer.alpha,
            repeat: layer.repeat,
            repeat_interval: layer.repeat_interval,
            targeter: layer.targeter.to_string(),
        }
    }

    /// One command line at `(x, z)` and height `y`.
    pub fn render(&self, color: &str, x: f64, z: f64, y: f64) -> String {
        let anchor = format!(
            "@{}{{xoffset={:.4};zoffset={:.4};yoffset={:.4}}}",
            self.targeter, x, z, y
        );
        match self.kind {
            CommandKind::Particles => format!(
                "  - effect:particles{{p={};c={};a={};size=1;repeat={};repeatInterval={}}} {}",
                self.particle, color, self.alpha, self.repeat, self.repeat_interval, anchor
            ),
            CommandKind::Cloud { duration } => format!(
                "  - summonareaeffectcloud{{particle={};d={};r=1;color={}}} {}",
                self.particle, duration, color, anchor
            ),
        }
    }
}
