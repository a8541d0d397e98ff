//! Persisted overlay settings.
//!
//! Settings are a small JSON document with camelCase keys. Every key is
//! optional:
//!
//! ```json
//! {
//!   "enabled": true,
//!   "effect": "fireworks",
//!   "intensity": 1.5,
//!   "colors": ["#ff4757", "#3742fa"]
//! }
//! ```
//!
//! `effect` accepts any effect name or `"shuffle"`. A click at `(x, y)`
//! becomes [`EffectOptions`] with `count = round(60 × intensity)` and
//! `power = intensity`.

use crate::color::{default_colors, Color};
use crate::effects::{EffectChoice, EffectOptions};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const MIN_INTENSITY: f32 = 0.25;
pub const MAX_INTENSITY: f32 = 3.0;

/// Particles per click at intensity 1.
pub const BASE_COUNT: f32 = 60.0;

fn default_enabled() -> bool {
    true
}

fn default_intensity() -> f32 {
    1.0
}

/// Overlay settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlayConfig {
    /// Clicks are ignored while disabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub effect: EffectChoice,
    /// Count and power multiplier, clamped to `[0.25, 3]` when used.
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default = "default_colors")]
    pub colors: Vec<Color>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            effect: EffectChoice::default(),
            intensity: 1.0,
            colors: default_colors(),
        }
    }
}

impl OverlayConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Load `path`, or fall back to defaults if it is missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded settings from {}", path.display());
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("{} ({}), using defaults", e, path.display());
                Self::default()
            }
        }
    }

    /// Intensity clamped to `[0.25, 3]`; non-finite values become 1.
    pub fn clamped_intensity(&self) -> f32 {
        if self.intensity.is_finite() {
            self.intensity.clamp(MIN_INTENSITY, MAX_INTENSITY)
        } else {
            1.0
        }
    }

    /// Colors to emit with; an empty list falls back to the default palette.
    pub fn palette(&self) -> Vec<Color> {
        if self.colors.is_empty() {
            default_colors()
        } else {
            self.colors.clone()
        }
    }

    /// Options for a click at `(x, y)`.
    pub fn effect_options(&self, x: f32, y: f32) -> EffectOptions {
        let intensity = self.clamped_intensity();
        EffectOptions::at(x, y)
            .colors(self.palette())
            .count((BASE_COUNT * intensity).round() as u32)
            .power(intensity)
    }
}

/// Settings pinned from outside the settings file, such as the command line.
///
/// They are applied on top of every load, so a reload never undoes them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigOverrides {
    pub effect: Option<EffectChoice>,
    pub intensity: Option<f32>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.effect.is_none() && self.intensity.is_none()
    }

    pub fn apply(&self, mut config: OverlayConfig) -> OverlayConfig {
        if let Some(effect) = self.effect {
            config.effect = effect;
        }
        if let Some(intensity) = self.intensity {
            config.intensity = intensity;
        }
        config
    }
}
