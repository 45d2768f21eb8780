use std::num::NonZeroUsize;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::{Cadence, Key, Keymap, Palette, Velocity};
use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_frame_period_seconds")]
    pub frame_period_seconds: f64,
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: f64,
    #[serde(default = "default_delay_step_seconds")]
    pub delay_step_seconds: f64,
    #[serde(default = "default_delay_floor_seconds")]
    pub delay_floor_seconds: f64,
    #[serde(default = "default_max_shapes")]
    pub max_shapes: usize,
    #[serde(default = "default_velocity")]
    pub velocity: Velocity,
    #[serde(default)]
    pub radius: RadiusRange,
    #[serde(default)]
    pub palette: Palette,
    #[serde(default = "default_host_refresh_hz")]
    pub host_refresh_hz: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub key_bindings: KeyBindings,
}

fn default_frame_period_seconds() -> f64 { 1.0 / 30.0 }
fn default_delay_seconds() -> f64 { 0.1 }
fn default_delay_step_seconds() -> f64 { 0.1 }
fn default_delay_floor_seconds() -> f64 { 0.1 }
fn default_max_shapes() -> usize { 100 }
fn default_velocity() -> Velocity { Velocity::new(-1, 1) }
fn default_host_refresh_hz() -> u32 { 120 }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadiusRange {
    pub min: u16,
    pub max: u16,
}

impl Default for RadiusRange {
    fn default() -> Self {
        RadiusRange { min: 1, max: 4 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub toggle: String,
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
    pub help: String,
    pub quit: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            toggle: "Space".into(),
            up: "Up".into(),
            down: "Down".into(),
            left: "Left".into(),
            right: "Right".into(),
            help: "h".into(),
            quit: "q".into(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            frame_period_seconds: default_frame_period_seconds(),
            delay_seconds: default_delay_seconds(),
            delay_step_seconds: default_delay_step_seconds(),
            delay_floor_seconds: default_delay_floor_seconds(),
            max_shapes: default_max_shapes(),
            velocity: default_velocity(),
            radius: RadiusRange::default(),
            palette: Palette::default(),
            host_refresh_hz: default_host_refresh_hz(),
            seed: None,
            key_bindings: KeyBindings::default(),
        }
    }
}

/// Checked, ready-to-use form of `AnimationConfig`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub frame_period_seconds: f64,
    pub cadence: Cadence,
    pub max_shapes: NonZeroUsize,
    pub velocity: Velocity,
    pub radius: RangeInclusive<u16>,
    pub palette: Palette,
    pub host_refresh_hz: u32,
    pub seed: Option<u64>,
    pub keymap: Keymap,
    pub quit: Key,
}

impl Default for Settings {
    fn default() -> Self {
        AnimationConfig::default()
            .validate()
            .expect("default configuration is valid")
    }
}

impl AnimationConfig {
    /// Load from `path`, or from the per-user default location when `path` is
    /// `None`. Only an explicitly named file is allowed to fail.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            return serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse {}", path.display()));
        }

        let config_path = Self::config_path();
        let config = match std::fs::read_to_string(&config_path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %config_path.display(), "invalid config ({e}), using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };
        Ok(config)
    }

    fn config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("ascii-circles");
        path.push("config.json");
        path
    }

    pub fn validate(&self) -> Result<Settings, ConfigError> {
        if !(self.frame_period_seconds.is_finite() && self.frame_period_seconds > 0.0) {
            return Err(ConfigError::InvalidFramePeriod(self.frame_period_seconds));
        }
        if !(self.delay_floor_seconds.is_finite() && self.delay_floor_seconds > 0.0) {
            return Err(ConfigError::InvalidDelay(format!(
                "floor must be positive, got {}",
                self.delay_floor_seconds
            )));
        }
        if !(self.delay_step_seconds.is_finite() && self.delay_step_seconds >= 0.0) {
            return Err(ConfigError::InvalidDelay(format!(
                "step must not be negative, got {}",
                self.delay_step_seconds
            )));
        }
        if !(self.delay_seconds.is_finite() && self.delay_seconds >= self.delay_floor_seconds) {
            return Err(ConfigError::InvalidDelay(format!(
                "delay {} is below the floor {}",
                self.delay_seconds, self.delay_floor_seconds
            )));
        }
        let max_shapes = NonZeroUsize::new(self.max_shapes).ok_or(ConfigError::ZeroCapacity)?;
        let RadiusRange { min, max } = self.radius;
        if min == 0 || min > max {
            return Err(ConfigError::InvalidRadius { min, max });
        }
        if self.host_refresh_hz == 0 {
            return Err(ConfigError::InvalidRefreshRate);
        }

        let b = &self.key_bindings;
        let keymap = Keymap {
            toggle: parse_binding("toggle", &b.toggle)?,
            up: parse_binding("up", &b.up)?,
            down: parse_binding("down", &b.down)?,
            left: parse_binding("left", &b.left)?,
            right: parse_binding("right", &b.right)?,
            help: parse_binding("help", &b.help)?,
        };
        let quit = parse_binding("quit", &b.quit)?;
        check_distinct(&[
            ("toggle", keymap.toggle),
            ("up", keymap.up),
            ("down", keymap.down),
            ("left", keymap.left),
            ("right", keymap.right),
            ("help", keymap.help),
            ("quit", quit),
        ])?;

        Ok(Settings {
            frame_period_seconds: self.frame_period_seconds,
            cadence: Cadence::new(
                self.delay_seconds,
                self.delay_step_seconds,
                self.delay_floor_seconds,
            ),
            max_shapes,
            velocity: self.velocity,
            radius: min..=max,
            palette: self.palette.clone(),
            host_refresh_hz: self.host_refresh_hz,
            seed: self.seed,
            keymap,
            quit,
        })
    }
}

fn parse_binding(action: &'static str, binding: &str) -> Result<Key, ConfigError> {
    Key::parse(binding).ok_or_else(|| ConfigError::UnknownKey {
        action,
        binding: binding.to_string(),
    })
}

/// Every action needs its own key, otherwise the later one is unreachable.
fn check_distinct(bindings: &[(&'static str, Key)]) -> Result<(), ConfigError> {
    for (i, &(first, a)) in bindings.iter().enumerate() {
        for &(second, b) in &bindings[i + 1..] {
            if a.matches(b) {
                return Err(ConfigError::DuplicateKey {
                    key: b.to_string(),
                    first,
                    second,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behaviour() {
        let settings = Settings::default();
        assert_eq!(settings.max_shapes.get(), 100);
        assert_eq!(settings.cadence.delay_seconds(), 0.1);
        assert_eq!(settings.velocity, Velocity::new(-1, 1));
        assert_eq!(settings.keymap, Keymap::default());
        assert_eq!(settings.quit, Key::Char('q'));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: AnimationConfig =
            serde_json::from_str(r#"{"max_shapes": 5, "palette": {"named": ["red"]}}"#).unwrap();
        let settings = config.validate().unwrap();
        assert_eq!(settings.max_shapes.get(), 5);
        assert_eq!(settings.frame_period_seconds, 1.0 / 30.0);
        assert_eq!(settings.palette, Palette::Named(vec![crate::types::NamedColor::Red]));
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let json = serde_json::to_string_pretty(&AnimationConfig::default()).unwrap();
        let config: AnimationConfig = serde_json::from_str(&json).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_capacity_fails_fast() {
        let config = AnimationConfig {
            max_shapes: 0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err(), ConfigError::ZeroCapacity);
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let period = AnimationConfig {
            frame_period_seconds: 0.0,
            ..Default::default()
        };
        assert!(matches!(period.validate(), Err(ConfigError::InvalidFramePeriod(_))));

        let delay = AnimationConfig {
            delay_seconds: 0.05,
            ..Default::default()
        };
        assert!(matches!(delay.validate(), Err(ConfigError::InvalidDelay(_))));

        let radius = AnimationConfig {
            radius: RadiusRange { min: 5, max: 2 },
            ..Default::default()
        };
        assert_eq!(
            radius.validate().unwrap_err(),
            ConfigError::InvalidRadius { min: 5, max: 2 }
        );

        let refresh = AnimationConfig {
            host_refresh_hz: 0,
            ..Default::default()
        };
        assert_eq!(refresh.validate().unwrap_err(), ConfigError::InvalidRefreshRate);
    }

    #[test]
    fn unknown_binding_names_the_action() {
        let mut config = AnimationConfig::default();
        config.key_bindings.help = "Hyper-h".into();
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::UnknownKey {
                action: "help",
                binding: "Hyper-h".into()
            }
        );
    }

    #[test]
    fn duplicate_bindings_are_rejected() {
        let mut config = AnimationConfig::default();
        config.key_bindings.quit = "h".into();
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::DuplicateKey {
                key: "h".into(),
                first: "help",
                second: "quit"
            }
        );

        let mut config = AnimationConfig::default();
        config.key_bindings.toggle = "Down".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateKey {
                first: "toggle",
                second: "down",
                ..
            })
        ));

        let mut config = AnimationConfig::default();
        config.key_bindings.left = "H".into();
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateKey { .. })));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = AnimationConfig::load(Some(Path::new("/nonexistent/ascii-circles.json")))
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read"));
    }
}
