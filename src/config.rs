//! Match configuration
//!
//! Everything an operator may tune before a match starts. Loaded from JSON;
//! any field left out falls back to the shipping defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::STARTING_HP;
use crate::sim::weapons::WeaponCatalog;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Grappling hook tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrappleConfig {
    /// Launch speed of the hook projectile
    pub hook_speed: f32,
    /// Range of the hook and longest allowed rope
    pub max_length: f32,
    /// Shortest allowed rope
    pub min_length: f32,
    /// Rope length change per tick while climbing/descending
    pub rope_speed: f32,
    /// Horizontal acceleration per tick while swinging
    pub swing_force: f32,
}

impl Default for GrappleConfig {
    fn default() -> Self {
        Self {
            hook_speed: 18.0,
            max_length: 450.0,
            min_length: 15.0,
            rope_speed: 2.5,
            swing_force: 0.08,
        }
    }
}

/// Match settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Seconds per turn
    pub turn_duration_secs: u32,
    pub starting_hp: u32,
    pub team_names: [String; 2],

    // === Physics ===
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Wind is sampled uniformly from [-wind_max, wind_max] each turn
    pub wind_max: f32,

    // === Locomotion ===
    /// Horizontal distance walked per tick
    pub walk_speed: f32,
    /// Aim change per tick (radians)
    pub aim_rate: f32,
    /// Jump impulse (x is multiplied by facing)
    pub jump_impulse: (f32, f32),
    /// Tallest ledge a worm can walk up
    pub step_height: f32,
    /// Height at which spawn placement starts scanning down
    pub spawn_scan_start: f32,

    pub grapple: GrappleConfig,
    pub weapons: WeaponCatalog,
    /// Power gained per tick while a charged weapon is held
    pub charge_rate: f32,

    /// Cosmetic particle cap
    pub max_particles: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            turn_duration_secs: 30,
            starting_hp: STARTING_HP,
            team_names: ["RENEGADES".to_string(), "BLITZKRIEG".to_string()],

            gravity: 9.8 / 120.0,
            wind_max: 0.08,

            walk_speed: 0.8,
            aim_rate: 0.015,
            jump_impulse: (1.5, -3.0),
            step_height: 5.0,
            spawn_scan_start: 0.0,

            grapple: GrappleConfig::default(),
            weapons: WeaponCatalog::default(),
            charge_rate: 1.1,

            max_particles: crate::consts::MAX_PARTICLES,
        }
    }
}

impl MatchConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded match config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.turn_duration_secs == 0 {
            return invalid("turn_duration_secs must be positive");
        }
        if self.starting_hp == 0 {
            return invalid("starting_hp must be positive");
        }
        if !(self.gravity >= 0.0) {
            return invalid("gravity must be non-negative");
        }
        if !(self.wind_max >= 0.0) {
            return invalid("wind_max must be non-negative");
        }
        if !(self.walk_speed > 0.0) || !(self.aim_rate > 0.0) {
            return invalid("walk_speed and aim_rate must be positive");
        }
        let g = &self.grapple;
        if !(g.min_length > 0.0) || g.min_length > g.max_length {
            return invalid("grapple lengths must satisfy 0 < min_length <= max_length");
        }
        if !(g.hook_speed > 0.0) || !(g.rope_speed > 0.0) {
            return invalid("hook_speed and rope_speed must be positive");
        }
        if !(self.charge_rate > 0.0) {
            return invalid("charge_rate must be positive");
        }
        self.weapons.validate().map_err(ConfigError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(MatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = MatchConfig::from_json(r#"{ "turn_duration_secs": 45 }"#).unwrap();
        assert_eq!(config.turn_duration_secs, 45);
        assert_eq!(config.starting_hp, 100);
        assert_eq!(config.grapple, GrappleConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = MatchConfig {
            wind_max: 0.02,
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(MatchConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_zero_turn_duration() {
        let err = MatchConfig::from_json(r#"{ "turn_duration_secs": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_inverted_rope_bounds() {
        let mut config = MatchConfig::default();
        config.grapple.min_length = 500.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            MatchConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = MatchConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
