//! Game configuration: lattice spacing, motion constants, rule policy.
//!
//! ## Layering (`config` crate)
//!
//! | Source                         | Example                               |
//! |--------------------------------|---------------------------------------|
//! | built-in defaults              | `GameConfig::default()`               |
//! | optional TOML file             | `cubewalk.toml`                       |
//! | environment (`CUBEWALK_*`)     | `CUBEWALK_MOTION__MOVE_SPEED_SCALE=2` |
//!
//! Nested keys use `__` as separator in the environment.

use crate::types::GridSpacing;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// What an `Interactable` block means in a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InteractableRole {
    /// Stops movement as a special cell; interacting plays the toggle flourish.
    #[default]
    Activator,
    /// Blocks movement like a static block; interacting still toggles.
    Obstacle,
    /// Stops movement as a special cell; interacting completes the level.
    Goal,
}

/// Where a move ends when the path runs into a special cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpecialStop {
    /// Stop on the last free cell in front of it.
    #[default]
    Before,
    /// Stop on the special cell itself.
    At,
}

/// Per-level rules for interactable and finish blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RulePolicy {
    pub interactable_role: InteractableRole,
    pub special_stop: SpecialStop,
    /// Record activation of interactable blocks in `BlockStates`.
    pub persist_activation: bool,
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

/// Animation constants. Speeds are in world units per second for
/// translation and hundreds of degrees per second for rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Multiplier applied to the speed a move action requests.
    pub move_speed_scale: f32,
    /// Rotation speed of a quarter turn action.
    pub turn_speed: f32,
    /// How far past the truncated target the bounce reaches.
    pub bounce_distance: f32,
    /// Duration of each half of the bounce, in seconds.
    pub bounce_duration: f32,
    pub shake_angle: f32,
    pub shake_speed: f32,
    pub flourish_angle: f32,
    pub flourish_turns: u32,
    pub flourish_speed: f32,
    pub levitate_height: f32,
    pub levitate_duration: f32,
    /// Pause after an interaction finishes, in seconds.
    pub interact_settle: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            move_speed_scale: 1.5,
            turn_speed: 2.0,
            bounce_distance: 0.25,
            bounce_duration: 0.25,
            shake_angle: 15.0,
            shake_speed: 1.0,
            flourish_angle: 120.0,
            flourish_turns: 3,
            flourish_speed: 3.0,
            levitate_height: 0.5,
            levitate_duration: 0.5,
            interact_settle: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub spacing: GridSpacing,
    pub motion: MotionConfig,
    /// Rules used by levels that do not override them.
    pub rules: RulePolicy,
    /// Level loaded on start-up.
    pub start_level: u32,
    /// Host tick rate in Hz.
    pub tick_rate_hz: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spacing: GridSpacing::default(),
            motion: MotionConfig::default(),
            rules: RulePolicy::default(),
            start_level: 1,
            tick_rate_hz: 60.0,
        }
    }
}

impl GameConfig {
    /// Layer an optional TOML file and `CUBEWALK_*` variables over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&GameConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("CUBEWALK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
