//! Data-driven game balance
//!
//! Every field has a default matching the shipped feel, so a tuning file
//! only needs the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};

/// Tuning file failure
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Player and arena balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,

    // === Movement ===
    /// Player hitbox radius
    pub player_radius: f32,
    /// Velocity gained per second of held input (units/tick per second)
    pub acceleration: f32,
    /// Per-tick velocity multiplier outside a dash
    pub friction: f32,

    // === Damage ===
    pub start_health: u32,
    /// Invincibility after a hit (seconds)
    pub hit_grace: f32,
    /// Knockback velocity (units/tick)
    pub knockback_strength: f32,

    // === Dash ===
    /// Minimum time between dash starts (seconds)
    pub dash_cooldown: f32,
    pub dash_duration: f32,
    /// Dash velocity (units/tick)
    pub dash_speed: f32,

    // === Presentation ===
    pub trail_particles: bool,
    /// Half-period of the invincibility blink (seconds)
    pub blink_period: f32,
    /// Stretch along the dash heading (and squash across it)
    pub squash_factor: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,

            player_radius: 20.0,
            acceleration: 125.0,
            friction: 0.75,

            start_health: 3,
            hit_grace: 1.5,
            knockback_strength: 50.0,

            dash_cooldown: 0.5,
            dash_duration: 0.15,
            dash_speed: 20.0,

            trail_particles: true,
            blink_period: 0.1,
            squash_factor: 1.5,
        }
    }
}

impl Tuning {
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let tuning = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }
}
