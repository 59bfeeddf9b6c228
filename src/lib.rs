//! Shapes Dodge - simulation core for a top-down dodging game
//!
//! Core modules:
//! - `sim`: Simulation (hazards, level timeline, player, collisions)
//! - `render`: Render descriptors handed to an external presentation layer
//! - `tuning`: Data-driven game balance

pub mod render;
pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Arena dimensions (top-left origin, y grows downward)
    pub const ARENA_WIDTH: f32 = 1920.0;
    pub const ARENA_HEIGHT: f32 = 1080.0;

    /// Default hazard tint (hot pink)
    pub const HAZARD_COLOR: [u8; 3] = [255, 0, 150];
    /// Player body colour
    pub const PLAYER_COLOR: [u8; 3] = [0, 200, 255];
    /// Player colour on the "on" half of an invincibility blink
    pub const PLAYER_HIT_COLOR: [u8; 3] = [255, 60, 60];

    /// Level event defaults (used when a record omits or mangles a field)
    pub const PROJECTILE_SPEED: f32 = 100.0;
    pub const PROJECTILE_LIFETIME: f32 = 5.0;
    pub const PROJECTILE_SIZE: f32 = 60.0;
    pub const PISTON_WIDTH: f32 = 40.0;
    pub const PISTON_SPEED: f32 = 300.0;
    pub const PISTON_DELAY: f32 = 1.0;
    pub const SPIKE_SIZE: f32 = 60.0;

    /// Debug projectile spawn
    pub const DEBUG_PROJECTILE_SPEED_MIN: f32 = 100.0;
    pub const DEBUG_PROJECTILE_SPEED_MAX: f32 = 360.0;
    pub const DEBUG_PROJECTILE_SPIN: f32 = 180.0;

    /// Debug piston spawn (full-width one-shot sweep)
    pub const DEBUG_PISTON_WIDTH: f32 = 50.0;
    pub const DEBUG_PISTON_SPEED: f32 = 15000.0;
    pub const DEBUG_PISTON_LIFETIME: f32 = 1.0;
}

/// Rotate a vector by an angle in degrees (positive = clockwise on screen)
#[inline]
pub fn rotate_degrees(v: Vec2, degrees: f32) -> Vec2 {
    v.rotate(Vec2::from_angle(degrees.to_radians()))
}

/// Heading of a vector in degrees, `0` for the zero vector
#[inline]
pub fn heading_degrees(v: Vec2) -> f32 {
    if v == Vec2::ZERO {
        0.0
    } else {
        v.y.atan2(v.x).to_degrees()
    }
}
