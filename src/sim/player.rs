//! Player controller
//!
//! Two independent state machines:
//! - `Motion`: free movement with friction, or a fixed-velocity dash
//! - `Guard`: vulnerable, or in the grace window after a hit
//!
//! The player is invincible while dashing or while in grace, never otherwise.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Movement state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Input-driven movement with friction
    Free,
    /// Locked into a dash until `dash_duration` has passed since `started_at`
    Dashing { direction: Vec2, started_at: f32 },
}

/// Damage state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Guard {
    Vulnerable,
    /// Post-hit invincibility
    Grace { hit_at: f32 },
}

/// The player-controlled circle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Displacement per tick
    pub vel: Vec2,
    pub health: u32,
    pub motion: Motion,
    pub guard: Guard,
    /// Direction of the most recent dash
    pub dash_direction: Vec2,
    pub last_dash_at: Option<f32>,
    pub last_hit_at: Option<f32>,
}

impl Player {
    /// Spawn at the middle of the arena
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.arena_width / 2.0, tuning.arena_height / 2.0),
            vel: Vec2::ZERO,
            health: tuning.start_health,
            motion: Motion::Free,
            guard: Guard::Vulnerable,
            dash_direction: Vec2::ZERO,
            last_dash_at: None,
            last_hit_at: None,
        }
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.motion, Motion::Dashing { .. })
    }

    pub fn is_invincible(&self) -> bool {
        self.is_dashing() || matches!(self.guard, Guard::Grace { .. })
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    pub fn can_dash(&self, now: f32, tuning: &Tuning) -> bool {
        !self.is_dashing()
            && self
                .last_dash_at
                .is_none_or(|at| now - at >= tuning.dash_cooldown)
    }

    /// Start a dash along `intent` (or +x with no input); returns whether it started
    pub fn try_dash(&mut self, intent: Vec2, now: f32, tuning: &Tuning) -> bool {
        if !self.can_dash(now, tuning) {
            return false;
        }

        let direction = if intent.length_squared() > 0.0 {
            intent.normalize()
        } else {
            Vec2::X
        };
        self.motion = Motion::Dashing {
            direction,
            started_at: now,
        };
        self.dash_direction = direction;
        self.last_dash_at = Some(now);
        log::debug!("Dash toward {direction}");
        true
    }

    /// Advance velocity and position by one tick
    pub fn step(&mut self, intent: Vec2, now: f32, dt: f32, tuning: &Tuning) {
        match self.motion {
            Motion::Dashing {
                direction,
                started_at,
            } => {
                if now - started_at < tuning.dash_duration {
                    self.vel = direction * tuning.dash_speed;
                } else {
                    // Dash velocity coasts one more tick before friction takes over
                    self.motion = Motion::Free;
                }
            }
            Motion::Free => {
                self.vel += intent * tuning.acceleration * dt;
                self.vel *= tuning.friction;
            }
        }

        self.pos += self.vel;
        self.clamp_to_arena(tuning);
    }

    /// Keep the whole circle inside the arena
    pub fn clamp_to_arena(&mut self, tuning: &Tuning) {
        let r = tuning.player_radius;
        let lo = Vec2::splat(r);
        let hi = Vec2::new(tuning.arena_width - r, tuning.arena_height - r);
        self.pos = self.pos.max(lo).min(hi);
    }

    /// Take a hit from a hazard at `origin`; returns false if blocked
    pub fn apply_hit(&mut self, origin: Vec2, now: f32, tuning: &Tuning) -> bool {
        if self.is_invincible() || self.is_defeated() {
            return false;
        }

        self.health -= 1;
        self.guard = Guard::Grace { hit_at: now };
        self.last_hit_at = Some(now);
        self.vel = (self.pos - origin).normalize_or_zero() * tuning.knockback_strength;
        true
    }

    /// End post-hit grace once it has lasted `hit_grace`
    pub fn expire_grace(&mut self, now: f32, tuning: &Tuning) {
        if let Guard::Grace { hit_at } = self.guard {
            if now - hit_at >= tuning.hit_grace {
                self.guard = Guard::Vulnerable;
            }
        }
    }
}
