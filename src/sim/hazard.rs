//! Hazard entities
//!
//! Three shapes can hurt the player:
//! - `SpinningProjectile`: a sprite flying in a straight line, spinning for show
//! - `Piston`: a thick bar that extends from an anchor and (usually) retracts again
//! - `SpikeZone`: a static spike that never moves or expires
//!
//! `Hazard` wraps them in a closed enum so the registry can treat them uniformly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{circle_overlap, segment_circle_overlap};
use crate::consts::*;

/// 8-bit RGB tint
///
/// Deserializes from three numbers of any magnitude so range-resolved
/// colour channels (which come out fractional) clamp instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]")]
pub struct Rgb(pub [u8; 3]);

impl From<[f32; 3]> for Rgb {
    fn from(channels: [f32; 3]) -> Self {
        Self(channels.map(|c| c.round().clamp(0.0, 255.0) as u8))
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self(HAZARD_COLOR)
    }
}

/// A straight-flying, spinning projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinningProjectile {
    pub pos: Vec2,
    /// Unit heading, or zero if constructed with a zero direction
    pub direction: Vec2,
    pub speed: f32,
    /// Spin rate in degrees/sec (presentation only)
    pub spin_speed: f32,
    /// Current rotation in degrees (presentation only)
    pub angle: f32,
    pub lifetime: f32,
    pub remaining_life: f32,
    /// Full visual size (square sprite side)
    pub size: f32,
    pub color: Rgb,
}

impl SpinningProjectile {
    pub fn new(pos: Vec2, direction: Vec2, speed: f32, lifetime: f32) -> Self {
        Self {
            pos,
            direction: direction.normalize_or_zero(),
            speed,
            spin_speed: 0.0,
            angle: 0.0,
            lifetime,
            remaining_life: lifetime,
            size: PROJECTILE_SIZE,
            color: Rgb::default(),
        }
    }

    pub fn with_spin(mut self, degrees_per_sec: f32) -> Self {
        self.spin_speed = degrees_per_sec;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Collision radius
    #[inline]
    pub fn half_extent(&self) -> f32 {
        self.size / 2.0
    }

    pub fn update(&mut self, dt: f32) {
        self.remaining_life -= dt;
        self.pos += self.direction * self.speed * dt;
        self.angle += self.spin_speed * dt;
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_life <= 0.0
    }

    pub fn collides_with_circle(&self, center: Vec2, radius: f32) -> bool {
        circle_overlap(self.pos, self.half_extent(), center, radius)
    }
}

/// Piston motion phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PistonPhase {
    /// Moving toward full extension
    Extending,
    /// Paused at full extension, then retracts
    HoldExtended { timer: f32 },
    /// Moving toward full retraction
    Retracting,
    /// Paused at full retraction, then extends again
    HoldRetracted { timer: f32 },
    /// One-shot piston parked at full extension for good
    Locked,
    /// Lifetime exhausted; pulls back in along the normal retraction path
    Done,
}

/// An extend/retract bar anchored at `base`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Piston {
    pub base: Vec2,
    /// Unit direction the bar extends toward
    pub direction: Vec2,
    pub length: f32,
    pub width: f32,
    /// Extension speed in length units/sec
    pub speed: f32,
    /// Pause at each end of the stroke; `0` makes a one-shot barrier
    pub delay: f32,
    /// 0 = fully retracted, 1 = fully extended
    pub progress: f32,
    pub phase: PistonPhase,
    /// `None` lives forever
    pub remaining_life: Option<f32>,
    pub color: Rgb,
}

impl Piston {
    pub fn new(base: Vec2, direction: Vec2, length: f32) -> Self {
        Self {
            base,
            direction: direction.normalize_or_zero(),
            length,
            width: PISTON_WIDTH,
            speed: PISTON_SPEED,
            delay: PISTON_DELAY,
            progress: 0.0,
            phase: PistonPhase::Extending,
            remaining_life: None,
            color: Rgb::default(),
        }
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_lifetime(mut self, lifetime: Option<f32>) -> Self {
        self.remaining_life = lifetime;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// True for a piston that extends once and never retracts
    #[inline]
    pub fn is_one_shot(&self) -> bool {
        self.delay == 0.0
    }

    /// Current bar length
    #[inline]
    pub fn extent(&self) -> f32 {
        self.length * self.progress
    }

    /// Moving end of the bar
    #[inline]
    pub fn tip(&self) -> Vec2 {
        self.base + self.direction * self.extent()
    }

    /// Lifetime has run out (the bar may still be retracting)
    pub fn is_done(&self) -> bool {
        self.phase == PistonPhase::Done
    }

    /// Done and fully retracted: nothing left to draw or collide with
    pub fn is_expired(&self) -> bool {
        self.is_done() && self.progress <= 0.0
    }

    /// Progress change for one step of `dt`; the sign of `speed` is ignored
    fn stroke(&self, dt: f32) -> f32 {
        if self.length <= 0.0 {
            return 1.0;
        }
        self.speed.abs() * dt / self.length
    }

    fn retract_by(&mut self, dt: f32) -> bool {
        self.progress = (self.progress - self.stroke(dt)).clamp(0.0, 1.0);
        self.progress <= 0.0
    }

    fn extend_by(&mut self, dt: f32) -> bool {
        self.progress = (self.progress + self.stroke(dt)).clamp(0.0, 1.0);
        self.progress >= 1.0
    }

    pub fn update(&mut self, dt: f32) {
        if self.phase == PistonPhase::Done {
            if self.progress > 0.0 {
                self.retract_by(dt);
            }
            return;
        }

        if let Some(life) = self.remaining_life.as_mut() {
            *life -= dt;
            if *life <= 0.0 {
                self.phase = PistonPhase::Done;
                return;
            }
        }

        let phase = self.phase;
        self.phase = match phase {
            PistonPhase::HoldExtended { timer } => {
                let timer = timer - dt;
                if timer > 0.0 {
                    PistonPhase::HoldExtended { timer }
                } else {
                    PistonPhase::Retracting
                }
            }
            PistonPhase::HoldRetracted { timer } => {
                let timer = timer - dt;
                if timer > 0.0 {
                    PistonPhase::HoldRetracted { timer }
                } else {
                    PistonPhase::Extending
                }
            }
            PistonPhase::Extending => {
                if !self.extend_by(dt) {
                    PistonPhase::Extending
                } else if self.is_one_shot() {
                    PistonPhase::Locked
                } else if self.delay > 0.0 {
                    PistonPhase::HoldExtended { timer: self.delay }
                } else {
                    PistonPhase::Retracting
                }
            }
            PistonPhase::Retracting => {
                if !self.retract_by(dt) {
                    PistonPhase::Retracting
                } else if self.delay > 0.0 {
                    PistonPhase::HoldRetracted { timer: self.delay }
                } else {
                    PistonPhase::Extending
                }
            }
            phase @ (PistonPhase::Locked | PistonPhase::Done) => phase,
        };
    }

    /// Segment-vs-circle test against the deployed part of the bar
    pub fn collides_with_circle(&self, center: Vec2, radius: f32) -> bool {
        if self.extent() <= 0.0 {
            return false;
        }
        segment_circle_overlap(center, radius, self.base, self.tip(), self.width / 2.0)
    }
}

/// A static triangular spike
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeZone {
    /// Middle of the triangle's base edge
    pub pos: Vec2,
    pub size: f32,
    pub color: Rgb,
}

impl SpikeZone {
    pub fn new(pos: Vec2, size: f32) -> Self {
        Self {
            pos,
            size,
            color: Rgb::default(),
        }
    }

    /// Triangle corners: apex, base-left, base-right
    pub fn points(&self) -> [Vec2; 3] {
        let half_base = self.size / 2.0;
        [
            Vec2::new(self.pos.x, self.pos.y - self.size),
            Vec2::new(self.pos.x - half_base, self.pos.y),
            Vec2::new(self.pos.x + half_base, self.pos.y),
        ]
    }

    pub fn collides_with_circle(&self, center: Vec2, radius: f32) -> bool {
        circle_overlap(self.pos, self.size / 1.5, center, radius)
    }
}

/// Hazard category, also used as the collision scan order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    Projectile,
    Spike,
    Piston,
}

/// Any entity that can damage the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Hazard {
    Projectile(SpinningProjectile),
    Piston(Piston),
    Spike(SpikeZone),
}

impl Hazard {
    pub fn kind(&self) -> HazardKind {
        match self {
            Hazard::Projectile(_) => HazardKind::Projectile,
            Hazard::Piston(_) => HazardKind::Piston,
            Hazard::Spike(_) => HazardKind::Spike,
        }
    }

    pub fn update(&mut self, dt: f32) {
        match self {
            Hazard::Projectile(p) => p.update(dt),
            Hazard::Piston(p) => p.update(dt),
            Hazard::Spike(_) => {}
        }
    }

    /// Eligible for removal from the registry
    pub fn is_expired(&self) -> bool {
        match self {
            Hazard::Projectile(p) => p.is_expired(),
            Hazard::Piston(p) => p.is_expired(),
            Hazard::Spike(_) => false,
        }
    }

    pub fn collides_with_circle(&self, center: Vec2, radius: f32) -> bool {
        match self {
            Hazard::Projectile(p) => p.collides_with_circle(center, radius),
            Hazard::Piston(p) => p.collides_with_circle(center, radius),
            Hazard::Spike(s) => s.collides_with_circle(center, radius),
        }
    }

    /// Point the player is pushed away from on a hit
    pub fn knockback_origin(&self) -> Vec2 {
        match self {
            Hazard::Projectile(p) => p.pos,
            Hazard::Piston(p) => p.base,
            Hazard::Spike(s) => s.pos,
        }
    }
}

impl From<SpinningProjectile> for Hazard {
    fn from(p: SpinningProjectile) -> Self {
        Hazard::Projectile(p)
    }
}

impl From<Piston> for Hazard {
    fn from(p: Piston) -> Self {
        Hazard::Piston(p)
    }
}

impl From<SpikeZone> for Hazard {
    fn from(s: SpikeZone) -> Self {
        Hazard::Spike(s)
    }
}
