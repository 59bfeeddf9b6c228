//! Per-frame sprite descriptions built from the simulation state
//!
//! Angles are in degrees, measured clockwise on screen (y grows downward).

use glam::Vec2;
use serde::Serialize;

use crate::consts::{PLAYER_COLOR, PLAYER_HIT_COLOR};
use crate::heading_degrees;
use crate::sim::hazard::{Hazard, HazardKind};
use crate::sim::particles::Particle;
use crate::sim::player::Player;
use crate::sim::state::SimulationState;
use crate::tuning::Tuning;

/// Geometry to draw for a hazard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HazardShape {
    /// Square sprite of side `size`, rotated about its centre
    Sprite { size: f32 },
    /// Filled rectangle `length` x `width`, rotated about its centre
    Bar { length: f32, width: f32 },
    /// Filled triangle in world coordinates
    Triangle { points: [Vec2; 3] },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HazardSprite {
    pub kind: HazardKind,
    pub center: Vec2,
    pub rotation: f32,
    pub shape: HazardShape,
    pub color: [u8; 3],
}

impl HazardSprite {
    /// Nothing to draw for a fully retracted piston
    pub fn from_hazard(hazard: &Hazard) -> Option<Self> {
        let sprite = match hazard {
            Hazard::Projectile(p) => Self {
                kind: HazardKind::Projectile,
                center: p.pos,
                rotation: p.angle,
                shape: HazardShape::Sprite { size: p.size },
                color: p.color.0,
            },
            Hazard::Piston(p) => {
                let length = p.extent();
                if length <= 0.0 {
                    return None;
                }
                Self {
                    kind: HazardKind::Piston,
                    center: p.base + p.direction * length / 2.0,
                    rotation: heading_degrees(p.direction),
                    shape: HazardShape::Bar {
                        length,
                        width: p.width,
                    },
                    color: p.color.0,
                }
            }
            Hazard::Spike(s) => Self {
                kind: HazardKind::Spike,
                center: s.pos,
                rotation: 0.0,
                shape: HazardShape::Triangle { points: s.points() },
                color: s.color.0,
            },
        };
        Some(sprite)
    }
}

/// Player circle, squashed and stretched while dashing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSprite {
    pub center: Vec2,
    /// Ellipse extent along and across `rotation`
    pub size: Vec2,
    pub rotation: f32,
    /// True on the lit half of the invincibility blink
    pub blink_on: bool,
    pub color: [u8; 3],
}

impl PlayerSprite {
    pub fn from_player(player: &Player, elapsed: f32, tuning: &Tuning) -> Self {
        let diameter = tuning.player_radius * 2.0;
        let (size, rotation) = if player.is_dashing() && player.dash_direction != Vec2::ZERO {
            (
                Vec2::new(
                    diameter * tuning.squash_factor,
                    diameter / tuning.squash_factor,
                ),
                heading_degrees(player.dash_direction),
            )
        } else {
            (Vec2::splat(diameter), 0.0)
        };

        let blink_on = player.is_invincible() && blink_phase(elapsed, tuning.blink_period);
        Self {
            center: player.pos,
            size,
            rotation,
            blink_on,
            color: if blink_on { PLAYER_HIT_COLOR } else { PLAYER_COLOR },
        }
    }
}

/// Alternates every `period` seconds, starting lit
fn blink_phase(elapsed: f32, period: f32) -> bool {
    if period <= 0.0 {
        return true;
    }
    ((elapsed / period).floor() as i64) % 2 == 0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleSprite {
    pub center: Vec2,
    pub radius: f32,
    pub color: [u8; 3],
    pub alpha: u8,
}

impl From<&Particle> for ParticleSprite {
    fn from(p: &Particle) -> Self {
        Self {
            center: p.pos,
            radius: p.radius,
            color: p.color,
            alpha: p.alpha(),
        }
    }
}

/// Everything the presentation layer needs for one frame (draw in field order)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub elapsed: f32,
    pub health: u32,
    pub defeated: bool,
    pub particles: Vec<ParticleSprite>,
    pub hazards: Vec<HazardSprite>,
    pub player: PlayerSprite,
}

impl RenderFrame {
    pub fn capture(state: &SimulationState) -> Self {
        Self {
            elapsed: state.elapsed,
            health: state.player.health,
            defeated: state.is_defeated(),
            particles: state.particles.iter().map(ParticleSprite::from).collect(),
            hazards: state
                .hazards
                .iter()
                .filter_map(HazardSprite::from_hazard)
                .collect(),
            player: PlayerSprite::from_player(&state.player, state.elapsed, &state.tuning),
        }
    }
}
