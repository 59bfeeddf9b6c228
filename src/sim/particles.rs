//! Player trail particles (visual only, never collide)

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::PLAYER_COLOR;

/// Maximum live particles
pub const MAX_PARTICLES: usize = 256;

/// Particles spawned per tick while the trail is active
const TRAIL_PARTICLES_PER_TICK: usize = 2;

/// Squared speed (units/tick) above which the player leaves a trail
pub const TRAIL_SPEED_SQ: f32 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds left
    pub life: f32,
    pub max_life: f32,
    pub radius: f32,
    pub color: [u8; 3],
}

impl Particle {
    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.life -= dt;
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }

    /// Opacity fading linearly with remaining life
    pub fn alpha(&self) -> u8 {
        if self.max_life <= 0.0 {
            return 0;
        }
        (255.0 * (self.life / self.max_life)).clamp(0.0, 255.0) as u8
    }
}

/// Emit a puff of particles behind something at `pos` moving along `vel`
pub fn spawn_trail(particles: &mut Vec<Particle>, pos: Vec2, vel: Vec2, rng: &mut impl Rng) {
    let heading = vel.normalize_or_zero();
    let across = heading.perp();

    for _ in 0..TRAIL_PARTICLES_PER_TICK {
        if particles.len() >= MAX_PARTICLES {
            return;
        }
        let back = -heading * rng.random_range(30.0f32..60.0);
        let spread = across * rng.random_range(-40.0f32..40.0);
        let life: f32 = rng.random_range(0.1..0.4);
        particles.push(Particle {
            pos,
            vel: back + spread,
            life,
            max_life: life,
            radius: rng.random_range(3..=6) as f32,
            color: PLAYER_COLOR,
        });
    }
}

/// Advance and cull
pub fn update_particles(particles: &mut Vec<Particle>, dt: f32) {
    for particle in particles.iter_mut() {
        particle.update(dt);
    }
    particles.retain(|p| !p.is_dead());
}
