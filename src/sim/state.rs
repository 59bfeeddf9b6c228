//! Simulation state aggregate
//!
//! Everything one level run mutates lives here and is owned by whoever
//! calls `tick`. There is no global state.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::level::{LevelScript, Timeline};
use super::particles::Particle;
use super::player::Player;
use super::registry::HazardRegistry;
use crate::tuning::Tuning;

/// Complete state of one level run
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Seed for debug spawns and particles
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Seconds since level start
    pub elapsed: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub timeline: Timeline,
    pub hazards: HazardRegistry,
    pub player: Player,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
}

impl SimulationState {
    pub fn new(script: LevelScript, tuning: Tuning, seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(&tuning),
            tuning,
            elapsed: 0.0,
            time_ticks: 0,
            timeline: Timeline::new(script),
            hazards: HazardRegistry::new(),
            particles: Vec::new(),
        }
    }

    /// Play the level again from the start with the same resolved script
    pub fn restart(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.elapsed = 0.0;
        self.time_ticks = 0;
        self.timeline.rewind();
        self.hazards.clear();
        self.player = Player::new(&self.tuning);
        self.particles.clear();
        log::info!("Level restarted ({} events)", self.timeline.script().len());
    }

    pub fn is_defeated(&self) -> bool {
        self.player.is_defeated()
    }

    /// Every scripted hazard has spawned and none is left alive
    pub fn is_cleared(&self) -> bool {
        self.timeline.is_finished() && self.hazards.is_empty()
    }
}
