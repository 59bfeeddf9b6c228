//! Shapes Dodge entry point
//!
//! Headless native runner: loads a level, lets a simple autopilot play it at
//! a fixed timestep and logs what happened. Drawing, audio and real input
//! belong to a presentation layer that consumes `RenderFrame`s.
//!
//! Usage: `shapes-dodge [level.json] [tuning.json]`
//! (`SHAPES_DODGE_SEED` overrides the RNG seed, `RUST_LOG` the log level)

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;

    use glam::Vec2;
    use shapes_dodge::consts::SIM_DT;
    use shapes_dodge::render::RenderFrame;
    use shapes_dodge::sim::collision::closest_point_on_segment;
    use shapes_dodge::sim::{Hazard, LevelScript, SimEvent, SimulationState, TickInput, tick};
    use shapes_dodge::Tuning;

    const DEFAULT_LEVEL: &str = "levels/level1.json";
    const DEFAULT_SEED: u64 = 0x5EED;
    /// Simulated run length (seconds)
    const RUN_SECONDS: f32 = 30.0;
    /// Hazards closer than this (beyond touching) make the autopilot react
    const DANGER_MARGIN: f32 = 120.0;
    /// Hazards closer than this (beyond touching) make the autopilot dash
    const DASH_MARGIN: f32 = 25.0;

    /// Nearest point of a hazard's body to `pos`
    fn nearest_point(hazard: &Hazard, pos: Vec2) -> Vec2 {
        match hazard {
            Hazard::Projectile(p) => p.pos,
            Hazard::Piston(p) => closest_point_on_segment(pos, p.base, p.tip()),
            Hazard::Spike(s) => s.pos,
        }
    }

    /// Steer away from nearby hazards, drift back toward the middle, dash when cornered
    fn autopilot(state: &SimulationState) -> TickInput {
        let player = &state.player;
        let center = Vec2::new(state.tuning.arena_width, state.tuning.arena_height) / 2.0;

        let mut push = Vec2::ZERO;
        let mut cornered = false;
        for hazard in state.hazards.iter() {
            let away = player.pos - nearest_point(hazard, player.pos);
            let gap = away.length() - state.tuning.player_radius;
            if gap < DANGER_MARGIN {
                push += away.normalize_or_zero() * (DANGER_MARGIN - gap);
            }
            cornered |= hazard.collides_with_circle(player.pos, state.tuning.player_radius + DASH_MARGIN);
        }

        let homing = (center - player.pos) * 0.05;
        TickInput {
            intent: (push + homing).normalize_or_zero(),
            dash: cornered,
            ..Default::default()
        }
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        env_logger::init();
        log::info!("Shapes Dodge (headless) starting...");

        let mut args = std::env::args().skip(1);
        let level_path = args.next().unwrap_or_else(|| DEFAULT_LEVEL.to_string());
        let tuning = match args.next() {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };
        let seed = match std::env::var("SHAPES_DODGE_SEED") {
            Ok(raw) => raw.parse()?,
            Err(_) => DEFAULT_SEED,
        };

        let script = LevelScript::load(&level_path, seed)?;
        let mut state = SimulationState::new(script, tuning, seed);
        log::info!("Game initialized with seed: {}", seed);

        let frames = (RUN_SECONDS / SIM_DT).round() as u64;
        let (mut spawned, mut hits, mut dashes) = (0u32, 0u32, 0u32);
        let mut frame = RenderFrame::capture(&state);

        for _ in 0..frames {
            let input = autopilot(&state);
            for event in tick(&mut state, &input, SIM_DT) {
                match event {
                    SimEvent::HazardSpawned { .. } => spawned += 1,
                    SimEvent::DashStarted { .. } => dashes += 1,
                    SimEvent::PlayerHit { .. } => hits += 1,
                    SimEvent::PlayerDefeated => {}
                }
            }

            frame = RenderFrame::capture(&state);
            if state.time_ticks % 60 == 0 {
                log::debug!(
                    "t={:.1}s health={} hazards={} particles={}",
                    frame.elapsed,
                    frame.health,
                    frame.hazards.len(),
                    frame.particles.len()
                );
            }
            if state.is_defeated() {
                break;
            }
        }

        let outcome = if frame.defeated {
            "defeated"
        } else if state.is_cleared() {
            "cleared"
        } else {
            "survived"
        };
        log::info!(
            "Run {outcome} at {:.1}s: {spawned} hazards spawned, {hits} hits, {dashes} dashes, health {}",
            frame.elapsed,
            frame.health
        );
        println!(
            "{outcome}: t={:.1}s health={} hits={hits} dashes={dashes} spawned={spawned}",
            frame.elapsed, frame.health
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by the host page on the web
}
