//! Simulation tick
//!
//! One call advances the level by one frame. The order of the steps is fixed:
//! 1. advance the clock
//! 2. release due timeline events (plus any debug spawns)
//! 3. apply player input and move the player
//! 4. update hazards
//! 5. resolve player-vs-hazard collisions
//! 6. prune expired hazards
//!
//! Pruning runs after collisions, so a hazard can still land a hit on the
//! tick it expires.

use glam::Vec2;
use rand::Rng;

use super::hazard::{HazardKind, Piston, SpinningProjectile};
use super::particles::{TRAIL_SPEED_SQ, spawn_trail, update_particles};
use super::state::SimulationState;
use crate::consts::*;
use crate::rotate_degrees;

/// Input for a single tick, already decoded by the input layer
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement direction (length ≤ 1, zero when idle)
    pub intent: Vec2,
    /// Dash button
    pub dash: bool,
    /// Debug: spawn a projectile at arena centre
    pub spawn_projectile: bool,
    /// Debug: spawn a full-width sweeping piston
    pub spawn_piston: bool,
}

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    HazardSpawned { kind: HazardKind, scripted: bool },
    DashStarted { direction: Vec2 },
    PlayerHit { by: HazardKind, health: u32 },
    PlayerDefeated,
}

/// Advance the simulation by `dt` seconds
pub fn tick(state: &mut SimulationState, input: &TickInput, dt: f32) -> Vec<SimEvent> {
    let mut events = Vec::new();

    state.elapsed += dt;
    state.time_ticks += 1;
    let now = state.elapsed;

    for event in state.timeline.release_due(now) {
        let hazard = event.to_hazard();
        events.push(SimEvent::HazardSpawned {
            kind: hazard.kind(),
            scripted: true,
        });
        state.hazards.spawn(hazard);
    }
    if input.spawn_projectile {
        spawn_debug_projectile(state);
        events.push(SimEvent::HazardSpawned {
            kind: HazardKind::Projectile,
            scripted: false,
        });
    }
    if input.spawn_piston {
        spawn_debug_piston(state);
        events.push(SimEvent::HazardSpawned {
            kind: HazardKind::Piston,
            scripted: false,
        });
    }

    let intent = if state.player.is_defeated() {
        Vec2::ZERO
    } else {
        input.intent.clamp_length_max(1.0)
    };
    if input.dash
        && !state.player.is_defeated()
        && state.player.try_dash(intent, now, &state.tuning)
    {
        events.push(SimEvent::DashStarted {
            direction: state.player.dash_direction,
        });
    }
    state.player.step(intent, now, dt, &state.tuning);

    if state.tuning.trail_particles
        && (state.player.vel.length_squared() > TRAIL_SPEED_SQ || state.player.is_dashing())
    {
        spawn_trail(
            &mut state.particles,
            state.player.pos,
            state.player.vel,
            &mut state.rng,
        );
    }
    update_particles(&mut state.particles, dt);

    state.hazards.update_all(dt);

    if !state.player.is_invincible() && !state.player.is_defeated() {
        let hit = state
            .hazards
            .first_hit(state.player.pos, state.tuning.player_radius)
            .map(|h| (h.kind(), h.knockback_origin()));

        if let Some((kind, origin)) = hit {
            if state.player.apply_hit(origin, now, &state.tuning) {
                let health = state.player.health;
                log::info!("Player hit by {kind:?} at {now:.2}s, health {health}");
                events.push(SimEvent::PlayerHit { by: kind, health });
                if state.player.is_defeated() {
                    log::info!("Player defeated at {now:.2}s");
                    events.push(SimEvent::PlayerDefeated);
                }
            }
        }
    }
    state.player.expire_grace(now, &state.tuning);

    state.hazards.prune_expired();

    events
}

/// Spinning projectile from arena centre in a random direction
pub fn spawn_debug_projectile(state: &mut SimulationState) {
    let center = Vec2::new(state.tuning.arena_width, state.tuning.arena_height) / 2.0;
    let heading = state.rng.random_range(0..=360) as f32;
    let speed = state
        .rng
        .random_range(DEBUG_PROJECTILE_SPEED_MIN..=DEBUG_PROJECTILE_SPEED_MAX);

    state.hazards.spawn(
        SpinningProjectile::new(
            center,
            rotate_degrees(Vec2::X, heading),
            speed,
            PROJECTILE_LIFETIME,
        )
        .with_spin(DEBUG_PROJECTILE_SPIN),
    );
}

/// One-shot piston sweeping across the full arena width at a random height
pub fn spawn_debug_piston(state: &mut SimulationState) {
    let y = state.rng.random_range(0.0..=state.tuning.arena_height);

    state.hazards.spawn(
        Piston::new(Vec2::new(0.0, y), Vec2::X, state.tuning.arena_width)
            .with_width(DEBUG_PISTON_WIDTH)
            .with_speed(DEBUG_PISTON_SPEED)
            .with_delay(0.0)
            .with_lifetime(Some(DEBUG_PISTON_LIFETIME)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hazard::{Hazard, SpikeZone};
    use crate::sim::level::{LevelEvent, LevelEventKind, LevelScript, PistonSpawn};
    use crate::sim::hazard::Rgb;
    use crate::tuning::Tuning;

    fn empty_state() -> SimulationState {
        SimulationState::new(LevelScript::default(), Tuning::default(), 12345)
    }

    #[test]
    fn test_timeline_spawns_on_schedule() {
        let script = LevelScript::from_events(vec![LevelEvent {
            time: 0.5,
            kind: LevelEventKind::SpawnPiston(PistonSpawn {
                pos: Vec2::ZERO,
                direction: Vec2::X,
                length: 100.0,
                width: 40.0,
                speed: 300.0,
                delay: 1.0,
                lifetime: None,
                color: Rgb::default(),
            }),
        }]);
        let mut state = SimulationState::new(script, Tuning::default(), 1);
        let input = TickInput::default();

        let events = tick(&mut state, &input, 0.25);
        assert!(events.is_empty());
        assert!(state.hazards.is_empty());

        let events = tick(&mut state, &input, 0.25);
        assert_eq!(
            events,
            vec![SimEvent::HazardSpawned {
                kind: HazardKind::Piston,
                scripted: true
            }]
        );
        assert_eq!(state.hazards.len(), 1);
        assert!(state.timeline.is_finished());
    }

    #[test]
    fn test_overlapping_hazards_damage_once() {
        let mut state = empty_state();
        let pos = state.player.pos;
        state
            .hazards
            .spawn(SpinningProjectile::new(pos + Vec2::new(5.0, 0.0), Vec2::X, 0.0, 10.0));
        state.hazards.spawn(SpikeZone::new(pos, 60.0));
        let mut piston = Piston::new(pos - Vec2::new(50.0, 0.0), Vec2::X, 100.0).with_delay(0.0);
        piston.progress = 1.0;
        state.hazards.spawn(piston);

        let events = tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.player.health, 2);
        assert!(state.player.is_invincible());
        assert_eq!(
            events,
            vec![SimEvent::PlayerHit {
                by: HazardKind::Projectile,
                health: 2
            }]
        );
        // Knocked away from the projectile (which sits to the right)
        assert!(state.player.vel.x < 0.0);

        // Still overlapping next tick, but in grace
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.player.health, 2);
    }

    #[test]
    fn test_grace_ends_and_player_can_be_hit_again() {
        let mut state = empty_state();
        state.tuning.knockback_strength = 0.0;
        let pos = state.player.pos;
        state.hazards.spawn(SpikeZone::new(pos, 60.0));

        tick(&mut state, &TickInput::default(), 0.1);
        assert_eq!(state.player.health, 2);
        // Grace covers 1.5s; by 2.1s the player has been hit again exactly once
        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), 0.1);
        }
        assert_eq!(state.player.health, 1);
    }

    #[test]
    fn test_dash_passes_through_hazard() {
        let mut state = empty_state();
        let pos = state.player.pos;
        state
            .hazards
            .spawn(SpinningProjectile::new(pos, Vec2::X, 0.0, 10.0));
        let input = TickInput {
            intent: Vec2::Y,
            dash: true,
            ..Default::default()
        };

        let events = tick(&mut state, &input, SIM_DT);
        assert_eq!(
            events,
            vec![SimEvent::DashStarted { direction: Vec2::Y }]
        );
        assert_eq!(state.player.health, state.tuning.start_health);
    }

    #[test]
    fn test_expiring_projectile_hits_on_final_tick() {
        let mut state = empty_state();
        let pos = state.player.pos;
        state
            .hazards
            .spawn(SpinningProjectile::new(pos, Vec2::X, 0.0, 0.01));

        let events = tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(matches!(events[0], SimEvent::PlayerHit { .. }));
        assert!(state.hazards.is_empty());
    }

    #[test]
    fn test_defeat_stops_damage() {
        let mut state = empty_state();
        state.player.health = 1;
        state.tuning.hit_grace = 0.0;
        let pos = state.player.pos;
        state.hazards.spawn(SpikeZone::new(pos, 200.0));

        let events = tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(events.contains(&SimEvent::PlayerDefeated));
        assert!(state.is_defeated());

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.player.health, 0);
    }

    #[test]
    fn test_debug_spawns_bypass_timeline() {
        let script = LevelScript::from_events(vec![LevelEvent {
            time: 100.0,
            kind: LevelEventKind::SpawnPiston(PistonSpawn {
                pos: Vec2::ZERO,
                direction: Vec2::Y,
                length: 10.0,
                width: 10.0,
                speed: 10.0,
                delay: 1.0,
                lifetime: None,
                color: Rgb::default(),
            }),
        }]);
        let mut state = SimulationState::new(script, Tuning::default(), 3);
        // Park the player in a corner away from the sweep and the projectile
        state.player.pos = Vec2::splat(20.0);
        let input = TickInput {
            spawn_projectile: true,
            spawn_piston: true,
            ..Default::default()
        };

        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.hazards.len(), 2);
        assert_eq!(state.timeline.released(), 0);

        let kinds: Vec<HazardKind> = state.hazards.iter().map(Hazard::kind).collect();
        assert_eq!(kinds, vec![HazardKind::Projectile, HazardKind::Piston]);
        let Some(Hazard::Piston(piston)) = state.hazards.iter().nth(1) else {
            panic!("expected piston");
        };
        assert_eq!(piston.length, state.tuning.arena_width);
        assert!(piston.is_one_shot());
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = empty_state();
        let mut b = empty_state();
        let inputs = [
            TickInput {
                spawn_projectile: true,
                ..Default::default()
            },
            TickInput {
                intent: Vec2::X,
                ..Default::default()
            },
            TickInput {
                dash: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for input in &inputs {
            tick(&mut a, input, SIM_DT);
            tick(&mut b, input, SIM_DT);
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.particles.len(), b.particles.len());
        let Some(Hazard::Projectile(pa)) = a.hazards.iter().next() else {
            panic!("expected projectile");
        };
        let Some(Hazard::Projectile(pb)) = b.hazards.iter().next() else {
            panic!("expected projectile");
        };
        assert_eq!(pa.pos, pb.pos);
    }
}
