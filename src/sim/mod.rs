//! Simulation module
//!
//! All gameplay logic lives here:
//! - Single-threaded, one `tick` per frame
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod hazard;
pub mod level;
pub mod particles;
pub mod player;
pub mod registry;
pub mod state;
pub mod tick;

pub use collision::{circle_overlap, segment_circle_overlap, segment_distance};
pub use hazard::{Hazard, HazardKind, Piston, PistonPhase, Rgb, SpikeZone, SpinningProjectile};
pub use level::{LevelError, LevelEvent, LevelEventKind, LevelScript, Timeline};
pub use player::{Guard, Motion, Player};
pub use registry::HazardRegistry;
pub use state::SimulationState;
pub use tick::{SimEvent, TickInput, tick};
