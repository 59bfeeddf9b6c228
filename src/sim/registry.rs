//! Live hazard collection
//!
//! Owns every hazard in play. The driver spawns into it, updates it,
//! queries it for the player's hits and prunes it once per tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hazard::Hazard;

/// Registry of live hazards, kept in spawn order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HazardRegistry {
    hazards: Vec<Hazard>,
}

impl HazardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, hazard: impl Into<Hazard>) {
        let hazard = hazard.into();
        log::debug!("Spawned {:?} hazard", hazard.kind());
        self.hazards.push(hazard);
    }

    pub fn update_all(&mut self, dt: f32) {
        for hazard in &mut self.hazards {
            hazard.update(dt);
        }
    }

    /// Drop expired hazards, returning how many were removed
    pub fn prune_expired(&mut self) -> usize {
        let before = self.hazards.len();
        self.hazards.retain(|h| !h.is_expired());
        before - self.hazards.len()
    }

    /// First hazard touching the circle, in scan order
    ///
    /// Scan order is by `HazardKind` (projectiles, then spikes, then pistons)
    /// and spawn order within a kind.
    pub fn first_hit(&self, center: Vec2, radius: f32) -> Option<&Hazard> {
        self.hazards
            .iter()
            .enumerate()
            .filter(|(_, h)| h.collides_with_circle(center, radius))
            .min_by_key(|(index, h)| (h.kind(), *index))
            .map(|(_, h)| h)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hazard> {
        self.hazards.iter()
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }

    pub fn clear(&mut self) {
        self.hazards.clear();
    }
}
