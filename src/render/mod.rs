//! Render descriptors
//!
//! The simulation never draws. Each frame the presentation layer asks for a
//! `RenderFrame` and draws whatever it describes.

pub mod sprites;

pub use sprites::{HazardShape, HazardSprite, ParticleSprite, PlayerSprite, RenderFrame};
