//! Layered placement: evaluating candidates against terrain and upper-layer influence.
use glam::Vec2;

use crate::ecosystem::{CanopyLayer, SpeciesId};

pub mod evaluator;
pub mod events;
pub mod influence;
pub mod orchestrator;
pub mod tiling;

/// An accepted instance of a species.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Position in map-pixel coordinates.
    pub position: Vec2,
    pub species_id: SpeciesId,
    /// Acceptance probability the position was evaluated to.
    pub probability: f32,
    pub layer: CanopyLayer,
}
