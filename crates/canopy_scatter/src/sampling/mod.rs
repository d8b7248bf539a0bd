//! Candidate generation for the placement passes.
//!
//! A [`PositionSampling`] strategy fills one square tile with candidate points. The
//! orchestrator generates a single [`CandidateTile`] per run and translates it across every
//! map tile.
use mint::Vector2;
use rand::RngCore;

pub mod poisson_disk;
pub mod tile;

pub use poisson_disk::PoissonDiskSampling;
pub use tile::CandidateTile;

/// Trait for position sampling within a tile spanning `[0, extent)` on both axes.
pub trait PositionSampling: Send + Sync {
    fn generate(&self, tile_extent: Vector2<f32>, rng: &mut dyn RngCore) -> Vec<Vector2<f32>>;
}

/// Generate a random float in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    let value = (rng.next_u32() >> 8) as f32;
    value / (1u32 << 24) as f32
}
