//! A single tile of candidate points, reused by translation across the map.
use glam::Vec2;
use rand::RngCore;
use tracing::debug;

use crate::config::SamplerParams;
use crate::sampling::{PoissonDiskSampling, PositionSampling};

/// Candidate points in tile-local coordinates `[0, tile_size)²`.
#[derive(Clone, Debug, Default)]
pub struct CandidateTile {
    pub tile_size: f32,
    pub points: Vec<Vec2>,
}

impl CandidateTile {
    pub fn new(tile_size: f32, points: Vec<Vec2>) -> Self {
        Self { tile_size, points }
    }

    /// Generates the tile with Poisson disk sampling.
    pub fn generate(params: &SamplerParams, rng: &mut dyn RngCore) -> Self {
        let sampling = PoissonDiskSampling::new(params.min_distance).with_attempts(params.attempts);
        Self::from_sampling(&sampling, params.tile_size, rng)
    }

    /// Generates the tile with an arbitrary sampling strategy.
    pub fn from_sampling(
        sampling: &dyn PositionSampling,
        tile_size: f32,
        rng: &mut dyn RngCore,
    ) -> Self {
        let points: Vec<Vec2> = sampling
            .generate(Vec2::splat(tile_size).into(), rng)
            .into_iter()
            .map(Vec2::from)
            .collect();
        debug!(
            "Generated candidate tile: {} points over {}x{} px.",
            points.len(),
            tile_size,
            tile_size
        );
        Self::new(tile_size, points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The tile's points shifted to a map-space tile origin.
    pub fn translated(&self, origin: Vec2) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().map(move |p| *p + origin)
    }
}
