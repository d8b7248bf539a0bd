//! Poisson disk (blue-noise) sampling after Bridson.
use std::f32::consts::{PI, SQRT_2};

use glam::Vec2;
use mint::Vector2;
use rand::RngCore;

use crate::sampling::{rand01, PositionSampling};

/// Default number of candidates tried around an active point.
pub const DEFAULT_ATTEMPTS: usize = 30;

/// Poisson disk sampling strategy.
#[derive(Debug, Clone)]
pub struct PoissonDiskSampling {
    /// Minimum distance between samples in pixels.
    pub min_distance: f32,
    /// Candidates tried in the annulus around an active point before it is retired.
    pub attempts: usize,
}

impl PositionSampling for PoissonDiskSampling {
    fn generate(&self, tile_extent: Vector2<f32>, rng: &mut dyn RngCore) -> Vec<Vector2<f32>> {
        let bounds = Vec2::from(tile_extent);
        if !self.min_distance.is_finite()
            || self.min_distance <= 0.0
            || !bounds.is_finite()
            || bounds.x <= 0.0
            || bounds.y <= 0.0
            || self.attempts == 0
        {
            return Vec::new();
        }

        let mut sampler = PoissonDiskSampler::new(self.min_distance, bounds, self.attempts);
        sampler.generate(rng).into_iter().map(Into::into).collect()
    }
}

impl PoissonDiskSampling {
    pub fn new(min_distance: f32) -> Self {
        Self {
            min_distance,
            attempts: DEFAULT_ATTEMPTS,
        }
    }

    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }
}

struct PoissonDiskSampler {
    min_distance: f32,
    min_distance_sq: f32,
    cell_size: f32,
    grid_width: usize,
    grid_height: usize,
    grid: Vec<Option<Vec2>>,
    active: Vec<Vec2>,
    bounds: Vec2,
    attempts: usize,
}

impl PoissonDiskSampler {
    fn new(min_distance: f32, bounds: Vec2, attempts: usize) -> Self {
        debug_assert!(min_distance > 0.0);
        let cell_size = min_distance / SQRT_2;
        let grid_width = (bounds.x / cell_size).ceil() as usize + 1;
        let grid_height = (bounds.y / cell_size).ceil() as usize + 1;

        Self {
            min_distance,
            min_distance_sq: min_distance * min_distance,
            cell_size,
            grid_width,
            grid_height,
            grid: vec![None; grid_width * grid_height],
            active: Vec::new(),
            bounds,
            attempts,
        }
    }

    #[inline]
    fn cell_of(&self, point: Vec2) -> (usize, usize) {
        let x = ((point.x / self.cell_size).floor() as isize).clamp(0, self.grid_width as isize - 1);
        let y =
            ((point.y / self.cell_size).floor() as isize).clamp(0, self.grid_height as isize - 1);
        (x as usize, y as usize)
    }

    fn accepts(&self, point: Vec2) -> bool {
        if point.x < 0.0 || point.y < 0.0 || point.x >= self.bounds.x || point.y >= self.bounds.y {
            return false;
        }

        // A cell of side d/sqrt(2) holds at most one sample, so two cells in every direction
        // cover the whole disc of radius d.
        let (gx, gy) = self.cell_of(point);
        let x_range = gx.saturating_sub(2)..(gx + 3).min(self.grid_width);
        let y_range = gy.saturating_sub(2)..(gy + 3).min(self.grid_height);

        for y in y_range {
            for x in x_range.clone() {
                if let Some(existing) = self.grid[y * self.grid_width + x] {
                    if existing.distance_squared(point) < self.min_distance_sq {
                        return false;
                    }
                }
            }
        }

        true
    }

    fn insert(&mut self, point: Vec2) {
        let (gx, gy) = self.cell_of(point);
        self.grid[gy * self.grid_width + gx] = Some(point);
        self.active.push(point);
    }

    fn candidate_around(&self, rng: &mut dyn RngCore, center: Vec2) -> Option<Vec2> {
        for _ in 0..self.attempts {
            let angle = rand01(rng) * 2.0 * PI;
            let distance = self.min_distance * (1.0 + rand01(rng));
            let candidate = center + Vec2::new(angle.cos(), angle.sin()) * distance;
            if self.accepts(candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn generate(&mut self, rng: &mut dyn RngCore) -> Vec<Vec2> {
        let seed = Vec2::new(rand01(rng) * self.bounds.x, rand01(rng) * self.bounds.y);
        self.insert(seed);
        let mut points = vec![seed];

        while !self.active.is_empty() {
            let idx = ((rand01(rng) * self.active.len() as f32) as usize).min(self.active.len() - 1);
            let center = self.active[idx];
            match self.candidate_around(rng, center) {
                Some(point) => {
                    self.insert(point);
                    points.push(point);
                }
                None => {
                    self.active.swap_remove(idx);
                }
            }
        }

        points
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn min_pairwise_distance(points: &[Vector2<f32>]) -> f32 {
        let mut min = f32::MAX;
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                let d = Vec2::from(points[i]).distance(Vec2::from(points[j]));
                min = min.min(d);
            }
        }
        min
    }

    #[test]
    fn grid_dimensions_cover_tile() {
        let sampler = PoissonDiskSampler::new(0.5, Vec2::new(2.0, 1.0), DEFAULT_ATTEMPTS);
        assert_eq!(
            sampler.grid_width,
            ((2.0 / sampler.cell_size).ceil() as usize) + 1
        );
        assert_eq!(
            sampler.grid_height,
            ((1.0 / sampler.cell_size).ceil() as usize) + 1
        );
    }

    #[test]
    fn accepts_rejects_close_neighbours_and_outside_points() {
        let mut sampler = PoissonDiskSampler::new(1.0, Vec2::new(4.0, 4.0), DEFAULT_ATTEMPTS);
        sampler.insert(Vec2::new(2.0, 2.0));

        assert!(!sampler.accepts(Vec2::new(2.5, 2.0)));
        assert!(sampler.accepts(Vec2::new(3.5, 3.5)));
        assert!(!sampler.accepts(Vec2::new(-0.1, 1.0)));
        assert!(!sampler.accepts(Vec2::new(1.0, 4.0)));
    }

    #[test]
    fn separation_holds_across_seeds_and_tiles() {
        for seed in 0..8u64 {
            for (tile, distance) in [(16.0, 2.0), (32.0, 3.5), (10.0, 5.0), (64.0, 4.0)] {
                let mut rng = StdRng::seed_from_u64(seed);
                let points =
                    PoissonDiskSampling::new(distance).generate(Vec2::splat(tile).into(), &mut rng);

                assert!(!points.is_empty());
                for p in &points {
                    assert!(p.x >= 0.0 && p.x < tile && p.y >= 0.0 && p.y < tile);
                }
                if points.len() > 1 {
                    let min = min_pairwise_distance(&points);
                    assert!(
                        min >= distance - 1e-4,
                        "seed {seed} tile {tile}: {min} < {distance}"
                    );
                }
                let area_bound = (tile / distance + 1.0).powi(2) * 2.0;
                assert!((points.len() as f32) <= area_bound);
            }
        }
    }

    #[test]
    fn fills_tile_reasonably() {
        let mut rng = StdRng::seed_from_u64(3);
        let points = PoissonDiskSampling::new(2.0).generate(Vec2::splat(32.0).into(), &mut rng);
        // Maximal Poisson disk packings land well above a quarter of the hexagonal bound.
        assert!(points.len() > 60, "only {} points", points.len());
    }

    #[test]
    fn same_seed_reproduces_tile() {
        let sampling = PoissonDiskSampling::new(3.0);
        let a = sampling.generate(Vec2::splat(24.0).into(), &mut StdRng::seed_from_u64(11));
        let b = sampling.generate(Vec2::splat(24.0).into(), &mut StdRng::seed_from_u64(11));
        assert_eq!(a.len(), b.len());
        assert!(a.iter().zip(&b).all(|(p, q)| p.x == q.x && p.y == q.y));
    }

    #[test]
    fn degenerate_parameters_return_no_points() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(PoissonDiskSampling::new(0.0)
            .generate(Vec2::splat(8.0).into(), &mut rng)
            .is_empty());
        assert!(PoissonDiskSampling::new(f32::NAN)
            .generate(Vec2::splat(8.0).into(), &mut rng)
            .is_empty());
        assert!(PoissonDiskSampling::new(1.0)
            .generate(Vec2::ZERO.into(), &mut rng)
            .is_empty());
    }
}
