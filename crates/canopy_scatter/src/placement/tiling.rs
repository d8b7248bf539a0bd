//! Tile grid over the map and deterministic per-tile seeds.
//!
//! The map is covered by square tiles of the candidate tile's size, starting at the origin.
//! Tiles on the right and bottom edges may extend beyond the map; candidates falling outside
//! are skipped by the orchestrator.
use glam::Vec2;

use crate::ecosystem::CanopyLayer;

/// Tile coordinates in tile units, row-major from the map origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32, pub u32);

/// Number of tiles `(columns, rows)` needed to cover a `width` x `height` map.
pub fn tile_grid(width: usize, height: usize, tile_size: f32) -> (u32, u32) {
    debug_assert!(tile_size > 0.0, "tile_size must be > 0");
    let columns = (width as f32 / tile_size).ceil() as u32;
    let rows = (height as f32 / tile_size).ceil() as u32;
    (columns, rows)
}

/// All tiles covering the map, row-major.
pub fn tiles_covering(width: usize, height: usize, tile_size: f32) -> Vec<TileId> {
    let (columns, rows) = tile_grid(width, height, tile_size);
    (0..rows)
        .flat_map(|ty| (0..columns).map(move |tx| TileId(tx, ty)))
        .collect()
}

/// Map-space origin of a tile.
pub fn tile_origin(tile: TileId, tile_size: f32) -> Vec2 {
    Vec2::new(tile.0 as f32, tile.1 as f32) * tile_size
}

/// Whether `p` lies inside the `width` x `height` map.
#[inline]
pub fn inside_map(p: Vec2, width: usize, height: usize) -> bool {
    p.x >= 0.0 && p.y >= 0.0 && p.x < width as f32 && p.y < height as f32
}

/// Creates a deterministic seed for one tile of one layer from the run seed.
pub fn seed_for_tile(base_seed: u64, layer: CanopyLayer, tile: TileId) -> u64 {
    let tx = tile.0 as u64;
    let ty = tile.1 as u64;
    let tl = layer.index() as u64 + 1;
    let mixed = base_seed
        ^ tx.wrapping_mul(0x9E3779B97F4A7C15)
        ^ ty.wrapping_mul(0xBF58476D1CE4E5B9)
        ^ tl.wrapping_mul(0xD6E8FEB86659FD93);
    mix_u64(mixed)
}

#[inline]
pub(crate) fn mix_u64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn grid_covers_partial_tiles() {
        assert_eq!(tile_grid(64, 64, 32.0), (2, 2));
        assert_eq!(tile_grid(65, 10, 32.0), (3, 1));
        assert_eq!(tiles_covering(65, 10, 32.0).len(), 3);
    }

    #[test]
    fn tiles_are_row_major() {
        let tiles = tiles_covering(20, 20, 10.0);
        assert_eq!(
            tiles,
            vec![TileId(0, 0), TileId(1, 0), TileId(0, 1), TileId(1, 1)]
        );
        assert_eq!(tile_origin(TileId(1, 1), 10.0), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn map_bounds_are_half_open() {
        assert!(inside_map(Vec2::new(0.0, 0.0), 4, 4));
        assert!(inside_map(Vec2::new(3.9, 3.9), 4, 4));
        assert!(!inside_map(Vec2::new(4.0, 1.0), 4, 4));
        assert!(!inside_map(Vec2::new(-0.1, 1.0), 4, 4));
    }

    #[test]
    fn seeds_differ_per_tile_and_layer() {
        let mut seen = HashSet::new();
        for layer in CanopyLayer::ALL {
            for tile in tiles_covering(40, 40, 10.0) {
                assert!(seen.insert(seed_for_tile(7, layer, tile)));
            }
        }
        assert_eq!(
            seed_for_tile(7, CanopyLayer::L2, TileId(3, 1)),
            seed_for_tile(7, CanopyLayer::L2, TileId(3, 1))
        );
    }
}
