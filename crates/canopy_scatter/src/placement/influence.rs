//! Influence fields: how strongly placed layers suppress the layers below them.
//!
//! After a layer is evaluated its occupancy raster (1 at accepted pixels) is turned into a
//! field in `[0, 1]` and max-merged into the running influence raster, which therefore only
//! grows from layer to layer.
use rayon::prelude::*;

use crate::config::InfluenceMode;
use crate::maps::saturate;
use crate::raster::edt::distance_to_sites;
use crate::raster::{disc_taps, Raster};

/// Marks every pixel within Euclidean `radius` of an occupied pixel with `1.0`.
pub fn dilate(occupancy: &Raster, radius: f32) -> Raster {
    let taps = disc_taps(radius.max(0.0));
    Raster::from_fn(occupancy.width, occupancy.height, |x, y| {
        let covered = taps.iter().any(|tap| {
            tap.offset_in(occupancy, x, y)
                .is_some_and(|(nx, ny)| occupancy.get(nx, ny) > 0.0)
        });
        if covered {
            1.0
        } else {
            0.0
        }
    })
}

/// Smooth falloff from the exact distance `d` to the nearest occupied pixel:
/// `1` within `trunk_radius`, falling linearly to `0` at `zone_of_influence`.
pub fn distance_falloff(occupancy: &Raster, zone_of_influence: f32, trunk_radius: f32) -> Raster {
    if occupancy.count_positive() == 0 {
        return Raster::new(occupancy.width, occupancy.height);
    }
    let mut field = distance_to_sites(occupancy, f32::MIN_POSITIVE);
    field
        .data
        .par_iter_mut()
        .for_each(|d| *d = falloff(*d, zone_of_influence, trunk_radius));
    field
}

#[inline]
fn falloff(distance: f32, zone_of_influence: f32, trunk_radius: f32) -> f32 {
    if zone_of_influence <= trunk_radius {
        return if distance <= trunk_radius { 1.0 } else { 0.0 };
    }
    1.0 - saturate((distance - trunk_radius) / (zone_of_influence - trunk_radius))
}

/// The field a layer contributes under `mode`.
pub fn layer_field(
    occupancy: &Raster,
    mode: InfluenceMode,
    zone_of_influence: f32,
    trunk_radius: f32,
) -> Raster {
    match mode {
        InfluenceMode::Dilate => dilate(occupancy, zone_of_influence),
        InfluenceMode::ExactDistance => {
            distance_falloff(occupancy, zone_of_influence, trunk_radius)
        }
    }
}

/// Pixel-wise `max` of `field` into `influence`. Both must have the same size.
pub fn merge_max(influence: &mut Raster, field: &Raster) {
    debug_assert!(influence.same_size(field), "influence size mismatch");
    influence
        .data
        .par_iter_mut()
        .zip(field.data.par_iter())
        .for_each(|(acc, v)| *acc = acc.max(*v));
}
