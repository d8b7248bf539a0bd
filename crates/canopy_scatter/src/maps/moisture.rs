//! Heuristic soil moisture.
use crate::config::MapParams;
use crate::maps::saturate;
use crate::raster::Raster;

/// Combines low elevation, gentle slope, depressions and nearby water into one moisture
/// value per pixel.
pub fn moisture(
    elevation: &Raster,
    slope: &Raster,
    relative_height: &Raster,
    water_spread: &Raster,
    params: &MapParams,
) -> Raster {
    Raster::from_fn(elevation.width, elevation.height, |x, y| {
        moisture_at(
            elevation.get(x, y),
            slope.get(x, y),
            relative_height.get(x, y),
            water_spread.get(x, y),
            params,
        )
    })
}

#[inline]
fn moisture_at(height: f32, slope: f32, relative: f32, spread: f32, params: &MapParams) -> f32 {
    let base = (1.0 - height) * params.weight_height;
    let slope_term = (1.0 - slope) * params.weight_slope;
    let rh_term = (1.0 - relative) * params.weight_relative_height;
    let relative_moisture = rh_term - slope_term + 1.0;
    saturate((base + spread) * relative_moisture + rh_term * params.omega + spread)
}
