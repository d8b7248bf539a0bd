//! Slope from central differences of the elevation.
use crate::config::MapParams;
use crate::maps::saturate;
use crate::raster::Raster;

/// Gradient magnitude of `elevation` sampled `slope_distance` pixels either side of each
/// pixel, scaled by `height_scale` and clamped to `[0, 1]`. Samples clamp at the edges.
pub fn slope(elevation: &Raster, params: &MapParams) -> Raster {
    let d = params.slope_distance as isize;
    let scale = params.height_scale;
    Raster::from_fn(elevation.width, elevation.height, |x, y| {
        let (x, y) = (x as isize, y as isize);
        let dx = (elevation.get_clamped(x + d, y) - elevation.get_clamped(x - d, y)) * scale;
        let dy = (elevation.get_clamped(x, y + d) - elevation.get_clamped(x, y - d)) * scale;
        saturate((dx * dx + dy * dy).sqrt())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_terrain_has_no_slope() {
        let slope = slope(&Raster::filled(5, 5, 0.7), &MapParams::default());
        assert!(slope.data.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn ramp_slope_matches_central_difference() {
        let elevation = Raster::from_fn(8, 4, |x, _| x as f32 * 0.01);
        let params = MapParams::new().with_height_scale(10.0).with_slope_distance(1);
        let slope = slope(&elevation, &params);
        // Interior: (0.01 * (x+1) - 0.01 * (x-1)) * 10 = 0.2.
        assert!((slope.get(3, 2) - 0.2).abs() < 1e-5);
        // Left edge clamps the x-1 sample onto the pixel itself.
        assert!((slope.get(0, 2) - 0.1).abs() < 1e-5);
    }

    #[test]
    fn steep_cliff_saturates() {
        let elevation = Raster::from_fn(4, 4, |x, _| if x < 2 { 0.0 } else { 1.0 });
        let slope = slope(&elevation, &MapParams::default());
        assert_eq!(slope.get(1, 1), 1.0);
        assert_eq!(slope.get(2, 1), 1.0);
    }

    #[test]
    fn larger_distance_reaches_further() {
        let elevation = Raster::from_fn(9, 1, |x, _| if x == 8 { 1.0 } else { 0.0 });
        let near = slope(&elevation, &MapParams::new().with_slope_distance(1));
        let far = slope(&elevation, &MapParams::new().with_slope_distance(3));
        assert_eq!(near.get(5, 0), 0.0);
        assert!(far.get(5, 0) > 0.0);
    }
}
