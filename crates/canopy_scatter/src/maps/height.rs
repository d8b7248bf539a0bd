//! Mean and relative height.
use crate::maps::saturate;
use crate::raster::{disc_taps, Raster};

/// Weighted average of `elevation` over a disc of `radius` pixels with linear falloff
/// `max(0, 1 - dist / radius)`. Pixels outside the raster do not contribute.
pub fn mean_height(elevation: &Raster, radius: usize) -> Raster {
    if radius == 0 {
        let mut copy = elevation.clone();
        copy.clamp_values(0.0, 1.0);
        return copy;
    }

    let r = radius as f32;
    let taps: Vec<_> = disc_taps(r)
        .into_iter()
        .map(|t| (t, (1.0 - t.distance / r).max(0.0)))
        .filter(|(_, w)| *w > 0.0)
        .collect();

    Raster::from_fn(elevation.width, elevation.height, |x, y| {
        let mut sum = 0.0;
        let mut total = 0.0;
        for (tap, weight) in &taps {
            if let Some((nx, ny)) = tap.offset_in(elevation, x, y) {
                sum += elevation.get(nx, ny) * weight;
                total += weight;
            }
        }
        if total > 0.0 {
            saturate(sum / total)
        } else {
            saturate(elevation.get(x, y))
        }
    })
}

/// `elevation - mean + 0.5`, clamped: below 0.5 is a depression, above an elevation.
pub fn relative_height(elevation: &Raster, mean_height: &Raster) -> Raster {
    Raster::from_fn(elevation.width, elevation.height, |x, y| {
        saturate(elevation.get(x, y) - mean_height.get(x, y) + 0.5)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_flat_terrain_is_flat() {
        let mean = mean_height(&Raster::filled(7, 5, 0.4), 3);
        assert!(mean.data.iter().all(|v| (*v - 0.4).abs() < 1e-6));
    }

    #[test]
    fn zero_radius_copies_elevation() {
        let elevation = Raster::from_fn(3, 3, |x, y| (x + y) as f32 * 0.1);
        assert_eq!(mean_height(&elevation, 0), elevation);
    }

    #[test]
    fn peak_is_smoothed_toward_neighbours() {
        let mut elevation = Raster::new(9, 9);
        elevation.set(4, 4, 1.0);
        let mean = mean_height(&elevation, 2);
        let centre = mean.get(4, 4);
        assert!(centre > 0.0 && centre < 1.0);
        assert!(mean.get(5, 4) > 0.0);
        assert!(mean.get(5, 4) < centre);
        assert_eq!(mean.get(0, 0), 0.0);
    }

    #[test]
    fn relative_height_marks_pits_and_peaks() {
        let mut elevation = Raster::filled(9, 9, 0.5);
        elevation.set(2, 2, 0.1);
        elevation.set(6, 6, 0.9);
        let mean = mean_height(&elevation, 2);
        let rel = relative_height(&elevation, &mean);
        assert!(rel.get(2, 2) < 0.5);
        assert!(rel.get(6, 6) > 0.5);
        assert!((rel.get(4, 0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn relative_height_clamps() {
        let elevation = Raster::filled(2, 1, 1.0);
        let mean = Raster::filled(2, 1, 0.0);
        assert!(relative_height(&elevation, &mean)
            .data
            .iter()
            .all(|v| *v == 1.0));
    }
}
