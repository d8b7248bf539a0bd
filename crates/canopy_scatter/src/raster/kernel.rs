//! Disc-shaped neighbourhoods for raster filters.
use crate::raster::Raster;

/// One kernel offset and its Euclidean distance from the centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tap {
    pub dx: isize,
    pub dy: isize,
    pub distance: f32,
}

/// Every integer offset within Euclidean `radius` of the origin (inclusive), origin first.
pub fn disc_taps(radius: f32) -> Vec<Tap> {
    if !radius.is_finite() || radius < 0.0 {
        return Vec::new();
    }
    let reach = radius.floor() as isize;
    let r2 = radius * radius;
    let mut taps = vec![Tap {
        dx: 0,
        dy: 0,
        distance: 0.0,
    }];
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            if dx == 0 && dy == 0 {
                continue;
            }
            let d2 = (dx * dx + dy * dy) as f32;
            if d2 <= r2 {
                taps.push(Tap {
                    dx,
                    dy,
                    distance: d2.sqrt(),
                });
            }
        }
    }
    taps
}

impl Tap {
    /// Neighbour coordinates of `(x, y)` if they fall inside `raster`.
    #[inline]
    pub fn offset_in(&self, raster: &Raster, x: usize, y: usize) -> Option<(usize, usize)> {
        let nx = x as isize + self.dx;
        let ny = y as isize + self.dy;
        if nx < 0 || ny < 0 || nx >= raster.width as isize || ny >= raster.height as isize {
            return None;
        }
        Some((nx as usize, ny as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_zero_is_centre_only() {
        assert_eq!(disc_taps(0.0).len(), 1);
    }

    #[test]
    fn radius_one_is_a_cross() {
        let taps = disc_taps(1.0);
        assert_eq!(taps.len(), 5);
        assert!(taps.iter().all(|t| t.distance <= 1.0));
    }

    #[test]
    fn radius_five_includes_boundary_points() {
        let taps = disc_taps(5.0);
        assert!(taps.iter().any(|t| t.dx == 3 && t.dy == 4));
        assert!(taps.iter().any(|t| t.dx == -5 && t.dy == 0));
        assert!(!taps.iter().any(|t| t.dx == 4 && t.dy == 4));
    }

    #[test]
    fn offsets_outside_raster_are_skipped() {
        let raster = Raster::new(3, 3);
        let tap = Tap {
            dx: -1,
            dy: 0,
            distance: 1.0,
        };
        assert_eq!(tap.offset_in(&raster, 0, 0), None);
        assert_eq!(tap.offset_in(&raster, 2, 1), Some((1, 1)));
    }

    #[test]
    fn invalid_radius_yields_no_taps() {
        assert!(disc_taps(-1.0).is_empty());
        assert!(disc_taps(f32::NAN).is_empty());
    }
}
