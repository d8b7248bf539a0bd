//! Raster map engine: derives terrain descriptor maps from elevation and water.
//!
//! The passes run in dependency order. Slope and mean height only read elevation and run
//! side by side; relative height needs the mean height; water spread needs the relative
//! height; moisture reads everything. Each pass fills a fresh raster row-parallel and
//! returns it complete, so a failed run never publishes a partially written map.
//!
//! ```text
//! elevation ─┬─ slope ───────────────────────────────┐
//!            └─ mean height ─ relative height ─┬─────┤
//! water ─────────────────────── water spread ──┴─ moisture
//! ```
use std::time::Instant;

use tracing::{debug, info};

use crate::config::MapParams;
use crate::error::{Error, Pass, Result};
use crate::raster::{Raster, RasterId, RasterSet};

pub mod height;
pub mod moisture;
pub mod slope;
pub mod water;

/// The five derived rasters, all with the elevation's dimensions.
#[derive(Clone, Debug)]
pub struct DerivedMaps {
    pub slope: Raster,
    pub mean_height: Raster,
    pub relative_height: Raster,
    pub water_spread: Raster,
    pub moisture: Raster,
}

impl DerivedMaps {
    /// Moves the derived rasters into `set` under their identities.
    pub fn insert_into(self, set: &mut RasterSet) {
        set.insert(RasterId::Slope, self.slope);
        set.insert(RasterId::MeanHeight, self.mean_height);
        set.insert(RasterId::RelativeHeight, self.relative_height);
        set.insert(RasterId::WaterSpread, self.water_spread);
        set.insert(RasterId::Moisture, self.moisture);
    }
}

/// Runs the derived-map passes with a fixed parameter set.
#[derive(Clone, Debug)]
pub struct MapEngine {
    params: MapParams,
}

impl MapEngine {
    pub fn new(params: MapParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &MapParams {
        &self.params
    }

    /// Computes every derived map from `elevation` and `water`.
    pub fn generate(&self, elevation: &Raster, water: &Raster) -> Result<DerivedMaps> {
        let start = Instant::now();
        check_input(elevation, Pass::Slope, elevation.size())?;
        check_input(water, Pass::WaterSpread, elevation.size())?;

        let (slope, mean_height) = rayon::join(
            || timed(Pass::Slope, || slope::slope(elevation, &self.params)),
            || {
                timed(Pass::MeanHeight, || {
                    height::mean_height(elevation, self.params.mean_height_radius)
                })
            },
        );
        let relative_height = timed(Pass::RelativeHeight, || {
            height::relative_height(elevation, &mean_height)
        });
        let water_spread = timed(Pass::WaterSpread, || {
            water::water_spread(water, &relative_height, &self.params)
        });
        let moisture = timed(Pass::Moisture, || {
            moisture::moisture(
                elevation,
                &slope,
                &relative_height,
                &water_spread,
                &self.params,
            )
        });

        info!(
            "Derived maps for {}x{} terrain in {:?}.",
            elevation.width,
            elevation.height,
            start.elapsed()
        );

        Ok(DerivedMaps {
            slope,
            mean_height,
            relative_height,
            water_spread,
            moisture,
        })
    }

    /// Reads elevation and water from `set`, then stores the derived maps back into it.
    pub fn generate_into(&self, set: &mut RasterSet) -> Result<()> {
        let elevation = set.require(RasterId::Elevation, Pass::Slope)?;
        let water = set.require(RasterId::Water, Pass::WaterSpread)?;
        let maps = self.generate(&elevation, &water)?;
        maps.insert_into(set);
        Ok(())
    }
}

/// Fails when `raster` is empty, inconsistent, or not `expected` in size.
pub(crate) fn check_input(raster: &Raster, pass: Pass, expected: (usize, usize)) -> Result<()> {
    check_raster(raster, pass)?;
    if raster.size() != expected {
        return Err(Error::DimensionMismatch {
            pass,
            expected,
            found: raster.size(),
        });
    }
    Ok(())
}

/// Fails with [`Error::InvalidRaster`] when `raster` is empty or its data length disagrees
/// with its dimensions.
pub(crate) fn check_raster(raster: &Raster, pass: Pass) -> Result<()> {
    if raster.is_empty() || raster.data.len() != raster.width * raster.height {
        return Err(Error::InvalidRaster {
            pass,
            width: raster.width,
            height: raster.height,
            len: raster.data.len(),
        });
    }
    Ok(())
}

/// Clamp into `[0, 1]`, mapping NaN to `0.0`.
#[inline]
pub(crate) fn saturate(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

fn timed<T>(pass: Pass, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    debug!("Pass {} finished in {:?}.", pass, start.elapsed());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> MapEngine {
        MapEngine::new(
            MapParams::new()
                .with_mean_height_radius(3)
                .with_water_spread(3, 0.5),
        )
        .unwrap()
    }

    fn ridge(w: usize, h: usize) -> Raster {
        Raster::from_fn(w, h, |x, _| {
            let t = x as f32 / (w - 1) as f32;
            1.0 - (2.0 * t - 1.0).abs()
        })
    }

    fn assert_unit_range(raster: &Raster, name: &str) {
        assert!(
            raster.data.iter().all(|v| (0.0..=1.0).contains(v)),
            "{name} left [0, 1]"
        );
    }

    #[test]
    fn derived_maps_stay_in_unit_range() {
        let engine = engine();
        for elevation in [
            Raster::filled(12, 9, 0.0),
            Raster::filled(12, 9, 1.0),
            ridge(12, 9),
            Raster::from_fn(12, 9, |x, y| if (x + y) % 2 == 0 { 1.0 } else { 0.0 }),
        ] {
            let water = Raster::from_fn(12, 9, |x, _| if x < 2 { 1.0 } else { 0.0 });
            let maps = engine.generate(&elevation, &water).unwrap();
            assert_unit_range(&maps.slope, "slope");
            assert_unit_range(&maps.mean_height, "mean height");
            assert_unit_range(&maps.relative_height, "relative height");
            assert_unit_range(&maps.water_spread, "water spread");
            assert_unit_range(&maps.moisture, "moisture");
            assert_eq!(maps.moisture.size(), (12, 9));
        }
    }

    #[test]
    fn mismatched_water_is_fatal() {
        let err = engine()
            .generate(&Raster::new(4, 4), &Raster::new(4, 5))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                pass: Pass::WaterSpread,
                expected: (4, 4),
                found: (4, 5)
            }
        ));
    }

    #[test]
    fn empty_elevation_is_fatal() {
        let err = engine()
            .generate(&Raster::new(0, 0), &Raster::new(0, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRaster {
                pass: Pass::Slope,
                ..
            }
        ));
    }

    #[test]
    fn malformed_water_names_its_pass() {
        let water = Raster {
            width: 4,
            height: 4,
            data: vec![0.0; 3],
        };
        let err = engine().generate(&Raster::new(4, 4), &water).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRaster {
                pass: Pass::WaterSpread,
                len: 3,
                ..
            }
        ));
    }

    #[test]
    fn generate_into_requires_inputs() {
        let mut set = RasterSet::new();
        set.insert(RasterId::Elevation, Raster::new(4, 4));
        let err = engine().generate_into(&mut set).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRaster {
                id: RasterId::Water,
                ..
            }
        ));

        set.insert(RasterId::Water, Raster::new(4, 4));
        engine().generate_into(&mut set).unwrap();
        for id in [
            RasterId::Slope,
            RasterId::MeanHeight,
            RasterId::RelativeHeight,
            RasterId::WaterSpread,
            RasterId::Moisture,
        ] {
            assert!(set.contains(id), "missing {id}");
        }
    }

    #[test]
    fn invalid_params_are_rejected() {
        assert!(MapEngine::new(MapParams::new().with_slope_distance(0)).is_err());
    }
}
