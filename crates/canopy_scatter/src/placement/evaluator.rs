//! Acceptance probability of a single candidate position.
//!
//! [`evaluate`] multiplies a fixed chain of factors, each clamped to `[0, 1]`:
//!
//! 1. dryness `1 - water`
//! 2. for layers below L1: the species' interaction curve at the upper-layer influence,
//!    then `1 - influence`
//! 3. the height, slope and moisture curves at the position
//!
//! and stops as soon as the product reaches zero. A candidate is accepted when the product
//! is positive and at least the layer threshold.
use std::sync::Arc;

use glam::Vec2;

use crate::config::PlacementConfig;
use crate::curve::AdaptabilityCurve;
use crate::ecosystem::{CanopyLayer, Species};
use crate::error::{Pass, Result};
use crate::maps::saturate;
use crate::raster::{Raster, RasterId, RasterSet};

/// The terrain rasters read during evaluation, resolved once per run.
#[derive(Clone, Debug)]
pub struct TerrainView {
    pub elevation: Arc<Raster>,
    pub water: Arc<Raster>,
    pub slope: Arc<Raster>,
    pub moisture: Arc<Raster>,
}

impl TerrainView {
    /// Resolves the rasters from `set`. All must exist and match the elevation's size.
    pub fn from_set(set: &RasterSet) -> Result<Self> {
        let elevation = set.require(RasterId::Elevation, Pass::Placement)?;
        let size = elevation.size();
        Ok(Self {
            water: set.require_sized(RasterId::Water, Pass::Placement, size)?,
            slope: set.require_sized(RasterId::Slope, Pass::Placement, size)?,
            moisture: set.require_sized(RasterId::Moisture, Pass::Placement, size)?,
            elevation,
        })
    }

    /// Map size in pixels.
    pub fn size(&self) -> (usize, usize) {
        self.elevation.size()
    }
}

/// Per-layer evaluation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvaluationParams {
    pub threshold: f32,
    pub water_cutoff: Option<f32>,
}

impl EvaluationParams {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            water_cutoff: None,
        }
    }

    /// Threshold and water cutoff `config` applies to `layer`.
    pub fn for_layer(config: &PlacementConfig, layer: CanopyLayer) -> Self {
        Self {
            threshold: config.threshold_for(layer),
            water_cutoff: config.water_cutoff,
        }
    }
}

/// Outcome of evaluating one position for one species.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub accepted: bool,
    pub probability: f32,
}

impl Evaluation {
    const REJECTED: Evaluation = Evaluation {
        accepted: false,
        probability: 0.0,
    };
}

/// Evaluates `point` (map-pixel coordinates) for `species` in `layer`.
///
/// `influence` is read only for layers below L1; `None` there means no upper-layer
/// influence at all.
pub fn evaluate(
    point: Vec2,
    terrain: &TerrainView,
    species: &Species,
    layer: CanopyLayer,
    influence: Option<&Raster>,
    params: &EvaluationParams,
) -> Evaluation {
    let mut water = saturate(terrain.water.sample(point));
    if params.water_cutoff.is_some_and(|cutoff| water >= cutoff) {
        water = 1.0;
    }
    let mut p = 1.0 - water;
    if p <= 0.0 {
        return Evaluation::REJECTED;
    }

    if layer.has_upper_layers() {
        let d = influence.map_or(0.0, |raster| saturate(raster.sample(point)));
        p *= species.interaction_curve.evaluate(d);
        p *= 1.0 - d;
        if p <= 0.0 {
            return Evaluation::REJECTED;
        }
    }

    let factors = [
        (&species.height_curve, &terrain.elevation),
        (&species.slope_curve, &terrain.slope),
        (&species.moisture_curve, &terrain.moisture),
    ];
    for (curve, raster) in factors {
        p *= curve.evaluate(saturate(raster.sample(point)));
        if p <= 0.0 {
            return Evaluation::REJECTED;
        }
    }

    let probability = saturate(p);
    Evaluation {
        accepted: probability > 0.0 && probability >= params.threshold,
        probability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Curve;

    fn flat_terrain(water: f32) -> TerrainView {
        TerrainView {
            elevation: Arc::new(Raster::filled(8, 8, 0.5)),
            water: Arc::new(Raster::filled(8, 8, water)),
            slope: Arc::new(Raster::new(8, 8)),
            moisture: Arc::new(Raster::filled(8, 8, 0.6)),
        }
    }

    fn permissive(id: &str) -> Species {
        Species::new(id, 1.0)
            .with_curves(
                Curve::Constant(1.0),
                Curve::Constant(1.0),
                Curve::Constant(1.0),
            )
            .with_interaction_curve(Curve::Constant(1.0))
    }

    #[test]
    fn standing_water_gives_zero_probability() {
        let eval = evaluate(
            Vec2::new(3.0, 3.0),
            &flat_terrain(1.0),
            &permissive("oak"),
            CanopyLayer::L1,
            None,
            &EvaluationParams::new(0.0),
        );
        assert_eq!(eval.probability, 0.0);
        assert!(!eval.accepted);
    }

    #[test]
    fn water_cutoff_makes_water_binary() {
        let params = EvaluationParams {
            threshold: 0.1,
            water_cutoff: Some(0.5),
        };
        let wet = evaluate(
            Vec2::ZERO,
            &flat_terrain(0.6),
            &permissive("oak"),
            CanopyLayer::L1,
            None,
            &params,
        );
        assert_eq!(wet.probability, 0.0);

        let damp = evaluate(
            Vec2::ZERO,
            &flat_terrain(0.4),
            &permissive("oak"),
            CanopyLayer::L1,
            None,
            &params,
        );
        assert!((damp.probability - 0.6).abs() < 1e-6);
        assert!(damp.accepted);
    }

    #[test]
    fn probability_is_the_product_of_factors() {
        let species = permissive("birch").with_curves(
            Curve::Constant(0.5),
            Curve::Constant(0.8),
            Curve::Constant(0.5),
        );
        let eval = evaluate(
            Vec2::new(1.0, 1.0),
            &flat_terrain(0.0),
            &species,
            CanopyLayer::L1,
            None,
            &EvaluationParams::new(0.2),
        );
        assert!((eval.probability - 0.2).abs() < 1e-6);
        assert!(eval.accepted);
    }

    #[test]
    fn threshold_is_inclusive_and_zero_never_accepts() {
        let eval = evaluate(
            Vec2::ZERO,
            &flat_terrain(0.0),
            &permissive("oak"),
            CanopyLayer::L1,
            None,
            &EvaluationParams::new(1.0),
        );
        assert!(eval.accepted);

        let species = permissive("oak").with_curves(
            Curve::Constant(0.0),
            Curve::Constant(1.0),
            Curve::Constant(1.0),
        );
        let eval = evaluate(
            Vec2::ZERO,
            &flat_terrain(0.0),
            &species,
            CanopyLayer::L1,
            None,
            &EvaluationParams::new(0.0),
        );
        assert!(!eval.accepted);
    }

    #[test]
    fn full_influence_suppresses_lower_layers() {
        let mut influence = Raster::new(8, 8);
        influence.set(4, 4, 1.0);
        let shade_intolerant =
            permissive("fern").with_interaction_curve(Curve::DefaultInteraction);
        let params = EvaluationParams::new(0.1);

        let under = evaluate(
            Vec2::new(4.5, 4.5),
            &flat_terrain(0.0),
            &shade_intolerant,
            CanopyLayer::L2,
            Some(&influence),
            &params,
        );
        assert!(!under.accepted);
        assert_eq!(under.probability, 0.0);

        let open = evaluate(
            Vec2::new(1.5, 1.5),
            &flat_terrain(0.0),
            &shade_intolerant,
            CanopyLayer::L2,
            Some(&influence),
            &params,
        );
        assert!(open.accepted);
    }

    #[test]
    fn top_layer_ignores_influence() {
        let influence = Raster::filled(8, 8, 1.0);
        let eval = evaluate(
            Vec2::new(2.0, 2.0),
            &flat_terrain(0.0),
            &permissive("oak"),
            CanopyLayer::L1,
            Some(&influence),
            &EvaluationParams::new(0.5),
        );
        assert!(eval.accepted);
    }

    #[test]
    fn partial_influence_scales_probability() {
        let influence = Raster::filled(8, 8, 0.5);
        let species = permissive("fern").with_interaction_curve(Curve::DefaultInteraction);
        let eval = evaluate(
            Vec2::new(2.0, 2.0),
            &flat_terrain(0.0),
            &species,
            CanopyLayer::L3,
            Some(&influence),
            &EvaluationParams::new(0.0),
        );
        assert!((eval.probability - 0.25).abs() < 1e-6);
    }

    #[test]
    fn out_of_bounds_points_are_clamped() {
        let eval = evaluate(
            Vec2::new(-5.0, 100.0),
            &flat_terrain(0.0),
            &permissive("oak"),
            CanopyLayer::L1,
            None,
            &EvaluationParams::new(0.5),
        );
        assert!(eval.accepted);
    }

    #[test]
    fn terrain_view_requires_derived_maps() {
        let set = RasterSet::from_inputs(Raster::new(4, 4), Raster::new(4, 4));
        let err = TerrainView::from_set(&set).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::MissingRaster {
                pass: Pass::Placement,
                id: RasterId::Slope
            }
        ));
    }
}
