//! Species, canopy layers and the ecosystem that assigns species to layers.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::curve::Curve;
use crate::error::{Error, Result};

pub mod selection;

pub type SpeciesId = String;

/// Accepted range for the sum of predominance weights in a layer.
pub const PREDOMINANCE_SUM_RANGE: (f32, f32) = (0.95, 1.05);

/// Canopy tier, evaluated from the tallest (L1) to the shortest (L3).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanopyLayer {
    L1,
    L2,
    L3,
}

impl CanopyLayer {
    /// All layers in evaluation order.
    pub const ALL: [CanopyLayer; 3] = [CanopyLayer::L1, CanopyLayer::L2, CanopyLayer::L3];

    /// Zero-based position in evaluation order.
    pub fn index(self) -> usize {
        match self {
            CanopyLayer::L1 => 0,
            CanopyLayer::L2 => 1,
            CanopyLayer::L3 => 2,
        }
    }

    /// Whether layers above this one may have suppressed it.
    pub fn has_upper_layers(self) -> bool {
        self != CanopyLayer::L1
    }

    pub fn next(self) -> Option<CanopyLayer> {
        match self {
            CanopyLayer::L1 => Some(CanopyLayer::L2),
            CanopyLayer::L2 => Some(CanopyLayer::L3),
            CanopyLayer::L3 => None,
        }
    }
}

impl fmt::Display for CanopyLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.index() + 1)
    }
}

/// A plant type with its adaptability curves and footprint.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct Species {
    pub id: SpeciesId,
    /// Relative selection weight within the layer.
    pub predominance: f32,
    #[cfg_attr(feature = "serde", serde(default = "default_height_curve"))]
    pub height_curve: Curve,
    #[cfg_attr(feature = "serde", serde(default = "default_slope_curve"))]
    pub slope_curve: Curve,
    #[cfg_attr(feature = "serde", serde(default = "default_moisture_curve"))]
    pub moisture_curve: Curve,
    /// Response to the upper-layer influence value.
    #[cfg_attr(feature = "serde", serde(default = "default_interaction_curve"))]
    pub interaction_curve: Curve,
    /// Collision radius in pixels.
    #[cfg_attr(feature = "serde", serde(default = "default_trunk_radius"))]
    pub trunk_radius: f32,
    /// Radius in pixels within which lower layers are suppressed.
    #[cfg_attr(feature = "serde", serde(default = "default_zone_of_influence"))]
    pub zone_of_influence: f32,
}

fn default_height_curve() -> Curve {
    Curve::DefaultHeight
}

fn default_slope_curve() -> Curve {
    Curve::DefaultSlope
}

fn default_moisture_curve() -> Curve {
    Curve::DefaultMoisture
}

fn default_interaction_curve() -> Curve {
    Curve::DefaultInteraction
}

fn default_trunk_radius() -> f32 {
    1.0
}

fn default_zone_of_influence() -> f32 {
    4.0
}

impl Species {
    /// Create a species with the built-in curves and default footprint.
    pub fn new(id: impl Into<SpeciesId>, predominance: f32) -> Self {
        Self {
            id: id.into(),
            predominance,
            height_curve: default_height_curve(),
            slope_curve: default_slope_curve(),
            moisture_curve: default_moisture_curve(),
            interaction_curve: default_interaction_curve(),
            trunk_radius: default_trunk_radius(),
            zone_of_influence: default_zone_of_influence(),
        }
    }

    /// Sets the height, slope and moisture curves.
    pub fn with_curves(mut self, height: Curve, slope: Curve, moisture: Curve) -> Self {
        self.height_curve = height;
        self.slope_curve = slope;
        self.moisture_curve = moisture;
        self
    }

    pub fn with_interaction_curve(mut self, curve: Curve) -> Self {
        self.interaction_curve = curve;
        self
    }

    pub fn with_trunk_radius(mut self, trunk_radius: f32) -> Self {
        self.trunk_radius = trunk_radius;
        self
    }

    pub fn with_zone_of_influence(mut self, zone_of_influence: f32) -> Self {
        self.zone_of_influence = zone_of_influence;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.predominance.is_finite() || self.predominance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "species '{}': predominance must be finite and >= 0",
                self.id
            )));
        }
        if !self.trunk_radius.is_finite() || self.trunk_radius < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "species '{}': trunk_radius must be finite and >= 0",
                self.id
            )));
        }
        if !self.zone_of_influence.is_finite() || self.zone_of_influence < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "species '{}': zone_of_influence must be finite and >= 0",
                self.id
            )));
        }
        for curve in [
            &self.height_curve,
            &self.slope_curve,
            &self.moisture_curve,
            &self.interaction_curve,
        ] {
            curve.validate().map_err(|e| {
                Error::InvalidCurve(format!("species '{}': {e}", self.id))
            })?;
        }
        Ok(())
    }
}

/// Outcome of checking a layer's predominance weights.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerValidation {
    pub layer: CanopyLayer,
    pub species_count: usize,
    pub predominance_sum: f32,
}

impl LayerValidation {
    /// Empty layers are trivially well formed; others need a sum within
    /// [`PREDOMINANCE_SUM_RANGE`].
    pub fn is_well_formed(&self) -> bool {
        let (lo, hi) = PREDOMINANCE_SUM_RANGE;
        self.species_count == 0 || (lo..=hi).contains(&self.predominance_sum)
    }
}

/// Species grouped by canopy layer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, Default)]
pub struct Ecosystem {
    pub l1: Vec<Species>,
    pub l2: Vec<Species>,
    pub l3: Vec<Species>,
}

impl Ecosystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a species to `layer`.
    pub fn with_species(mut self, layer: CanopyLayer, species: Species) -> Self {
        self.layer_mut(layer).push(species);
        self
    }

    pub fn layer(&self, layer: CanopyLayer) -> &[Species] {
        match layer {
            CanopyLayer::L1 => &self.l1,
            CanopyLayer::L2 => &self.l2,
            CanopyLayer::L3 => &self.l3,
        }
    }

    pub fn layer_mut(&mut self, layer: CanopyLayer) -> &mut Vec<Species> {
        match layer {
            CanopyLayer::L1 => &mut self.l1,
            CanopyLayer::L2 => &mut self.l2,
            CanopyLayer::L3 => &mut self.l3,
        }
    }

    pub fn species_count(&self) -> usize {
        self.l1.len() + self.l2.len() + self.l3.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species_count() == 0
    }

    /// Predominance check for one layer.
    pub fn validate_layer(&self, layer: CanopyLayer) -> LayerValidation {
        let species = self.layer(layer);
        LayerValidation {
            layer,
            species_count: species.len(),
            predominance_sum: species.iter().map(|s| s.predominance).sum(),
        }
    }

    /// Predominance checks for all layers. Ill-formed layers are logged as warnings.
    pub fn validate_layers(&self) -> [LayerValidation; 3] {
        CanopyLayer::ALL.map(|layer| {
            let validation = self.validate_layer(layer);
            if !validation.is_well_formed() {
                warn!(
                    "Layer {} predominance sums to {:.3}, outside [{}, {}].",
                    layer,
                    validation.predominance_sum,
                    PREDOMINANCE_SUM_RANGE.0,
                    PREDOMINANCE_SUM_RANGE.1
                );
            }
            validation
        })
    }

    /// Hard validation of every species' parameters and curve data.
    pub fn validate(&self) -> Result<()> {
        for layer in CanopyLayer::ALL {
            for species in self.layer(layer) {
                species.validate()?;
            }
        }
        Ok(())
    }

    /// Largest zone of influence among the layer's species, `0.0` for an empty layer.
    pub fn max_zone_of_influence(&self, layer: CanopyLayer) -> f32 {
        self.layer(layer)
            .iter()
            .map(|s| s.zone_of_influence)
            .fold(0.0, f32::max)
    }

    /// Largest trunk radius among the layer's species, `0.0` for an empty layer.
    pub fn max_trunk_radius(&self, layer: CanopyLayer) -> f32 {
        self.layer(layer)
            .iter()
            .map(|s| s.trunk_radius)
            .fold(0.0, f32::max)
    }
}
