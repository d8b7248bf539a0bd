//! Parameter structs for the map engine, the sampler and the placement passes.
//!
//! Every struct has a [`Default`] matching the documented defaults, `with_*` builder
//! methods, and a `validate()` that returns [`Error::InvalidConfig`] for values the passes
//! cannot work with. With the `serde` feature enabled all of them (de)serialize, missing
//! fields falling back to their defaults.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ecosystem::CanopyLayer;
use crate::error::{Error, Result};

/// Parameters of the derived-map passes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct MapParams {
    /// Factor applied to normalized elevation differences when computing slope.
    pub height_scale: f32,
    /// Offset in pixels of the central-difference slope samples.
    pub slope_distance: usize,
    /// Radius in pixels of the mean-height disc kernel.
    pub mean_height_radius: usize,
    /// Radius in pixels of the water-spread kernel.
    pub water_spread_radius: usize,
    /// Steepness of the water-spread falloff.
    pub water_spread_factor: f32,
    pub weight_height: f32,
    pub weight_slope: f32,
    pub weight_relative_height: f32,
    /// Extra contribution of depressions to moisture.
    pub omega: f32,
}

impl Default for MapParams {
    fn default() -> Self {
        Self {
            height_scale: 8.0,
            slope_distance: 1,
            mean_height_radius: 16,
            water_spread_radius: 12,
            water_spread_factor: 0.5,
            weight_height: 0.3,
            weight_slope: 0.3,
            weight_relative_height: 0.4,
            omega: 0.2,
        }
    }
}

impl MapParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_height_scale(mut self, height_scale: f32) -> Self {
        self.height_scale = height_scale;
        self
    }

    pub fn with_slope_distance(mut self, slope_distance: usize) -> Self {
        self.slope_distance = slope_distance;
        self
    }

    pub fn with_mean_height_radius(mut self, radius: usize) -> Self {
        self.mean_height_radius = radius;
        self
    }

    pub fn with_water_spread(mut self, radius: usize, factor: f32) -> Self {
        self.water_spread_radius = radius;
        self.water_spread_factor = factor;
        self
    }

    /// Sets the moisture weighting coefficients.
    pub fn with_moisture_weights(
        mut self,
        weight_height: f32,
        weight_slope: f32,
        weight_relative_height: f32,
        omega: f32,
    ) -> Self {
        self.weight_height = weight_height;
        self.weight_slope = weight_slope;
        self.weight_relative_height = weight_relative_height;
        self.omega = omega;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.height_scale.is_finite() || self.height_scale < 0.0 {
            return Err(Error::InvalidConfig(
                "height_scale must be finite and >= 0".into(),
            ));
        }
        if self.slope_distance == 0 {
            return Err(Error::InvalidConfig("slope_distance must be >= 1".into()));
        }
        if !self.water_spread_factor.is_finite() || self.water_spread_factor < 0.0 {
            return Err(Error::InvalidConfig(
                "water_spread_factor must be finite and >= 0".into(),
            ));
        }
        let weights = [
            self.weight_height,
            self.weight_slope,
            self.weight_relative_height,
            self.omega,
        ];
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::InvalidConfig(
                "moisture weights must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// Parameters for deriving a water mask from elevation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct WaterMaskParams {
    /// Normalized elevation below which a pixel is water.
    pub threshold: f32,
    /// Gaussian sigma in pixels; `None` keeps the hard mask.
    pub smoothing_sigma: Option<f32>,
}

impl Default for WaterMaskParams {
    fn default() -> Self {
        Self {
            threshold: 40.0 / 255.0,
            smoothing_sigma: None,
        }
    }
}

impl WaterMaskParams {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            smoothing_sigma: None,
        }
    }

    /// Threshold given as an 8-bit pixel value (0-255).
    pub fn from_pixel_threshold(threshold: u8) -> Self {
        Self::new(threshold as f32 / 255.0)
    }

    pub fn with_smoothing(mut self, sigma: f32) -> Self {
        self.smoothing_sigma = Some(sigma);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(Error::InvalidConfig("water threshold must be finite".into()));
        }
        if let Some(sigma) = self.smoothing_sigma {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(Error::InvalidConfig(
                    "smoothing_sigma must be finite and >= 0".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Parameters of the blue-noise candidate tile.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct SamplerParams {
    /// Side length of the square candidate tile in pixels.
    pub tile_size: f32,
    /// Minimum distance between candidates in pixels.
    pub min_distance: f32,
    /// Candidates tried around an active point before it is retired.
    pub attempts: usize,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            tile_size: 64.0,
            min_distance: 4.0,
            attempts: 30,
        }
    }
}

impl SamplerParams {
    pub fn new(tile_size: f32, min_distance: f32) -> Self {
        Self {
            tile_size,
            min_distance,
            ..Default::default()
        }
    }

    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tile_size.is_finite() || self.tile_size < 1.0 {
            return Err(Error::InvalidConfig(
                "tile_size must be finite and >= 1".into(),
            ));
        }
        if !self.min_distance.is_finite() || self.min_distance <= 0.0 {
            return Err(Error::InvalidConfig(
                "min_distance must be finite and > 0".into(),
            ));
        }
        if self.attempts == 0 {
            return Err(Error::InvalidConfig("attempts must be >= 1".into()));
        }
        Ok(())
    }
}

/// How a layer's occupancy is turned into suppression for the layers below it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InfluenceMode {
    /// Binary dilation by the layer's largest zone of influence.
    #[default]
    Dilate,
    /// Smooth falloff from the exact distance to the nearest occupied pixel.
    ExactDistance,
}

/// How often a species is drawn from the layer's predominance weights.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionGranularity {
    /// One species per tile and layer.
    #[default]
    PerTile,
    /// One species per candidate point.
    PerPoint,
}

/// Configuration of the layered placement run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementConfig {
    /// Base acceptance probability threshold.
    pub threshold: f32,
    /// Threshold bias added per layer, indexed L1, L2, L3.
    pub layer_bias: [f32; 3],
    pub influence_mode: InfluenceMode,
    pub selection_granularity: SelectionGranularity,
    /// When set, water values at or above the cutoff count as fully wet.
    pub water_cutoff: Option<f32>,
    pub sampler: SamplerParams,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            layer_bias: [0.3, 0.1, 0.0],
            influence_mode: InfluenceMode::default(),
            selection_granularity: SelectionGranularity::default(),
            water_cutoff: None,
            sampler: SamplerParams::default(),
        }
    }
}

impl PlacementConfig {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }

    pub fn with_layer_bias(mut self, layer_bias: [f32; 3]) -> Self {
        self.layer_bias = layer_bias;
        self
    }

    pub fn with_influence_mode(mut self, mode: InfluenceMode) -> Self {
        self.influence_mode = mode;
        self
    }

    pub fn with_selection_granularity(mut self, granularity: SelectionGranularity) -> Self {
        self.selection_granularity = granularity;
        self
    }

    pub fn with_water_cutoff(mut self, cutoff: f32) -> Self {
        self.water_cutoff = Some(cutoff);
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerParams) -> Self {
        self.sampler = sampler;
        self
    }

    /// Acceptance threshold for `layer`: base threshold plus that layer's bias.
    pub fn threshold_for(&self, layer: CanopyLayer) -> f32 {
        self.threshold + self.layer_bias[layer.index()]
    }

    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(Error::InvalidConfig("threshold must be finite".into()));
        }
        if self.layer_bias.iter().any(|b| !b.is_finite()) {
            return Err(Error::InvalidConfig("layer_bias must be finite".into()));
        }
        if let Some(cutoff) = self.water_cutoff {
            if !cutoff.is_finite() {
                return Err(Error::InvalidConfig("water_cutoff must be finite".into()));
            }
        }
        self.sampler.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        MapParams::default().validate().unwrap();
        WaterMaskParams::default().validate().unwrap();
        SamplerParams::default().validate().unwrap();
        PlacementConfig::default().validate().unwrap();
    }

    #[test]
    fn threshold_schedule_is_top_down() {
        let config = PlacementConfig::new(0.1);
        assert!((config.threshold_for(CanopyLayer::L1) - 0.4).abs() < 1e-6);
        assert!((config.threshold_for(CanopyLayer::L2) - 0.2).abs() < 1e-6);
        assert!((config.threshold_for(CanopyLayer::L3) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(MapParams::new().with_slope_distance(0).validate().is_err());
        assert!(MapParams::new()
            .with_height_scale(f32::NAN)
            .validate()
            .is_err());
        assert!(SamplerParams::new(64.0, 0.0).validate().is_err());
        assert!(SamplerParams::new(0.5, 1.0).validate().is_err());
        assert!(WaterMaskParams::new(0.2)
            .with_smoothing(-1.0)
            .validate()
            .is_err());
        assert!(PlacementConfig::new(f32::INFINITY).validate().is_err());
    }

    #[test]
    fn pixel_threshold_normalizes() {
        let params = WaterMaskParams::from_pixel_threshold(255);
        assert_eq!(params.threshold, 1.0);
        assert_eq!(WaterMaskParams::default().threshold, 40.0 / 255.0);
    }
}
