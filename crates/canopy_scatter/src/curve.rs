//! Adaptability curves: response functions from a normalized environmental signal to an
//! acceptance multiplier.
//!
//! [`Curve`] covers the built-in responses, constants and data-driven piecewise-linear
//! curves. Anything else can implement [`AdaptabilityCurve`] and be wrapped in
//! [`Curve::Custom`]. Every evaluation is clamped to `[0, 1]`; NaN inputs and outputs map
//! to `0.0`.
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maps a normalized input in `[0, 1]` to a multiplier in `[0, 1]`.
pub trait AdaptabilityCurve: Send + Sync {
    fn evaluate(&self, x: f32) -> f32;
}

const HEIGHT_MIN: f32 = 0.15;
const HEIGHT_MAX: f32 = 0.85;
const SLOPE_MAX: f32 = 0.6;
const MOISTURE_MIN: f32 = 0.05;
const MOISTURE_MAX: f32 = 0.98;
const MOISTURE_FALLOFF_EXP: i32 = 2;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone)]
pub enum Curve {
    /// Favors mid elevations; zero below 0.15 and above 0.85.
    DefaultHeight,
    /// Linear preference for flat terrain; zero above 0.6.
    DefaultSlope,
    /// Power falloff toward dry ground; zero below 0.05 and above 0.98.
    DefaultMoisture,
    /// `1 - x`: denser upper canopy, lower acceptance.
    DefaultInteraction,
    Constant(f32),
    /// Control points `(x, y)` sorted by `x`; linear in between, flat beyond the ends.
    PiecewiseLinear(Vec<(f32, f32)>),
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(Arc<dyn AdaptabilityCurve>),
}

impl Curve {
    /// Piecewise-linear curve from control points, validated.
    pub fn piecewise(points: Vec<(f32, f32)>) -> Result<Self> {
        let curve = Curve::PiecewiseLinear(points);
        curve.validate()?;
        Ok(curve)
    }

    /// Piecewise-linear curve from values sampled uniformly over `[0, 1]`.
    pub fn sampled(values: &[f32]) -> Result<Self> {
        match values.len() {
            0 => Err(Error::InvalidCurve("sampled curve needs values".into())),
            1 => Ok(Curve::Constant(values[0])),
            n => {
                let step = 1.0 / (n - 1) as f32;
                Self::piecewise(
                    values
                        .iter()
                        .enumerate()
                        .map(|(i, v)| (i as f32 * step, *v))
                        .collect(),
                )
            }
        }
    }

    pub fn custom<C: AdaptabilityCurve + 'static>(curve: C) -> Self {
        Curve::Custom(Arc::new(curve))
    }

    /// Checks that piecewise control points are non-empty, finite and sorted by `x`.
    pub fn validate(&self) -> Result<()> {
        match self {
            Curve::Constant(v) if !v.is_finite() => {
                Err(Error::InvalidCurve(format!("constant {v} is not finite")))
            }
            Curve::PiecewiseLinear(points) => {
                if points.is_empty() {
                    return Err(Error::InvalidCurve(
                        "piecewise curve has no control points".into(),
                    ));
                }
                if points
                    .iter()
                    .any(|(x, y)| !x.is_finite() || !y.is_finite())
                {
                    return Err(Error::InvalidCurve(
                        "piecewise curve has non-finite control points".into(),
                    ));
                }
                if points.windows(2).any(|w| w[1].0 < w[0].0) {
                    return Err(Error::InvalidCurve(
                        "piecewise control points must be sorted by x".into(),
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn raw(&self, x: f32) -> f32 {
        match self {
            Curve::DefaultHeight => {
                if !(HEIGHT_MIN..=HEIGHT_MAX).contains(&x) {
                    return 0.0;
                }
                let half_span = (HEIGHT_MAX - HEIGHT_MIN) * 0.5;
                let t = (x - 0.5) / half_span;
                1.0 - t * t
            }
            Curve::DefaultSlope => {
                if x > SLOPE_MAX {
                    0.0
                } else {
                    1.0 - x / SLOPE_MAX
                }
            }
            Curve::DefaultMoisture => {
                if !(MOISTURE_MIN..=MOISTURE_MAX).contains(&x) {
                    return 0.0;
                }
                1.0 - (1.0 - x).powi(MOISTURE_FALLOFF_EXP)
            }
            Curve::DefaultInteraction => 1.0 - x,
            Curve::Constant(v) => *v,
            Curve::PiecewiseLinear(points) => piecewise_linear(points, x),
            Curve::Custom(curve) => curve.evaluate(x),
        }
    }
}

impl AdaptabilityCurve for Curve {
    fn evaluate(&self, x: f32) -> f32 {
        if x.is_nan() {
            return 0.0;
        }
        let y = self.raw(x);
        if y.is_nan() {
            0.0
        } else {
            y.clamp(0.0, 1.0)
        }
    }
}

impl fmt::Debug for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Curve::DefaultHeight => f.write_str("DefaultHeight"),
            Curve::DefaultSlope => f.write_str("DefaultSlope"),
            Curve::DefaultMoisture => f.write_str("DefaultMoisture"),
            Curve::DefaultInteraction => f.write_str("DefaultInteraction"),
            Curve::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Curve::PiecewiseLinear(points) => {
                f.debug_tuple("PiecewiseLinear").field(points).finish()
            }
            Curve::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn piecewise_linear(points: &[(f32, f32)], x: f32) -> f32 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    if x <= first.0 {
        return first.1;
    }
    if x >= last.0 {
        return last.1;
    }
    let upper = points.partition_point(|(px, _)| *px <= x);
    let (x0, y0) = points[upper - 1];
    let (x1, y1) = points[upper];
    if x1 <= x0 {
        return y1;
    }
    let t = (x - x0) / (x1 - x0);
    y0 + (y1 - y0) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_height_rejects_extremes_and_peaks_mid() {
        let c = Curve::DefaultHeight;
        assert_eq!(c.evaluate(0.1), 0.0);
        assert_eq!(c.evaluate(0.9), 0.0);
        assert_eq!(c.evaluate(0.5), 1.0);
        assert!(c.evaluate(0.3) < c.evaluate(0.45));
        assert!(c.evaluate(0.7) < c.evaluate(0.55));
    }

    #[test]
    fn default_slope_prefers_flat_terrain() {
        let c = Curve::DefaultSlope;
        assert_eq!(c.evaluate(0.0), 1.0);
        assert!((c.evaluate(0.3) - 0.5).abs() < 1e-6);
        assert_eq!(c.evaluate(0.61), 0.0);
        assert_eq!(c.evaluate(1.0), 0.0);
    }

    #[test]
    fn default_moisture_favors_wet_ground() {
        let c = Curve::DefaultMoisture;
        assert_eq!(c.evaluate(0.01), 0.0);
        assert_eq!(c.evaluate(0.99), 0.0);
        assert!(c.evaluate(0.9) > c.evaluate(0.5));
        assert!(c.evaluate(0.5) > c.evaluate(0.1));
        assert!((c.evaluate(0.5) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn interaction_falls_with_density() {
        let c = Curve::DefaultInteraction;
        assert_eq!(c.evaluate(0.0), 1.0);
        assert_eq!(c.evaluate(1.0), 0.0);
    }

    #[test]
    fn outputs_are_clamped_and_nan_safe() {
        assert_eq!(Curve::Constant(3.0).evaluate(0.5), 1.0);
        assert_eq!(Curve::Constant(-1.0).evaluate(0.5), 0.0);
        assert_eq!(Curve::DefaultSlope.evaluate(f32::NAN), 0.0);
    }

    #[test]
    fn piecewise_interpolates_and_holds_ends() {
        let c = Curve::piecewise(vec![(0.2, 0.0), (0.6, 1.0), (1.0, 0.5)]).unwrap();
        assert_eq!(c.evaluate(0.0), 0.0);
        assert!((c.evaluate(0.4) - 0.5).abs() < 1e-6);
        assert!((c.evaluate(0.8) - 0.75).abs() < 1e-6);
        assert_eq!(c.evaluate(2.0), 0.5);
    }

    #[test]
    fn piecewise_validation() {
        assert!(Curve::piecewise(vec![]).is_err());
        assert!(Curve::piecewise(vec![(0.5, 1.0), (0.1, 0.0)]).is_err());
        assert!(Curve::piecewise(vec![(0.0, f32::NAN)]).is_err());
    }

    #[test]
    fn sampled_curve_spreads_values_over_unit_range() {
        let c = Curve::sampled(&[0.0, 1.0, 0.0]).unwrap();
        assert_eq!(c.evaluate(0.5), 1.0);
        assert!((c.evaluate(0.25) - 0.5).abs() < 1e-6);
        assert!(Curve::sampled(&[]).is_err());
        assert!(matches!(Curve::sampled(&[0.4]).unwrap(), Curve::Constant(_)));
    }

    struct Step;

    impl AdaptabilityCurve for Step {
        fn evaluate(&self, x: f32) -> f32 {
            if x < 0.5 {
                0.0
            } else {
                1.0
            }
        }
    }

    #[test]
    fn custom_curves_are_wrapped() {
        let c = Curve::custom(Step);
        assert_eq!(c.evaluate(0.2), 0.0);
        assert_eq!(c.evaluate(0.7), 1.0);
        assert_eq!(format!("{c:?}"), "Custom(..)");
    }
}
