//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration, empty or malformed raster inputs, missing rasters and invalid curve
//! data.
//! Every raster-related variant names the [`Pass`] that failed so diagnostics point at the
//! stage of the pipeline that could not run.
use std::fmt;

use thiserror::Error;

use crate::raster::RasterId;

pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage reported in error diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pass {
    WaterMask,
    Slope,
    MeanHeight,
    RelativeHeight,
    WaterSpread,
    Moisture,
    Placement,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::WaterMask => f.write_str("water-mask"),
            Pass::Slope => f.write_str("slope"),
            Pass::MeanHeight => f.write_str("mean-height"),
            Pass::RelativeHeight => f.write_str("relative-height"),
            Pass::WaterSpread => f.write_str("water-spread"),
            Pass::Moisture => f.write_str("moisture"),
            Pass::Placement => f.write_str("placement"),
        }
    }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{pass} pass: raster dimensions {found:?} do not match expected {expected:?}")]
    DimensionMismatch {
        pass: Pass,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("{pass} pass: input raster {width}x{height} holds {len} values")]
    InvalidRaster {
        pass: Pass,
        width: usize,
        height: usize,
        len: usize,
    },

    #[error("{pass} pass: required raster '{id}' is missing")]
    MissingRaster { pass: Pass, id: RasterId },

    #[error("invalid curve: {0}")]
    InvalidCurve(String),

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_allocates_owned_message() {
        let err: Error = "issue".into();
        assert!(matches!(err, Error::Other(ref msg) if msg == "issue"));
    }

    #[test]
    fn missing_raster_names_pass_and_raster() {
        let err = Error::MissingRaster {
            pass: Pass::Placement,
            id: RasterId::Moisture,
        };
        assert_eq!(
            err.to_string(),
            "placement pass: required raster 'moisture' is missing"
        );
    }

    #[test]
    fn invalid_raster_names_the_pass() {
        let err = Error::InvalidRaster {
            pass: Pass::WaterMask,
            width: 0,
            height: 0,
            len: 0,
        };
        assert_eq!(
            err.to_string(),
            "water-mask pass: input raster 0x0 holds 0 values"
        );
    }

    #[test]
    fn dimension_mismatch_reports_both_sizes() {
        let err = Error::DimensionMismatch {
            pass: Pass::Slope,
            expected: (4, 4),
            found: (2, 3),
        };
        assert_eq!(
            err.to_string(),
            "slope pass: raster dimensions (2, 3) do not match expected (4, 4)"
        );
    }
}
