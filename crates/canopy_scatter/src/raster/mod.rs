//! Raster storage shared by the map engine and the placement passes.
//!
//! This module groups the owned [`Raster`] buffer, the [`RasterSet`] pool that hands out
//! read-only rasters keyed by [`RasterId`], disc kernel taps shared by the neighbourhood
//! filters and the dilation, and the exact Euclidean distance transform used
//! by the exact-distance influence mode.
pub mod edt;
pub mod grid;
pub mod kernel;
pub mod set;

pub use grid::Raster;
pub use kernel::{disc_taps, Tap};
pub use set::{RasterId, RasterSet};
