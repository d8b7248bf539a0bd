#![forbid(unsafe_code)]
//! canopy_scatter: layered vegetation placement on heightfields.
//!
//! Modules:
//! - raster: owned scalar rasters, raster sets keyed by identity, distance transform
//! - maps: derived terrain maps (slope, mean/relative height, water spread, moisture)
//! - sampling: blue-noise candidate generation (Poisson disk)
//! - curve: adaptability curves mapping environmental signals to multipliers
//! - ecosystem: species, canopy layers, predominance validation and selection
//! - placement: position evaluation, influence fields, the layer orchestrator, events
//!
//! For a runnable walkthrough see the `canopy_scatter_examples` crate.
pub mod config;
pub mod curve;
pub mod ecosystem;
pub mod error;
pub mod maps;
pub mod placement;
pub mod raster;
pub mod sampling;

/// Convenient re-exports for common types. Import with `use canopy_scatter::prelude::*;`.
pub mod prelude {
    pub use crate::config::{
        InfluenceMode, MapParams, PlacementConfig, SamplerParams, SelectionGranularity,
        WaterMaskParams,
    };
    pub use crate::curve::{AdaptabilityCurve, Curve};
    pub use crate::ecosystem::selection::select_species;
    pub use crate::ecosystem::{CanopyLayer, Ecosystem, LayerValidation, Species, SpeciesId};
    pub use crate::error::{Error, Pass, Result};
    pub use crate::maps::water::derive_water_mask;
    pub use crate::maps::{DerivedMaps, MapEngine};
    pub use crate::placement::evaluator::{evaluate, Evaluation, EvaluationParams, TerrainView};
    pub use crate::placement::events::{
        EventSink, FnSink, MultiSink, RunEvent, RunEventKind, VecSink,
    };
    pub use crate::placement::orchestrator::{
        LayerOrchestrator, LayerResult, LayerSummary, OrchestratorState, RunResult,
    };
    pub use crate::placement::Placement;
    pub use crate::raster::{Raster, RasterId, RasterSet};
    pub use crate::sampling::{CandidateTile, PoissonDiskSampling, PositionSampling};
}
