//! Step-wise execution of the canopy layers.
//!
//! [`LayerOrchestrator`] walks the states
//!
//! ```text
//! Idle -> L1Evaluating -> L1Merging -> L2Evaluating -> L2Merging -> L3Evaluating -> L3Merging -> Done
//! ```
//!
//! one transition per [`LayerOrchestrator::step`]. Layers without species are skipped
//! without entering their states. Leaving `Idle` validates the configuration, resolves the
//! terrain rasters and generates the shared candidate tile. Evaluating a layer runs every
//! map tile in parallel with its own seeded RNG, so results only depend on the run seed.
//! Merging folds the layer's occupancy into the influence field read by the layers below.
//!
//! Dropping the orchestrator between steps cancels the run.
use std::fmt;
use std::ops::AddAssign;
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{PlacementConfig, SelectionGranularity};
use crate::ecosystem::selection::select_species;
use crate::ecosystem::{CanopyLayer, Ecosystem, SpeciesId};
use crate::error::{Error, Result};
use crate::placement::evaluator::{evaluate, EvaluationParams, TerrainView};
use crate::placement::events::{EventSink, RunEvent, RunEventKind};
use crate::placement::influence::{layer_field, merge_max};
use crate::placement::tiling::{
    inside_map, mix_u64, seed_for_tile, tile_origin, tiles_covering, TileId,
};
use crate::placement::Placement;
use crate::raster::{Raster, RasterSet};
use crate::sampling::{CandidateTile, PositionSampling};

/// Where the orchestrator is in its run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrchestratorState {
    Idle,
    Evaluating(CanopyLayer),
    Merging(CanopyLayer),
    Done,
}

impl OrchestratorState {
    /// Layer being processed, if any.
    pub fn layer(self) -> Option<CanopyLayer> {
        match self {
            OrchestratorState::Evaluating(layer) | OrchestratorState::Merging(layer) => {
                Some(layer)
            }
            _ => None,
        }
    }

    pub fn is_done(self) -> bool {
        self == OrchestratorState::Done
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestratorState::Idle => f.write_str("Idle"),
            OrchestratorState::Evaluating(layer) => write!(f, "{layer}Evaluating"),
            OrchestratorState::Merging(layer) => write!(f, "{layer}Merging"),
            OrchestratorState::Done => f.write_str("Done"),
        }
    }
}

/// Candidate counts of a layer or a whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerSummary {
    pub evaluated: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl AddAssign for LayerSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.evaluated += rhs.evaluated;
        self.accepted += rhs.accepted;
        self.rejected += rhs.rejected;
    }
}

/// Outcome of one canopy layer.
#[derive(Clone, Debug)]
pub struct LayerResult {
    pub layer: CanopyLayer,
    /// Species configured on the layer.
    pub species: Vec<SpeciesId>,
    /// Accepted placements in tile order.
    pub placements: Vec<Placement>,
    /// `1.0` at every pixel holding an accepted placement.
    pub occupancy: Raster,
    pub threshold: f32,
    pub summary: LayerSummary,
    /// The layer had no species and was not evaluated.
    pub skipped: bool,
}

impl LayerResult {
    fn skipped(layer: CanopyLayer, threshold: f32, size: (usize, usize)) -> Self {
        Self {
            layer,
            species: Vec::new(),
            placements: Vec::new(),
            occupancy: Raster::new(size.0, size.1),
            threshold,
            summary: LayerSummary::default(),
            skipped: true,
        }
    }
}

/// Outcome of a complete run.
#[derive(Clone, Debug)]
pub struct RunResult {
    /// One entry per layer, L1 first, skipped layers included.
    pub layers: Vec<LayerResult>,
    /// Influence field after the last merge.
    pub influence: Raster,
    pub summary: LayerSummary,
    pub tile_count: usize,
    pub candidates_per_tile: usize,
}

impl RunResult {
    pub fn layer(&self, layer: CanopyLayer) -> Option<&LayerResult> {
        self.layers.iter().find(|r| r.layer == layer)
    }

    /// All placements, L1 first.
    pub fn placements(&self) -> impl Iterator<Item = &Placement> + '_ {
        self.layers.iter().flat_map(|r| r.placements.iter())
    }

    pub fn placement_count(&self) -> usize {
        self.summary.accepted
    }
}

/// Run state built when leaving `Idle`.
struct Prepared {
    terrain: TerrainView,
    tile: CandidateTile,
    tiles: Vec<TileId>,
    influence: Raster,
}

#[derive(Default)]
struct TileOutcome {
    evaluated: usize,
    placements: Vec<Placement>,
}

/// Drives the placement of every canopy layer over the terrain in a [`RasterSet`].
pub struct LayerOrchestrator<'a> {
    ecosystem: &'a Ecosystem,
    rasters: &'a RasterSet,
    config: PlacementConfig,
    sampling: Option<Arc<dyn PositionSampling>>,
    seed: u64,
    state: OrchestratorState,
    prepared: Option<Prepared>,
    pending: Option<LayerResult>,
    layers: Vec<LayerResult>,
    result: Option<RunResult>,
}

impl<'a> LayerOrchestrator<'a> {
    /// Creates an orchestrator in `Idle`, drawing the run seed from `rng`.
    pub fn new(
        ecosystem: &'a Ecosystem,
        rasters: &'a RasterSet,
        config: PlacementConfig,
        rng: &mut impl RngCore,
    ) -> Self {
        Self {
            ecosystem,
            rasters,
            config,
            sampling: None,
            seed: rng.next_u64(),
            state: OrchestratorState::Idle,
            prepared: None,
            pending: None,
            layers: Vec::with_capacity(CanopyLayer::ALL.len()),
            result: None,
        }
    }

    /// Replaces the run seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generates the candidate tile with `sampling` instead of Poisson disk sampling.
    pub fn with_sampling(mut self, sampling: impl PositionSampling + 'static) -> Self {
        self.sampling = Some(Arc::new(sampling));
        self
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// The running influence field, once the run has left `Idle`.
    pub fn influence(&self) -> Option<&Raster> {
        self.prepared.as_ref().map(|p| &p.influence)
    }

    /// Results of the layers finished so far.
    pub fn finished_layers(&self) -> &[LayerResult] {
        &self.layers
    }

    /// Advances one state.
    pub fn step(&mut self) -> Result<OrchestratorState> {
        self.step_with_events(&mut ())
    }

    /// Advances one state, reporting to `sink`. Stepping in `Done` is a no-op.
    pub fn step_with_events(&mut self, sink: &mut dyn EventSink) -> Result<OrchestratorState> {
        let next = match self.state {
            OrchestratorState::Idle => {
                self.prepare(sink)?;
                self.advance(None, sink)?
            }
            OrchestratorState::Evaluating(layer) => {
                self.evaluate_layer(layer, sink)?;
                OrchestratorState::Merging(layer)
            }
            OrchestratorState::Merging(layer) => {
                self.merge_layer(layer, sink)?;
                self.advance(Some(layer), sink)?
            }
            OrchestratorState::Done => return Ok(OrchestratorState::Done),
        };

        debug!("Orchestrator {} -> {}.", self.state, next);
        self.state = next;
        if sink.wants(RunEventKind::StateEntered) {
            sink.send(RunEvent::StateEntered { state: next });
        }
        if next.is_done() {
            self.finish(sink)?;
        }
        Ok(next)
    }

    /// Steps until `Done` and returns the result.
    pub fn run(self) -> Result<RunResult> {
        self.run_with_events(&mut ())
    }

    pub fn run_with_events(mut self, sink: &mut dyn EventSink) -> Result<RunResult> {
        while !self.state.is_done() {
            self.step_with_events(sink)?;
        }
        self.into_result()
            .ok_or_else(|| Error::Other("placement run finished without a result".into()))
    }

    /// The result once the run is `Done`.
    pub fn result(&self) -> Option<&RunResult> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<RunResult> {
        self.result
    }

    fn prepared(&self) -> Result<&Prepared> {
        self.prepared
            .as_ref()
            .ok_or_else(|| Error::Other("placement run has not been prepared".into()))
    }

    fn prepare(&mut self, sink: &mut dyn EventSink) -> Result<()> {
        self.config.validate()?;
        self.ecosystem.validate()?;
        let terrain = TerrainView::from_set(self.rasters)?;

        for validation in self.ecosystem.validate_layers() {
            if !validation.is_well_formed() && sink.wants(RunEventKind::Warning) {
                sink.send(RunEvent::Warning {
                    context: format!("layer:{}", validation.layer),
                    message: format!(
                        "Predominance sums to {:.3} over {} species",
                        validation.predominance_sum, validation.species_count
                    ),
                });
            }
        }

        let mut rng = StdRng::seed_from_u64(mix_u64(self.seed));
        let tile_size = self.config.sampler.tile_size;
        let tile = match &self.sampling {
            Some(sampling) => CandidateTile::from_sampling(&**sampling, tile_size, &mut rng),
            None => CandidateTile::generate(&self.config.sampler, &mut rng),
        };
        if tile.is_empty() {
            warn!("Candidate tile is empty; no layer will place anything.");
            if sink.wants(RunEventKind::Warning) {
                sink.send(RunEvent::Warning {
                    context: "sampling".into(),
                    message: "Candidate tile is empty".into(),
                });
            }
        }

        let (width, height) = terrain.size();
        let tiles = tiles_covering(width, height, tile_size);
        info!(
            "Placement run: {}x{} map, {} tiles of {} candidates, seed {}.",
            width,
            height,
            tiles.len(),
            tile.len(),
            self.seed
        );
        if sink.wants(RunEventKind::RunStarted) {
            sink.send(RunEvent::RunStarted {
                size: (width, height),
                tile_count: tiles.len(),
                candidates_per_tile: tile.len(),
            });
        }

        self.prepared = Some(Prepared {
            terrain,
            tile,
            tiles,
            influence: Raster::new(width, height),
        });
        Ok(())
    }

    /// Next state after `from` (or the first layer), recording any empty layer as skipped.
    fn advance(
        &mut self,
        from: Option<CanopyLayer>,
        sink: &mut dyn EventSink,
    ) -> Result<OrchestratorState> {
        let size = self.prepared()?.terrain.size();
        let mut candidate = match from {
            None => Some(CanopyLayer::L1),
            Some(layer) => layer.next(),
        };
        while let Some(layer) = candidate {
            if !self.ecosystem.layer(layer).is_empty() {
                return Ok(OrchestratorState::Evaluating(layer));
            }
            warn!("Layer {} has no species; skipping.", layer);
            if sink.wants(RunEventKind::LayerSkipped) {
                sink.send(RunEvent::LayerSkipped { layer });
            }
            self.layers.push(LayerResult::skipped(
                layer,
                self.config.threshold_for(layer),
                size,
            ));
            candidate = layer.next();
        }
        Ok(OrchestratorState::Done)
    }

    fn evaluate_layer(&mut self, layer: CanopyLayer, sink: &mut dyn EventSink) -> Result<()> {
        let start = Instant::now();
        let prepared = self.prepared()?;
        let species = self.ecosystem.layer(layer);
        let params = EvaluationParams::for_layer(&self.config, layer);
        let species_ids: Vec<SpeciesId> = species.iter().map(|s| s.id.clone()).collect();

        info!(
            "Layer {}: {} species, threshold {:.2}.",
            layer,
            species.len(),
            params.threshold
        );
        if sink.wants(RunEventKind::LayerStarted) {
            sink.send(RunEvent::LayerStarted {
                layer,
                species: species_ids.clone(),
                threshold: params.threshold,
            });
        }

        let influence = layer.has_upper_layers().then_some(&prepared.influence);
        let (width, height) = prepared.terrain.size();
        let granularity = self.config.selection_granularity;
        let seed = self.seed;

        let outcomes: Vec<TileOutcome> = prepared
            .tiles
            .par_iter()
            .map(|&tile| {
                let mut rng = StdRng::seed_from_u64(seed_for_tile(seed, layer, tile));
                let origin = tile_origin(tile, prepared.tile.tile_size);
                let tile_species = match granularity {
                    SelectionGranularity::PerTile => select_species(species, &mut rng),
                    SelectionGranularity::PerPoint => None,
                };

                let mut outcome = TileOutcome::default();
                for point in prepared.tile.translated(origin) {
                    if !inside_map(point, width, height) {
                        continue;
                    }
                    let chosen = match granularity {
                        SelectionGranularity::PerTile => tile_species,
                        SelectionGranularity::PerPoint => select_species(species, &mut rng),
                    };
                    let Some(chosen) = chosen else {
                        continue;
                    };
                    outcome.evaluated += 1;
                    let evaluation =
                        evaluate(point, &prepared.terrain, chosen, layer, influence, &params);
                    if evaluation.accepted {
                        outcome.placements.push(Placement {
                            position: point,
                            species_id: chosen.id.clone(),
                            probability: evaluation.probability,
                            layer,
                        });
                    }
                }
                outcome
            })
            .collect();

        let mut occupancy = Raster::new(width, height);
        let mut placements = Vec::new();
        let mut evaluated = 0;
        for outcome in outcomes {
            evaluated += outcome.evaluated;
            placements.extend(outcome.placements);
        }
        for placement in &placements {
            if let Some((x, y)) = occupancy.pixel_at(placement.position) {
                occupancy.set(x, y, 1.0);
            }
        }
        if sink.wants(RunEventKind::PlacementMade) {
            for placement in &placements {
                sink.send(RunEvent::PlacementMade {
                    placement: placement.clone(),
                });
            }
        }

        let summary = LayerSummary {
            evaluated,
            accepted: placements.len(),
            rejected: evaluated - placements.len(),
        };
        info!(
            "Layer {} evaluated {} candidates: {} accepted, {} rejected in {:?}.",
            layer,
            summary.evaluated,
            summary.accepted,
            summary.rejected,
            start.elapsed()
        );
        if sink.wants(RunEventKind::LayerFinished) {
            sink.send(RunEvent::LayerFinished { layer, summary });
        }

        self.pending = Some(LayerResult {
            layer,
            species: species_ids,
            placements,
            occupancy,
            threshold: params.threshold,
            summary,
            skipped: false,
        });
        Ok(())
    }

    fn merge_layer(&mut self, layer: CanopyLayer, sink: &mut dyn EventSink) -> Result<()> {
        let result = self
            .pending
            .take()
            .filter(|r| r.layer == layer)
            .ok_or_else(|| Error::Other(format!("no evaluated result for layer {layer}")))?;

        let zone = self.ecosystem.max_zone_of_influence(layer);
        let trunk = self.ecosystem.max_trunk_radius(layer);
        let field = layer_field(&result.occupancy, self.config.influence_mode, zone, trunk);

        let prepared = self
            .prepared
            .as_mut()
            .ok_or_else(|| Error::Other("placement run has not been prepared".into()))?;
        merge_max(&mut prepared.influence, &field);
        let covered_pixels = prepared.influence.count_positive();
        debug!(
            "Layer {} merged with zone of influence {:.1}: {} pixels influenced.",
            layer, zone, covered_pixels
        );
        if sink.wants(RunEventKind::InfluenceMerged) {
            sink.send(RunEvent::InfluenceMerged {
                layer,
                covered_pixels,
            });
        }

        self.layers.push(result);
        Ok(())
    }

    fn finish(&mut self, sink: &mut dyn EventSink) -> Result<()> {
        let prepared = self
            .prepared
            .take()
            .ok_or_else(|| Error::Other("placement run has not been prepared".into()))?;
        let mut layers = std::mem::take(&mut self.layers);
        layers.sort_by_key(|r| r.layer);

        let mut summary = LayerSummary::default();
        for layer in &layers {
            summary += layer.summary;
        }
        info!(
            "Placement finished: {} placements from {} candidates.",
            summary.accepted, summary.evaluated
        );
        if sink.wants(RunEventKind::RunFinished) {
            sink.send(RunEvent::RunFinished { summary });
        }

        self.result = Some(RunResult {
            layers,
            influence: prepared.influence,
            summary,
            tile_count: prepared.tiles.len(),
            candidates_per_tile: prepared.tile.len(),
        });
        Ok(())
    }
}
