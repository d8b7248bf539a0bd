//! Event types and sinks for observing placement runs.
//!
//! This module defines [`RunEvent`] and a set of sinks and adapters to emit, collect, or
//! forward events while a [`crate::placement::orchestrator::LayerOrchestrator`] steps
//! through its layers.
use crate::ecosystem::{CanopyLayer, SpeciesId};
use crate::placement::orchestrator::{LayerSummary, OrchestratorState};
use crate::placement::Placement;

/// Describes events emitted by the orchestrator.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Emitted once the terrain is resolved and the candidate tile generated.
    RunStarted {
        /// Map size in pixels.
        size: (usize, usize),
        /// Number of tiles covering the map.
        tile_count: usize,
        /// Candidates in the shared tile.
        candidates_per_tile: usize,
    },

    /// Emitted after every state transition.
    StateEntered { state: OrchestratorState },

    /// Emitted when a layer starts evaluating.
    LayerStarted {
        layer: CanopyLayer,
        species: Vec<SpeciesId>,
        /// Acceptance threshold applied to this layer.
        threshold: f32,
    },

    /// Emitted when a layer without species is skipped.
    LayerSkipped { layer: CanopyLayer },

    /// Emitted for every accepted candidate.
    PlacementMade { placement: Placement },

    /// Emitted when a layer's evaluation finished.
    LayerFinished {
        layer: CanopyLayer,
        summary: LayerSummary,
    },

    /// Emitted after a layer's occupancy was merged into the influence field.
    InfluenceMerged {
        layer: CanopyLayer,
        /// Pixels with positive influence after the merge.
        covered_pixels: usize,
    },

    /// Emitted when the run reaches `Done`.
    RunFinished { summary: LayerSummary },

    /// Non-fatal warning generated during the run.
    Warning {
        /// Context string (e.g. layer or tile).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of a [`RunEvent`], used to filter events before they are built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunEventKind {
    RunStarted,
    StateEntered,
    LayerStarted,
    LayerSkipped,
    PlacementMade,
    LayerFinished,
    InfluenceMerged,
    RunFinished,
    Warning,
}

impl RunEvent {
    pub fn kind(&self) -> RunEventKind {
        match self {
            RunEvent::RunStarted { .. } => RunEventKind::RunStarted,
            RunEvent::StateEntered { .. } => RunEventKind::StateEntered,
            RunEvent::LayerStarted { .. } => RunEventKind::LayerStarted,
            RunEvent::LayerSkipped { .. } => RunEventKind::LayerSkipped,
            RunEvent::PlacementMade { .. } => RunEventKind::PlacementMade,
            RunEvent::LayerFinished { .. } => RunEventKind::LayerFinished,
            RunEvent::InfluenceMerged { .. } => RunEventKind::InfluenceMerged,
            RunEvent::RunFinished { .. } => RunEventKind::RunFinished,
            RunEvent::Warning { .. } => RunEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`RunEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: RunEvent);

    /// Whether events of `kind` should be built and sent at all.
    #[inline]
    fn wants(&self, _kind: RunEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: RunEvent) {}

    #[inline]
    fn wants(&self, _kind: RunEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(RunEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(RunEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(RunEvent),
{
    #[inline]
    fn send(&mut self, event: RunEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<RunEvent>,
    only: Option<Vec<RunEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
            only: None,
        }
    }

    /// Collect only the listed kinds.
    pub fn filtered(kinds: impl Into<Vec<RunEventKind>>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into()),
        }
    }

    pub fn into_inner(self) -> Vec<RunEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[RunEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: RunEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: RunEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn into_inner(self) -> Vec<S> {
        self.sinks
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: RunEvent) {
        let kind = event.kind();
        let mut targets: Vec<&mut S> = self.sinks.iter_mut().filter(|s| s.wants(kind)).collect();
        let Some(last) = targets.pop() else {
            return;
        };
        for sink in targets {
            sink.send(event.clone());
        }
        last.send(event);
    }

    fn wants(&self, kind: RunEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
