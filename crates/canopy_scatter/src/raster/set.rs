//! Raster pool keyed by raster identity.
//!
//! [`RasterSet`] replaces engine-managed resource handles: every pass asks the set for the
//! rasters it reads through [`RasterSet::require`], which turns an absent raster into a
//! [`Error::MissingRaster`] naming the pass. Rasters are stored behind [`Arc`] so later passes
//! share them read-only without copying.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Pass, Result};
use crate::raster::Raster;

/// Identity of a raster in the pipeline.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RasterId {
    Elevation,
    Water,
    Slope,
    MeanHeight,
    RelativeHeight,
    WaterSpread,
    Moisture,
    Occupancy,
    Influence,
}

impl RasterId {
    pub fn name(self) -> &'static str {
        match self {
            RasterId::Elevation => "elevation",
            RasterId::Water => "water",
            RasterId::Slope => "slope",
            RasterId::MeanHeight => "mean-height",
            RasterId::RelativeHeight => "relative-height",
            RasterId::WaterSpread => "water-spread",
            RasterId::Moisture => "moisture",
            RasterId::Occupancy => "occupancy",
            RasterId::Influence => "influence",
        }
    }
}

impl fmt::Display for RasterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pool of shared, read-only rasters.
#[derive(Clone, Default)]
pub struct RasterSet {
    rasters: HashMap<RasterId, Arc<Raster>>,
}

impl RasterSet {
    /// Creates a new, empty [`RasterSet`].
    pub fn new() -> Self {
        Self {
            rasters: HashMap::new(),
        }
    }

    /// Creates a set holding the two pipeline inputs.
    pub fn from_inputs(elevation: Raster, water: Raster) -> Self {
        let mut set = Self::new();
        set.insert(RasterId::Elevation, elevation);
        set.insert(RasterId::Water, water);
        set
    }

    pub fn len(&self) -> usize {
        self.rasters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }

    /// Stores `raster` under `id`, replacing any previous raster with that identity.
    pub fn insert(&mut self, id: RasterId, raster: Raster) {
        self.insert_arc(id, Arc::new(raster));
    }

    pub fn insert_arc(&mut self, id: RasterId, raster: Arc<Raster>) {
        debug!(
            "Registered raster '{}' ({}x{}).",
            id, raster.width, raster.height
        );
        self.rasters.insert(id, raster);
    }

    /// Removes a raster. Returns `true` if it was present.
    pub fn remove(&mut self, id: RasterId) -> bool {
        self.rasters.remove(&id).is_some()
    }

    pub fn contains(&self, id: RasterId) -> bool {
        self.rasters.contains_key(&id)
    }

    pub fn get(&self, id: RasterId) -> Option<Arc<Raster>> {
        self.rasters.get(&id).cloned()
    }

    /// Returns the raster or a [`Error::MissingRaster`] attributed to `pass`.
    pub fn require(&self, id: RasterId, pass: Pass) -> Result<Arc<Raster>> {
        self.get(id).ok_or(Error::MissingRaster { pass, id })
    }

    /// Returns the raster if it is present and has the expected dimensions.
    pub fn require_sized(
        &self,
        id: RasterId,
        pass: Pass,
        expected: (usize, usize),
    ) -> Result<Arc<Raster>> {
        let raster = self.require(id, pass)?;
        if raster.size() != expected {
            return Err(Error::DimensionMismatch {
                pass,
                expected,
                found: raster.size(),
            });
        }
        Ok(raster)
    }

    /// Copies every raster handle from `other` into this set.
    pub fn extend_from(&mut self, other: &RasterSet) {
        for (id, raster) in other.rasters.iter() {
            self.rasters.insert(*id, raster.clone());
        }
    }
}
