//! Terrain build configuration
//!
//! Defaults reproduce the stock mine-under-the-mountain scene. A JSON file
//! may override any subset of fields; missing fields keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};
use crate::heightmap::LayerFiles;
use crate::strata::{MINE_SHAFT_DIAMETER, TERRAIN_TRANSPARENCY};
use crate::volume::DetailLevel;

/// Work done per scheduler tick for one detail level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepBudget {
    /// Z-slabs rasterized per tick
    pub slabs: usize,
    /// Tunnel segments carved per tick (only once all slabs are done)
    pub segments: usize,
}

impl StepBudget {
    /// Everything in a single step.
    pub const UNBOUNDED: StepBudget = StepBudget { slabs: usize::MAX, segments: usize::MAX };

    pub fn new(slabs: usize, segments: usize) -> Self {
        Self { slabs: slabs.max(1), segments: segments.max(1) }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Shaft thickness in voxels at low detail; scales with detail level
    pub shaft_diameter: usize,
    /// Alpha used for translucent terrain bands
    pub terrain_transparency: u8,
    /// Medium detail slabs per tick
    pub medium_slabs_per_tick: usize,
    /// High detail slabs per tick
    pub high_slabs_per_tick: usize,
    /// Tunnel segments carved per tick at medium and high detail
    pub segments_per_tick: usize,
    /// Height-map file names inside the layer directory
    pub layer_files: LayerFiles,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            shaft_diameter: MINE_SHAFT_DIAMETER,
            terrain_transparency: TERRAIN_TRANSPARENCY,
            medium_slabs_per_tick: 4,
            high_slabs_per_tick: 1,
            segments_per_tick: 1,
            layer_files: LayerFiles::default(),
        }
    }
}

impl TerrainConfig {
    /// Load from a JSON file. Fields not present keep their defaults.
    pub fn load(path: &Path) -> TerrainResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|source| TerrainError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Per-tick budget for a detail level. Low detail is always built in
    /// one go before anything is shown.
    pub fn budget(&self, level: DetailLevel) -> StepBudget {
        match level {
            DetailLevel::Low => StepBudget::UNBOUNDED,
            DetailLevel::Medium => StepBudget::new(self.medium_slabs_per_tick, self.segments_per_tick),
            DetailLevel::High => StepBudget::new(self.high_slabs_per_tick, self.segments_per_tick),
        }
    }
}
