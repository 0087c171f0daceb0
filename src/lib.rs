//! Volumetric terrain library
//!
//! Builds stratified voxel volumes from ground, water and magma height maps,
//! carves a mine-shaft network into them and renders colour-mapped slices.
//! Re-exports modules for use by binaries and tools.

pub mod builder;
pub mod color_table;
pub mod config;
pub mod error;
pub mod export;
pub mod generation;
pub mod heightmap;
pub mod logging;
pub mod shafts;
pub mod slice;
pub mod strata;
pub mod synthetic;
pub mod tilemap;
pub mod view;
pub mod volume;

pub use error::{TerrainError, TerrainResult};
