//! Voxel volume rasterization
//!
//! Turns the three height layers into a stratified voxel volume, one z-slab
//! at a time so that large volumes can be built across many scheduler ticks.

use crate::heightmap::HeightLayers;
use crate::strata::{classify, LAYER_DATA_SIZE};
use crate::volume::VoxelVolume;

/// Physical height represented by texture row `y` at the given source
/// multiplier. Row 0 is the top of the volume.
pub fn row_height(y: usize, multiplier: f32) -> i32 {
    ((LAYER_DATA_SIZE as f32 - y as f32 * 2.0 * multiplier) / 2.0) as i32
}

/// Rasterize up to `count` z-slabs starting at `start_z`.
///
/// Layers are sampled nearest-neighbour: voxel column `x` of slab `z` reads
/// source sample `(floor(x * 512 / N), floor(z * 512 / N))`. Returns the next
/// unprocessed slab index; a `start_z` at or past the end writes nothing and
/// returns the volume size.
pub fn build_slab(
    layers: &HeightLayers,
    start_z: usize,
    count: usize,
    volume: &mut VoxelVolume,
) -> usize {
    let size = volume.width;
    if start_z >= size {
        return size;
    }

    let end_z = start_z.saturating_add(count).min(size);
    let rows = volume.height;
    let multiplier = LAYER_DATA_SIZE as f32 / size as f32;

    let mut magma_heights = vec![0u8; size];
    let mut water_heights = vec![0u8; size];
    let mut ground_heights = vec![0u8; size];

    for z in start_z..end_z {
        // Layer heights along this slab
        let layer_row = (z as f32 * multiplier) as usize;
        for x in 0..size {
            let layer_col = (x as f32 * multiplier) as usize;
            let (magma, water, ground) = layers.column(layer_col, layer_row);
            magma_heights[x] = magma;
            water_heights[x] = water;
            ground_heights[x] = ground;
        }

        let slab = volume.slab_mut(z);
        for y in 0..rows {
            let height = row_height(y, multiplier);
            let row = &mut slab[y * size..(y + 1) * size];
            for (x, voxel) in row.iter_mut().enumerate() {
                let (_, index) = classify(height, magma_heights[x], water_heights[x], ground_heights[x]);
                *voxel = index;
            }
        }
    }

    end_z
}
