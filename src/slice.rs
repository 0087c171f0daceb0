//! Axis-aligned slice rendering
//!
//! A slice is one plane of voxels through the volume, coloured through a
//! colour table. Slider values run over a fixed 0..1024 range independent
//! of detail level and map onto the active volume's dimension.

use image::{ImageBuffer, Rgba as Pixel, RgbaImage};
use tracing::warn;

use crate::color_table::ColorTable;
use crate::volume::{Axis, VoxelVolume};

/// Upper bound of every slice slider.
pub const SLIDER_RANGE: usize = 1024;

/// Map a slider value onto a slice index for an axis of length `dim`.
pub fn slice_index_from_slider(value: usize, dim: usize) -> usize {
    if dim == 0 {
        return 0;
    }
    let step = (SLIDER_RANGE / dim).max(1);
    (value / step).min(dim - 1)
}

/// Image dimensions of a slice perpendicular to `axis`.
pub fn slice_dimensions(volume: &VoxelVolume, axis: Axis) -> (u32, u32) {
    let (w, h, d) = volume.dimensions();
    match axis {
        Axis::X => (d as u32, h as u32),
        Axis::Y => (w as u32, d as u32),
        Axis::Z => (w as u32, h as u32),
    }
}

/// Volume coordinate shown at image pixel `(px, py)` of a slice.
fn voxel_at(volume: &VoxelVolume, axis: Axis, index: usize, px: usize, py: usize) -> (usize, usize, usize) {
    match axis {
        Axis::X => (index, py, px),
        // Rows run from the far edge so the image reads as a top-down map
        Axis::Y => (px, index, volume.depth - 1 - py),
        Axis::Z => (px, py, index),
    }
}

/// Render the slice perpendicular to `axis` at `index`. Out-of-range
/// indices are clamped to the last plane.
pub fn render_slice(volume: &VoxelVolume, table: &ColorTable, axis: Axis, index: usize) -> RgbaImage {
    let dim = volume.dimension(axis);
    let index = if index >= dim {
        warn!(?axis, index, dim, "slice index clamped");
        dim.saturating_sub(1)
    } else {
        index
    };

    let (width, height) = slice_dimensions(volume, axis);
    let mut img: RgbaImage = ImageBuffer::new(width, height);
    if volume.is_empty() {
        return img;
    }

    for py in 0..height as usize {
        for px in 0..width as usize {
            let (x, y, z) = voxel_at(volume, axis, index, px, py);
            let value = volume.get(x, y, z).unwrap_or(0);
            img.put_pixel(px as u32, py as u32, Pixel(table.get(value).to_array()));
        }
    }

    img
}
