//! Mine shaft excavation
//!
//! Carves a fixed network of straight, axis-aligned tunnels into a voxel
//! volume. Shafts are:
//! - Vertical drops connecting the surface to the mine levels
//! - Main corridors along x or z at each level
//! - Side galleries branching off the corridors
//!
//! Carving only ever turns solid voxels into shaft voxels. Air is never
//! touched, so tunnel mouths above the surface stay invisible.

use crate::strata::{AIR_COLOR_INDEX, LOW_DETAIL_SIZE, MINE_SHAFT_COLOR_INDEX, MINE_SHAFT_DIAMETER};
use crate::volume::{Axis, VoxelVolume};

/// A point in normalized volume space (each coordinate in 0..1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A straight tunnel between two normalized endpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TunnelSegment {
    pub start: Point3,
    pub end: Point3,
}

impl TunnelSegment {
    pub const fn new(start: (f32, f32, f32), end: (f32, f32, f32)) -> Self {
        Self {
            start: Point3::new(start.0, start.1, start.2),
            end: Point3::new(end.0, end.1, end.2),
        }
    }

    /// Axis the tunnel runs along, `None` for a degenerate segment.
    /// Checked in x, y, z order; segments are expected to vary in one axis.
    pub fn axis(&self) -> Option<Axis> {
        if self.start.x != self.end.x {
            Some(Axis::X)
        } else if self.start.y != self.end.y {
            Some(Axis::Y)
        } else if self.start.z != self.end.z {
            Some(Axis::Z)
        } else {
            None
        }
    }

    /// Euclidean length in normalized units.
    pub fn length(&self) -> f32 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let dz = self.end.z - self.start.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Number of blocks carved along the tunnel at any detail level.
    ///
    /// Length is measured at low-detail resolution; blocks grow with the
    /// detail level so the tunnel covers the same physical span. Vertical
    /// tunnels take half as many steps because heights are stored 2:1.
    pub fn step_count(&self) -> usize {
        let len = (self.length() * LOW_DETAIL_SIZE as f32) as usize;
        match self.axis() {
            Some(Axis::Y) => len / 2 + 1,
            Some(_) => len + 1,
            None => 0,
        }
    }
}

/// The mine under the mountain: one main drop shaft, three levels of
/// galleries and a second ventilation shaft.
pub const MINE_SHAFTS: [TunnelSegment; 34] = [
    TunnelSegment::new((0.7, 0.1, 0.7), (0.7, 0.8, 0.7)),
    TunnelSegment::new((0.7, 0.7, 0.5), (0.7, 0.7, 0.7)),
    TunnelSegment::new((0.4, 0.7, 0.7), (0.7, 0.7, 0.7)),
    TunnelSegment::new((0.4, 0.7, 0.7), (0.4, 0.7, 0.8)),
    TunnelSegment::new((0.45, 0.7, 0.7), (0.45, 0.7, 0.8)),
    TunnelSegment::new((0.5, 0.7, 0.7), (0.5, 0.7, 0.8)),
    TunnelSegment::new((0.55, 0.7, 0.7), (0.55, 0.7, 0.8)),
    TunnelSegment::new((0.6, 0.7, 0.7), (0.6, 0.7, 0.8)),
    TunnelSegment::new((0.65, 0.7, 0.7), (0.65, 0.7, 0.8)),
    TunnelSegment::new((0.5, 0.6, 0.7), (0.7, 0.6, 0.7)),
    TunnelSegment::new((0.5, 0.6, 0.7), (0.5, 0.6, 0.8)),
    TunnelSegment::new((0.55, 0.6, 0.7), (0.55, 0.6, 0.8)),
    TunnelSegment::new((0.6, 0.6, 0.7), (0.6, 0.6, 0.8)),
    TunnelSegment::new((0.65, 0.6, 0.7), (0.65, 0.6, 0.8)),
    TunnelSegment::new((0.7, 0.6, 0.4), (0.7, 0.6, 0.7)),
    TunnelSegment::new((0.6, 0.6, 0.45), (0.8, 0.6, 0.45)),
    TunnelSegment::new((0.6, 0.6, 0.5), (0.8, 0.6, 0.5)),
    TunnelSegment::new((0.6, 0.6, 0.55), (0.8, 0.6, 0.55)),
    TunnelSegment::new((0.6, 0.6, 0.6), (0.8, 0.6, 0.6)),
    TunnelSegment::new((0.6, 0.6, 0.65), (0.8, 0.6, 0.65)),
    TunnelSegment::new((0.6, 0.6, 0.7), (0.8, 0.6, 0.7)),
    TunnelSegment::new((0.7, 0.7, 0.4), (0.7, 0.7, 0.7)),
    TunnelSegment::new((0.6, 0.7, 0.45), (0.8, 0.7, 0.45)),
    TunnelSegment::new((0.6, 0.7, 0.5), (0.8, 0.7, 0.5)),
    TunnelSegment::new((0.6, 0.7, 0.55), (0.8, 0.7, 0.55)),
    TunnelSegment::new((0.6, 0.7, 0.6), (0.8, 0.7, 0.6)),
    TunnelSegment::new((0.6, 0.7, 0.65), (0.8, 0.7, 0.65)),
    TunnelSegment::new((0.6, 0.7, 0.7), (0.8, 0.7, 0.7)),
    TunnelSegment::new((0.7, 0.8, 0.5), (0.7, 0.8, 0.7)),
    TunnelSegment::new((0.6, 0.8, 0.55), (0.8, 0.8, 0.55)),
    TunnelSegment::new((0.6, 0.8, 0.6), (0.8, 0.8, 0.6)),
    TunnelSegment::new((0.6, 0.8, 0.65), (0.8, 0.8, 0.65)),
    TunnelSegment::new((0.6, 0.8, 0.7), (0.8, 0.8, 0.7)),
    TunnelSegment::new((0.7, 0.1, 0.4), (0.7, 0.7, 0.4)),
];

/// Shaft thickness in voxels for a volume of the given size.
pub fn shaft_size(volume_size: usize, diameter: usize) -> usize {
    (diameter * volume_size / LOW_DETAIL_SIZE).max(1)
}

/// Carve up to `count` segments starting at `start_index`.
/// Returns the next unprocessed segment index.
pub fn carve_segments(
    segments: &[TunnelSegment],
    start_index: usize,
    count: usize,
    volume: &mut VoxelVolume,
) -> usize {
    carve_segments_with_diameter(segments, start_index, count, MINE_SHAFT_DIAMETER, volume)
}

/// As [`carve_segments`], with an explicit low-detail shaft diameter.
pub fn carve_segments_with_diameter(
    segments: &[TunnelSegment],
    start_index: usize,
    count: usize,
    diameter: usize,
    volume: &mut VoxelVolume,
) -> usize {
    let end_index = start_index.saturating_add(count).min(segments.len());
    if start_index >= end_index {
        return start_index.min(segments.len());
    }

    let size = shaft_size(volume.width, diameter);
    for segment in &segments[start_index..end_index] {
        carve_segment(segment, size, volume);
    }

    end_index
}

/// Carve a single tunnel. Returns the number of voxels converted.
pub fn carve_segment(segment: &TunnelSegment, size: usize, volume: &mut VoxelVolume) -> usize {
    let Some(axis) = segment.axis() else {
        return 0;
    };

    let n = volume.width as f32;
    let half = (size / 2) as f32;
    let mut x = (segment.start.x * n - half) as i64;
    let mut y = ((segment.start.y * n - half) / 2.0) as i64;
    let mut z = (segment.start.z * n - half) as i64;

    let forward = match axis {
        Axis::X => segment.end.x > segment.start.x,
        Axis::Y => segment.end.y > segment.start.y,
        Axis::Z => segment.end.z > segment.start.z,
    };
    let step = if forward { size as i64 } else { -(size as i64) };

    let mut carved = 0;
    for _ in 0..segment.step_count() {
        carved += excavate_block(volume, x, y, z, size);
        match axis {
            Axis::X => x += step,
            Axis::Y => y += step,
            Axis::Z => z += step,
        }
    }
    carved
}

/// Convert a `size`-cube of voxels with its minimum corner at `(x, y, z)`.
/// Air and out-of-bounds voxels are left alone.
fn excavate_block(volume: &mut VoxelVolume, x: i64, y: i64, z: i64, size: usize) -> usize {
    let size = size as i64;
    let mut carved = 0;
    for dz in 0..size {
        for dy in 0..size {
            for dx in 0..size {
                let Some((vx, vy, vz)) = coords(volume, x + dx, y + dy, z + dz) else {
                    continue;
                };
                match volume.get(vx, vy, vz) {
                    Some(AIR_COLOR_INDEX) | Some(MINE_SHAFT_COLOR_INDEX) | None => {}
                    Some(_) => {
                        volume.set(vx, vy, vz, MINE_SHAFT_COLOR_INDEX);
                        carved += 1;
                    }
                }
            }
        }
    }
    carved
}

fn coords(volume: &VoxelVolume, x: i64, y: i64, z: i64) -> Option<(usize, usize, usize)> {
    volume
        .offset_signed(x, y, z)
        .map(|_| (x as usize, y as usize, z as usize))
}
