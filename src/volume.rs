//! Voxel volumes
//!
//! A volume is an `N x N/2 x N` grid of colour indices. The height axis is
//! stored at half resolution, so real heights compress 2:1 into texture
//! rows. The flat layout (`x + y * N + z * N * N / 2`) is what a renderer
//! uploads as an 8-bit indexed 3D texture, so it must not change.

use std::fmt;
use std::str::FromStr;

use crate::error::TerrainError;
use crate::strata::{is_valid_voxel, HIGH_DETAIL_SIZE, LOW_DETAIL_SIZE, MEDIUM_DETAIL_SIZE};

/// One of the three fixed voxel resolutions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl DetailLevel {
    pub fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }

    /// Voxels along the x and z axes
    pub fn size(&self) -> usize {
        match self {
            Self::Low => LOW_DETAIL_SIZE,
            Self::Medium => MEDIUM_DETAIL_SIZE,
            Self::High => HIGH_DETAIL_SIZE,
        }
    }

    pub fn from_size(size: usize) -> Result<Self, TerrainError> {
        match size {
            LOW_DETAIL_SIZE => Ok(Self::Low),
            MEDIUM_DETAIL_SIZE => Ok(Self::Medium),
            HIGH_DETAIL_SIZE => Ok(Self::High),
            other => Err(TerrainError::UnknownDetailSize(other)),
        }
    }

    /// Human readable label including dimensions, e.g. `Medium (256x128x256)`
    pub fn label(&self) -> String {
        let n = self.size();
        let name = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        format!("{} ({}x{}x{})", name, n, n / 2, n)
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for DetailLevel {
    type Err = TerrainError;

    /// Accepts a level name or its size, e.g. `medium` or `256`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => match other.parse::<usize>() {
                Ok(size) => Self::from_size(size),
                Err(_) => Err(TerrainError::UnknownDetailLevel(s.to_string())),
            },
        }
    }
}

/// Axis of a volume
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn all() -> &'static [Self] {
        &[Self::X, Self::Y, Self::Z]
    }
}

/// Dense 3D grid of colour indices.
#[derive(Clone, PartialEq, Eq)]
pub struct VoxelVolume {
    /// Voxels along x
    pub width: usize,
    /// Voxels along y (always `width / 2`)
    pub height: usize,
    /// Voxels along z
    pub depth: usize,
    /// Storage (x + y * width + z * width * height)
    data: Vec<u8>,
}

impl fmt::Debug for VoxelVolume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelVolume")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

impl VoxelVolume {
    /// Allocate a zero-filled `size x size/2 x size` volume.
    pub fn new(size: usize) -> Self {
        let height = size / 2;
        Self {
            width: size,
            height,
            depth: size,
            data: vec![0; size * height * size],
        }
    }

    pub fn for_level(level: DetailLevel) -> Self {
        Self::new(level.size())
    }

    /// Voxels along the given axis.
    pub fn dimension(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
            Axis::Z => self.depth,
        }
    }

    /// Flat offset of a voxel, `None` if outside the volume.
    pub fn offset(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        if x < self.width && y < self.height && z < self.depth {
            Some(x + y * self.width + z * self.width * self.height)
        } else {
            None
        }
    }

    /// Flat offset for signed coordinates, used while carving near edges.
    pub fn offset_signed(&self, x: i64, y: i64, z: i64) -> Option<usize> {
        if x < 0 || y < 0 || z < 0 {
            return None;
        }
        self.offset(x as usize, y as usize, z as usize)
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<u8> {
        self.offset(x, y, z).map(|idx| self.data[idx])
    }

    /// Write one voxel. Returns `false` (and writes nothing) when out of bounds.
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: u8) -> bool {
        match self.offset(x, y, z) {
            Some(idx) => {
                self.data[idx] = value;
                true
            }
            None => false,
        }
    }

    /// One z-slab (`width * height` voxels), the unit of incremental builds.
    pub fn slab_mut(&mut self, z: usize) -> &mut [u8] {
        let frame = self.width * self.height;
        &mut self.data[z * frame..(z + 1) * frame]
    }

    /// Raw texture bytes in renderer layout.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Texture dimensions `(width, height, depth)`.
    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    /// Number of voxels holding `value`.
    pub fn count(&self, value: u8) -> usize {
        self.data.iter().filter(|&&v| v == value).count()
    }

    /// First voxel that is not a legal colour index, if any.
    pub fn find_invalid(&self) -> Option<(usize, usize, usize, u8)> {
        let frame = self.width * self.height;
        self.data.iter().enumerate().find(|(_, &v)| !is_valid_voxel(v)).map(|(idx, &v)| {
            (idx % self.width, (idx % frame) / self.width, idx / frame, v)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!("medium".parse::<DetailLevel>().unwrap(), DetailLevel::Medium);
        assert_eq!("High".parse::<DetailLevel>().unwrap(), DetailLevel::High);
        assert_eq!("128".parse::<DetailLevel>().unwrap(), DetailLevel::Low);
        assert!(matches!("100".parse::<DetailLevel>(), Err(TerrainError::UnknownDetailSize(100))));
        assert!(matches!("huge".parse::<DetailLevel>(), Err(TerrainError::UnknownDetailLevel(_))));
    }

    #[test]
    fn test_sizes() {
        for &level in DetailLevel::all() {
            let volume = VoxelVolume::for_level(level);
            let n = level.size();
            assert_eq!(volume.len(), n * (n / 2) * n);
            assert_eq!(volume.dimensions(), (n, n / 2, n));
        }
    }

    #[test]
    fn test_offset_layout() {
        let volume = VoxelVolume::new(128);
        assert_eq!(volume.offset(0, 0, 0), Some(0));
        assert_eq!(volume.offset(5, 0, 0), Some(5));
        assert_eq!(volume.offset(0, 1, 0), Some(128));
        assert_eq!(volume.offset(0, 0, 1), Some(128 * 64));
        assert_eq!(volume.offset(127, 63, 127), Some(volume.len() - 1));
        assert_eq!(volume.offset(0, 64, 0), None);
        assert_eq!(volume.offset_signed(-1, 0, 0), None);
    }

    #[test]
    fn test_get_set_bounds() {
        let mut volume = VoxelVolume::new(128);
        assert!(volume.set(3, 4, 5, 77));
        assert_eq!(volume.get(3, 4, 5), Some(77));
        assert_eq!(volume.as_bytes()[3 + 4 * 128 + 5 * 128 * 64], 77);
        assert!(!volume.set(128, 0, 0, 1));
        assert_eq!(volume.get(0, 0, 128), None);
    }

    #[test]
    fn test_slab_mut_addresses_one_z() {
        let mut volume = VoxelVolume::new(128);
        volume.slab_mut(2).fill(9);
        assert_eq!(volume.get(0, 0, 2), Some(9));
        assert_eq!(volume.get(127, 63, 2), Some(9));
        assert_eq!(volume.get(127, 63, 1), Some(0));
        assert_eq!(volume.get(0, 0, 3), Some(0));
        assert_eq!(volume.count(9), 128 * 64);
    }

    #[test]
    fn test_detail_level_from_size() {
        assert_eq!(DetailLevel::from_size(256).unwrap(), DetailLevel::Medium);
        assert!(matches!(
            DetailLevel::from_size(100),
            Err(TerrainError::UnknownDetailSize(100))
        ));
        assert_eq!(DetailLevel::High.label(), "High (512x256x512)");
    }

    #[test]
    fn test_find_invalid() {
        let mut volume = VoxelVolume::new(128);
        assert_eq!(volume.find_invalid(), None);
        volume.set(1, 2, 3, 250);
        assert_eq!(volume.find_invalid(), Some((1, 2, 3, 250)));
    }
}
