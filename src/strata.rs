//! Colour-band layout and stratum classification
//!
//! Every voxel stores a single byte indexing into a 256-entry colour table.
//! The table is split into one contiguous band per stratum, each
//! `LAYER_COLOR_THICKNESS` slots wide, plus two reserved sentinels at the top.

// =============================================================================
// DETAIL & LAYER CONSTANTS
// =============================================================================

/// Low detail voxel resolution (built synchronously before first display)
pub const LOW_DETAIL_SIZE: usize = 128;
/// Medium detail voxel resolution
pub const MEDIUM_DETAIL_SIZE: usize = 256;
/// High detail voxel resolution
pub const HIGH_DETAIL_SIZE: usize = 512;

/// Number of entries in a colour table
pub const COLOR_TABLE_SIZE: usize = 256;
/// Side length of every source height layer
pub const LAYER_DATA_SIZE: usize = 512;
/// Mine shaft thickness in voxels at low detail
pub const MINE_SHAFT_DIAMETER: usize = 1;

// =============================================================================
// COLOUR BAND LAYOUT
// =============================================================================

/// Reserved index for empty space above the ground
pub const AIR_COLOR_INDEX: u8 = 254;
/// Reserved index for carved tunnel voxels
pub const MINE_SHAFT_COLOR_INDEX: u8 = 255;

/// Width of each stratum's colour band
pub const LAYER_COLOR_THICKNESS: usize = 60;
/// Height span mapped onto a full colour band
pub const HEIGHT_TO_COLOR_DIV: f32 = 140.0;

pub const MAGMA_COLORS_MIN: usize = 0;
pub const MAGMA_COLORS_MAX: usize = MAGMA_COLORS_MIN + LAYER_COLOR_THICKNESS;
pub const ABOVE_WATER_GROUND_COLORS_MIN: usize = MAGMA_COLORS_MAX + 1;
pub const ABOVE_WATER_GROUND_COLORS_MAX: usize = ABOVE_WATER_GROUND_COLORS_MIN + LAYER_COLOR_THICKNESS;
pub const UNDER_WATER_GROUND_COLORS_MIN: usize = ABOVE_WATER_GROUND_COLORS_MAX + 1;
pub const UNDER_WATER_GROUND_COLORS_MAX: usize = UNDER_WATER_GROUND_COLORS_MIN + LAYER_COLOR_THICKNESS;
pub const WATER_COLORS_MIN: usize = UNDER_WATER_GROUND_COLORS_MAX + 1;
pub const WATER_COLORS_MAX: usize = WATER_COLORS_MIN + LAYER_COLOR_THICKNESS;

/// Default alpha for translucent terrain bands
pub const TERRAIN_TRANSPARENCY: u8 = 12;

// =============================================================================
// STRATA
// =============================================================================

/// Material a voxel represents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stratum {
    Magma,
    UnderWaterGround,
    Water,
    AboveWaterGround,
    Air,
}

impl Stratum {
    /// First colour index of this stratum's band, `None` for air
    pub fn band_min(&self) -> Option<usize> {
        match self {
            Stratum::Magma => Some(MAGMA_COLORS_MIN),
            Stratum::UnderWaterGround => Some(UNDER_WATER_GROUND_COLORS_MIN),
            Stratum::Water => Some(WATER_COLORS_MIN),
            Stratum::AboveWaterGround => Some(ABOVE_WATER_GROUND_COLORS_MIN),
            Stratum::Air => None,
        }
    }

    /// Map a depth-within-stratum onto this stratum's colour band.
    ///
    /// The offset is scaled so that `HEIGHT_TO_COLOR_DIV` height units span the
    /// whole band, then clamped so it can never leak into a neighbouring band.
    pub fn color_index(&self, depth: i32) -> u8 {
        let Some(min) = self.band_min() else {
            return AIR_COLOR_INDEX;
        };

        let scaled = (depth as f32 / HEIGHT_TO_COLOR_DIV) * LAYER_COLOR_THICKNESS as f32;
        let offset = (scaled as i32).clamp(0, LAYER_COLOR_THICKNESS as i32 - 1) as usize;
        (min + offset) as u8
    }

    /// Recover the stratum a stored colour index belongs to.
    /// Returns `None` for shaft voxels and the unused gap slots.
    pub fn from_color_index(index: u8) -> Option<Stratum> {
        let i = index as usize;
        if index == AIR_COLOR_INDEX {
            Some(Stratum::Air)
        } else if (MAGMA_COLORS_MIN..MAGMA_COLORS_MAX).contains(&i) {
            Some(Stratum::Magma)
        } else if (ABOVE_WATER_GROUND_COLORS_MIN..ABOVE_WATER_GROUND_COLORS_MAX).contains(&i) {
            Some(Stratum::AboveWaterGround)
        } else if (UNDER_WATER_GROUND_COLORS_MIN..UNDER_WATER_GROUND_COLORS_MAX).contains(&i) {
            Some(Stratum::UnderWaterGround)
        } else if (WATER_COLORS_MIN..WATER_COLORS_MAX).contains(&i) {
            Some(Stratum::Water)
        } else {
            None
        }
    }
}

/// Classify a physical height against the three layer heights of a column.
///
/// Comparison order is magma, underwater ground, water, above-water ground,
/// then air; the first match wins when a height sits exactly on a boundary.
/// Returns the stratum and the colour index stored in the volume.
pub fn classify(height: i32, magma: u8, water: u8, ground: u8) -> (Stratum, u8) {
    let magma = magma as i32;
    let water = water as i32;
    let ground = ground as i32;

    let (stratum, depth) = if height < magma {
        (Stratum::Magma, height)
    } else if height < ground && height < water {
        (Stratum::UnderWaterGround, water - height)
    } else if height < water {
        (Stratum::Water, height - magma)
    } else if height <= ground {
        (Stratum::AboveWaterGround, height - water)
    } else {
        (Stratum::Air, 0)
    };

    (stratum, stratum.color_index(depth))
}

/// True if `index` may legally appear in a finished volume
pub fn is_valid_voxel(index: u8) -> bool {
    index == AIR_COLOR_INDEX
        || index == MINE_SHAFT_COLOR_INDEX
        || Stratum::from_color_index(index).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_layout() {
        assert_eq!(MAGMA_COLORS_MAX, 60);
        assert_eq!(ABOVE_WATER_GROUND_COLORS_MIN, 61);
        assert_eq!(ABOVE_WATER_GROUND_COLORS_MAX, 121);
        assert_eq!(UNDER_WATER_GROUND_COLORS_MIN, 122);
        assert_eq!(UNDER_WATER_GROUND_COLORS_MAX, 182);
        assert_eq!(WATER_COLORS_MIN, 183);
        assert_eq!(WATER_COLORS_MAX, 243);
    }

    #[test]
    fn test_classify_order() {
        // Below magma always wins
        assert_eq!(classify(10, 50, 200, 150).0, Stratum::Magma);
        // Under both ground and water
        assert_eq!(classify(100, 50, 200, 150).0, Stratum::UnderWaterGround);
        // Above ground but below water surface
        assert_eq!(classify(170, 50, 200, 150).0, Stratum::Water);
        // Ground surface above water
        assert_eq!(classify(150, 50, 100, 150).0, Stratum::AboveWaterGround);
        assert_eq!(classify(151, 50, 100, 150).0, Stratum::Air);
    }

    #[test]
    fn test_classify_boundaries() {
        // Exactly on the magma surface falls through to the next stratum
        assert_eq!(classify(50, 50, 0, 100).0, Stratum::AboveWaterGround);
        // Exactly on the ground surface is still ground
        let (stratum, index) = classify(100, 0, 100, 100);
        assert_eq!(stratum, Stratum::AboveWaterGround);
        assert_eq!(index as usize, ABOVE_WATER_GROUND_COLORS_MIN);
    }

    #[test]
    fn test_color_index_clamps_to_band() {
        assert_eq!(Stratum::Magma.color_index(255), (MAGMA_COLORS_MAX - 1) as u8);
        assert_eq!(Stratum::Water.color_index(-5), WATER_COLORS_MIN as u8);
        assert_eq!(Stratum::Air.color_index(42), AIR_COLOR_INDEX);
        // 70 height units is half a band
        assert_eq!(Stratum::Magma.color_index(70), 30);
    }

    #[test]
    fn test_from_color_index() {
        assert_eq!(Stratum::from_color_index(0), Some(Stratum::Magma));
        assert_eq!(Stratum::from_color_index(60), None);
        assert_eq!(Stratum::from_color_index(61), Some(Stratum::AboveWaterGround));
        assert_eq!(Stratum::from_color_index(130), Some(Stratum::UnderWaterGround));
        assert_eq!(Stratum::from_color_index(242), Some(Stratum::Water));
        assert_eq!(Stratum::from_color_index(250), None);
        assert_eq!(Stratum::from_color_index(AIR_COLOR_INDEX), Some(Stratum::Air));
        assert!(is_valid_voxel(MINE_SHAFT_COLOR_INDEX));
        assert!(!is_valid_voxel(243));
    }
}
