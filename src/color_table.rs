//! Colour tables for indexed voxel rendering
//!
//! Two tables share the band layout from [`crate::strata`]:
//! - the primary table colours every stratum naturally
//! - the alternate table greys out the ground so magma, water and the
//!   (yellow) shafts stand out

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::strata::{
    ABOVE_WATER_GROUND_COLORS_MAX, ABOVE_WATER_GROUND_COLORS_MIN, AIR_COLOR_INDEX, COLOR_TABLE_SIZE, MAGMA_COLORS_MAX,
    MINE_SHAFT_COLOR_INDEX, TERRAIN_TRANSPARENCY, UNDER_WATER_GROUND_COLORS_MAX, WATER_COLORS_MAX,
};

/// One colour table entry, laid out as four bytes so a table can be handed
/// to a renderer without conversion.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn gray(value: u8, a: u8) -> Self {
        Self::new(value, value, value, a)
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Which of the two tables is in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableVariant {
    #[default]
    Primary,
    Alternate,
}

/// A 256-entry colour lookup table indexed by voxel value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorTable {
    entries: Vec<Rgba>,
}

impl std::fmt::Debug for ColorTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorTable").field("len", &self.entries.len()).finish()
    }
}

impl ColorTable {
    fn transparent() -> Self {
        Self {
            entries: vec![Rgba::TRANSPARENT; COLOR_TABLE_SIZE],
        }
    }

    /// Table with `f(i)` at every index.
    pub fn from_fn(f: impl FnMut(u8) -> Rgba) -> Self {
        Self {
            entries: (0..=u8::MAX).map(f).collect(),
        }
    }

    pub fn get(&self, index: u8) -> Rgba {
        self.entries[index as usize]
    }

    pub fn entries(&self) -> &[Rgba] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries as packed RGBA bytes (1024 bytes).
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.entries)
    }
}

/// Translucency switches the tables are built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransparencyFlags {
    /// Master switch: when off every terrain band is opaque
    pub transparency_enabled: bool,
    /// Ground bands translucent (only honoured while transparency is enabled)
    pub ground_transparent: bool,
}

impl Default for TransparencyFlags {
    fn default() -> Self {
        Self {
            transparency_enabled: true,
            ground_transparent: false,
        }
    }
}

impl TransparencyFlags {
    fn ground_alpha(&self, translucent: u8) -> u8 {
        if self.transparency_enabled && self.ground_transparent { translucent } else { 255 }
    }

    fn water_alpha(&self, translucent: u8) -> u8 {
        if self.transparency_enabled { translucent } else { 255 }
    }
}

/// Ground entries whose alpha follows the transparent-ground toggle.
fn is_ground_index(i: usize) -> bool {
    (ABOVE_WATER_GROUND_COLORS_MIN..UNDER_WATER_GROUND_COLORS_MAX).contains(&i)
}

/// Grey ramp for the alternate table: bright above water, dark below.
/// Wraps through 256 at the water line.
fn ground_gray(i: usize) -> u8 {
    (2 * i as i32 - 2 * ABOVE_WATER_GROUND_COLORS_MAX as i32).rem_euclid(256) as u8
}

/// Build the primary and alternate tables for the given flags.
pub fn build_color_tables(transparency_enabled: bool, ground_transparent: bool) -> (ColorTable, ColorTable) {
    build_color_tables_with(
        TransparencyFlags { transparency_enabled, ground_transparent },
        TERRAIN_TRANSPARENCY,
    )
}

/// Build both tables with an explicit translucent alpha value.
pub fn build_color_tables_with(flags: TransparencyFlags, translucent: u8) -> (ColorTable, ColorTable) {
    let mut primary = ColorTable::transparent();
    let mut alternate = ColorTable::transparent();

    let ground_alpha = flags.ground_alpha(translucent);
    let water_alpha = flags.water_alpha(translucent);

    for i in 0..COLOR_TABLE_SIZE - 2 {
        let (color1, color2) = if i < MAGMA_COLORS_MAX {
            // Magma: dark red at the bottom brightening upwards
            let magma = Rgba::new((130 - i * 2) as u8, 0, 0, 255);
            (magma, magma)
        } else if i < ABOVE_WATER_GROUND_COLORS_MAX {
            let o = i - MAGMA_COLORS_MAX;
            // The spacer entry below the band ignores the ground toggle
            let alpha = if is_ground_index(i) { ground_alpha } else { water_alpha };
            (
                Rgba::new((o * 4) as u8, (o * 2 + 120) as u8, (o * 5).min(255) as u8, alpha),
                Rgba::gray(ground_gray(i), alpha),
            )
        } else if i < UNDER_WATER_GROUND_COLORS_MAX {
            let o = i - ABOVE_WATER_GROUND_COLORS_MAX;
            (
                Rgba::new((144 - o) as u8, (168 - o * 2) as u8, (124 - o) as u8, ground_alpha),
                Rgba::gray(ground_gray(i), ground_alpha),
            )
        } else if i < WATER_COLORS_MAX {
            let water = Rgba::new(0, 0, ((i - UNDER_WATER_GROUND_COLORS_MAX) * 2 + 120) as u8, water_alpha);
            (water, water)
        } else {
            // Not used
            (Rgba::TRANSPARENT, Rgba::TRANSPARENT)
        };

        primary.entries[i] = color1;
        alternate.entries[i] = color2;
    }

    primary.entries[AIR_COLOR_INDEX as usize] = Rgba::TRANSPARENT;
    primary.entries[MINE_SHAFT_COLOR_INDEX as usize] = Rgba::new(50, 50, 50, 255);

    alternate.entries[AIR_COLOR_INDEX as usize] = Rgba::TRANSPARENT;
    alternate.entries[MINE_SHAFT_COLOR_INDEX as usize] = Rgba::new(255, 255, 0, 255);

    (primary, alternate)
}

/// The pair of tables plus the flags they were built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorTables {
    pub primary: ColorTable,
    pub alternate: ColorTable,
    flags: TransparencyFlags,
    translucent: u8,
}

impl ColorTables {
    pub fn new(flags: TransparencyFlags, translucent: u8) -> Self {
        let (primary, alternate) = build_color_tables_with(flags, translucent);
        Self { primary, alternate, flags, translucent }
    }

    pub fn flags(&self) -> TransparencyFlags {
        self.flags
    }

    pub fn table(&self, variant: TableVariant) -> &ColorTable {
        match variant {
            TableVariant::Primary => &self.primary,
            TableVariant::Alternate => &self.alternate,
        }
    }

    /// Toggle ground translucency in place, touching only ground alphas.
    pub fn set_transparent_ground(&mut self, enabled: bool) {
        self.flags.ground_transparent = enabled;
        let alpha = self.flags.ground_alpha(self.translucent);
        for table in [&mut self.primary, &mut self.alternate] {
            for (i, entry) in table.entries.iter_mut().enumerate() {
                if is_ground_index(i) {
                    *entry = entry.with_alpha(alpha);
                }
            }
        }
    }
}

impl Default for ColorTables {
    fn default() -> Self {
        Self::new(TransparencyFlags::default(), TERRAIN_TRANSPARENCY)
    }
}
