//! Viewer state
//!
//! Everything a front end needs to present the volumes, kept as plain data
//! and changed through discrete calls: the active detail level and colour
//! table, per-axis slicing, the alpha multiplier and the zoom area.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::color_table::{ColorTable, ColorTables, TableVariant};
use crate::generation::TerrainVolumes;
use crate::slice::slice_index_from_slider;
use crate::volume::{Axis, DetailLevel, VoxelVolume};

/// Slider positions used when a view is first opened.
pub const INITIAL_SLIDERS: [usize; 3] = [715, 612, 715];

/// Alpha multiplier slider at which the multiplier is 1.
pub const NEUTRAL_ALPHA_SLIDER: u32 = 100;

/// Map the alpha slider (0..=139) to a multiplier. Below 100 it rises
/// slowly to 1; above 100 it rises linearly to 20 at 139.
pub fn alpha_multiplier(value: u32) -> f32 {
    let v = value as f32;
    if value > NEUTRAL_ALPHA_SLIDER {
        (v - 99.0) / 2.0
    } else {
        v / (500.0 - 4.0 * v)
    }
}

/// Displayed range and tick count of one axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f32,
    pub max: f32,
    pub segments: u32,
}

impl AxisRange {
    const fn new(min: f32, max: f32, segments: u32) -> Self {
        Self { min, max, segments }
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

/// Named zoom presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    #[default]
    All,
    Mine,
    Mountain,
}

impl Area {
    pub fn all() -> &'static [Self] {
        &[Area::All, Area::Mine, Area::Mountain]
    }

    /// Axis ranges `[x, y, z]` for this area.
    pub fn ranges(&self) -> [AxisRange; 3] {
        match self {
            Area::All => [
                AxisRange::new(0.0, 1000.0, 5),
                AxisRange::new(-600.0, 600.0, 6),
                AxisRange::new(0.0, 1000.0, 5),
            ],
            Area::Mine => [
                AxisRange::new(350.0, 850.0, 10),
                AxisRange::new(-500.0, 100.0, 6),
                AxisRange::new(350.0, 900.0, 11),
            ],
            Area::Mountain => [
                AxisRange::new(300.0, 600.0, 9),
                AxisRange::new(-100.0, 400.0, 5),
                AxisRange::new(300.0, 600.0, 9),
            ],
        }
    }

    pub fn range(&self, axis: Axis) -> AxisRange {
        self.ranges()[axis_slot(axis)]
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Area::All => "all",
            Area::Mine => "mine",
            Area::Mountain => "mountain",
        };
        write!(f, "{}", name)
    }
}

fn axis_slot(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
        Axis::Z => 2,
    }
}

/// Slice planes to draw for the current slicing state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SliceIndices {
    /// False when no axis is sliced and the whole volume is shown
    pub draw_slices: bool,
    pub x: Option<usize>,
    pub y: Option<usize>,
    pub z: Option<usize>,
}

impl SliceIndices {
    pub fn get(&self, axis: Axis) -> Option<usize> {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

/// Front-end state over a set of terrain volumes.
#[derive(Clone, Debug)]
pub struct VolumeView {
    level: DetailLevel,
    variant: TableVariant,
    tables: ColorTables,
    slicing: [bool; 3],
    sliders: [usize; 3],
    alpha_slider: u32,
    area: Area,
}

impl VolumeView {
    pub fn new(tables: ColorTables) -> Self {
        Self {
            level: DetailLevel::Low,
            variant: TableVariant::Primary,
            tables,
            slicing: [false; 3],
            sliders: INITIAL_SLIDERS,
            alpha_slider: NEUTRAL_ALPHA_SLIDER,
            area: Area::All,
        }
    }

    pub fn level(&self) -> DetailLevel {
        self.level
    }

    /// Switch detail level. Only ready levels can be shown; returns whether
    /// the switch happened. Slider values carry over.
    pub fn set_level(&mut self, level: DetailLevel, volumes: &TerrainVolumes) -> bool {
        if !volumes.is_ready(level) {
            warn!(%level, "detail level not ready");
            return false;
        }
        if level != self.level {
            info!(from = %self.level, to = %level, "detail level switched");
            self.level = level;
        }
        true
    }

    /// Volume backing the current detail level.
    pub fn volume<'a>(&self, volumes: &'a TerrainVolumes) -> &'a VoxelVolume {
        volumes.volume(self.level)
    }

    pub fn variant(&self) -> TableVariant {
        self.variant
    }

    pub fn set_variant(&mut self, variant: TableVariant) {
        self.variant = variant;
    }

    pub fn table(&self) -> &ColorTable {
        self.tables.table(self.variant)
    }

    pub fn tables(&self) -> &ColorTables {
        &self.tables
    }

    pub fn transparent_ground(&self) -> bool {
        self.tables.flags().ground_transparent
    }

    /// Toggle translucent ground. Both tables are updated in place.
    pub fn set_transparent_ground(&mut self, enabled: bool) {
        self.tables.set_transparent_ground(enabled);
    }

    pub fn is_slicing(&self, axis: Axis) -> bool {
        self.slicing[axis_slot(axis)]
    }

    pub fn set_slicing(&mut self, axis: Axis, enabled: bool) {
        self.slicing[axis_slot(axis)] = enabled;
    }

    pub fn slider(&self, axis: Axis) -> usize {
        self.sliders[axis_slot(axis)]
    }

    pub fn set_slider(&mut self, axis: Axis, value: usize) {
        self.sliders[axis_slot(axis)] = value;
    }

    /// Slice index for `axis` at the current detail level.
    pub fn slice_index(&self, axis: Axis) -> usize {
        let dim = match axis {
            Axis::Y => self.level.size() / 2,
            Axis::X | Axis::Z => self.level.size(),
        };
        slice_index_from_slider(self.slider(axis), dim)
    }

    /// Planes to draw. With at least one axis sliced only those axes get an
    /// index; with none, every index is reported and slices are off.
    pub fn slice_indices(&self) -> SliceIndices {
        let any = self.slicing.iter().any(|&s| s);
        let pick = |axis: Axis| {
            if !any || self.is_slicing(axis) {
                Some(self.slice_index(axis))
            } else {
                None
            }
        };
        SliceIndices {
            draw_slices: any,
            x: pick(Axis::X),
            y: pick(Axis::Y),
            z: pick(Axis::Z),
        }
    }

    pub fn alpha_slider(&self) -> u32 {
        self.alpha_slider
    }

    pub fn set_alpha_slider(&mut self, value: u32) {
        self.alpha_slider = value;
    }

    pub fn alpha_multiplier(&self) -> f32 {
        alpha_multiplier(self.alpha_slider)
    }

    pub fn area(&self) -> Area {
        self.area
    }

    pub fn set_area(&mut self, area: Area) {
        self.area = area;
    }
}

impl Default for VolumeView {
    fn default() -> Self {
        Self::new(ColorTables::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TerrainConfig;
    use crate::heightmap::HeightLayers;
    use crate::strata::{ABOVE_WATER_GROUND_COLORS_MIN, TERRAIN_TRANSPARENCY};

    #[test]
    fn test_alpha_multiplier() {
        assert_eq!(alpha_multiplier(100), 1.0);
        assert_eq!(alpha_multiplier(0), 0.0);
        assert_eq!(alpha_multiplier(50), 50.0 / 300.0);
        assert_eq!(alpha_multiplier(101), 1.0);
        assert_eq!(alpha_multiplier(139), 20.0);
    }

    #[test]
    fn test_area_ranges() {
        assert_eq!(Area::default(), Area::All);
        assert_eq!(Area::All.range(Axis::Y), AxisRange::new(-600.0, 600.0, 6));
        assert_eq!(Area::Mine.range(Axis::Z).segments, 11);
        assert_eq!(Area::Mountain.range(Axis::X).span(), 300.0);
        assert_eq!(Area::Mine.to_string(), "mine");
    }

    #[test]
    fn test_slice_indices_none_sliced() {
        let view = VolumeView::default();
        let indices = view.slice_indices();
        assert!(!indices.draw_slices);
        assert_eq!(indices.x, Some(89));
        assert_eq!(indices.y, Some(38));
        assert_eq!(indices.z, Some(89));
    }

    #[test]
    fn test_slice_indices_some_sliced() {
        let mut view = VolumeView::default();
        view.set_slicing(Axis::Y, true);
        let indices = view.slice_indices();
        assert!(indices.draw_slices);
        assert_eq!(indices.get(Axis::X), None);
        assert_eq!(indices.get(Axis::Y), Some(38));
        assert_eq!(indices.get(Axis::Z), None);

        view.set_slider(Axis::Y, 2000);
        assert_eq!(view.slice_indices().y, Some(63));
    }

    #[test]
    fn test_level_switch_requires_ready() {
        let mut volumes = TerrainVolumes::new(HeightLayers::flat(100, 80, 20), &TerrainConfig::default());
        let mut view = VolumeView::default();

        assert!(!view.set_level(DetailLevel::Medium, &volumes));
        assert_eq!(view.level(), DetailLevel::Low);

        volumes.run_to_completion();
        assert!(view.set_level(DetailLevel::High, &volumes));
        assert_eq!(view.level(), DetailLevel::High);
        assert_eq!(view.volume(&volumes).width, 512);
        // Sliders carry over, indices follow the new resolution
        assert_eq!(view.slice_index(Axis::X), 357);
        assert_eq!(view.slice_index(Axis::Y), 153);
    }

    #[test]
    fn test_table_and_transparency() {
        let mut view = VolumeView::default();
        assert_eq!(view.variant(), TableVariant::Primary);
        assert!(!view.transparent_ground());
        let ground = ABOVE_WATER_GROUND_COLORS_MIN as u8;
        assert_eq!(view.table().get(ground).a, 255);

        view.set_transparent_ground(true);
        assert!(view.transparent_ground());
        assert_eq!(view.table().get(ground).a, TERRAIN_TRANSPARENCY);

        view.set_variant(TableVariant::Alternate);
        assert_eq!(view.table().get(ground).a, TERRAIN_TRANSPARENCY);
        assert_eq!(view.table().get(255).to_array(), [255, 255, 0, 255]);
    }
}
