//! Resumable volume generation
//!
//! Each detail level moves through `Unbuilt -> Building -> Ready`. Progress
//! lives in a small [`VolumeGenerationState`] value; [`advance`] does one
//! bounded unit of work and hands back the updated state, so any scheduler
//! (a zero-delay timer, a loop, a worker thread) can drive it.
//!
//! Ordering within a level is fixed: every slab is rasterized before any
//! tunnel is carved. Partially built volumes are valid to read.

use tracing::{debug, info};

use crate::builder::build_slab;
use crate::config::{StepBudget, TerrainConfig};
use crate::heightmap::HeightLayers;
use crate::shafts::{carve_segments_with_diameter, TunnelSegment, MINE_SHAFTS};
use crate::volume::{DetailLevel, VoxelVolume};

/// Build phase of one detail level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Unbuilt,
    Building { slab_cursor: usize, shaft_cursor: usize },
    Ready,
}

/// Outcome of a single generation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    Continue,
    Done,
}

/// Cursors for one detail level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VolumeGenerationState {
    pub level: DetailLevel,
    /// Next z-slab to rasterize
    pub slab_cursor: usize,
    /// Next tunnel segment to carve
    pub shaft_cursor: usize,
    /// Number of tunnel segments in the network
    pub shaft_total: usize,
}

impl VolumeGenerationState {
    pub fn new(level: DetailLevel, shaft_total: usize) -> Self {
        Self { level, slab_cursor: 0, shaft_cursor: 0, shaft_total }
    }

    pub fn phase(&self) -> Phase {
        if self.is_ready() {
            Phase::Ready
        } else if self.slab_cursor == 0 && self.shaft_cursor == 0 {
            Phase::Unbuilt
        } else {
            Phase::Building { slab_cursor: self.slab_cursor, shaft_cursor: self.shaft_cursor }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.slab_cursor >= self.level.size() && self.shaft_cursor >= self.shaft_total
    }

    /// Fraction of work done, counting slabs and segments as equal units.
    pub fn fraction_done(&self) -> f32 {
        let total = self.level.size() + self.shaft_total;
        let done = self.slab_cursor.min(self.level.size()) + self.shaft_cursor.min(self.shaft_total);
        done as f32 / total as f32
    }
}

/// Shared read-only inputs of a build.
#[derive(Clone, Copy, Debug)]
pub struct BuildInputs<'a> {
    pub layers: &'a HeightLayers,
    pub segments: &'a [TunnelSegment],
    pub shaft_diameter: usize,
}

/// Perform one bounded step of work on `volume`.
///
/// A step either rasterizes up to `budget.slabs` slabs or, once all slabs
/// are done, carves up to `budget.segments` tunnels. Advancing a ready
/// state writes nothing and returns `Done`.
pub fn advance(
    state: VolumeGenerationState,
    budget: StepBudget,
    inputs: BuildInputs<'_>,
    volume: &mut VoxelVolume,
) -> (VolumeGenerationState, Progress) {
    let mut next = state;
    let size = state.level.size();
    debug_assert_eq!(volume.width, size);

    if next.slab_cursor < size {
        next.slab_cursor = build_slab(inputs.layers, next.slab_cursor, budget.slabs, volume);
    } else if next.shaft_cursor < next.shaft_total {
        next.shaft_cursor = carve_segments_with_diameter(
            inputs.segments,
            next.shaft_cursor,
            budget.segments,
            inputs.shaft_diameter,
            volume,
        );
    }

    let progress = if next.is_ready() { Progress::Done } else { Progress::Continue };
    (next, progress)
}

/// Iterator over the states of an in-progress build. Each `next` performs
/// one step; the final item is the ready state.
pub struct VolumeBuild<'a> {
    state: VolumeGenerationState,
    budget: StepBudget,
    inputs: BuildInputs<'a>,
    volume: &'a mut VoxelVolume,
    finished: bool,
}

impl<'a> VolumeBuild<'a> {
    pub fn new(
        state: VolumeGenerationState,
        budget: StepBudget,
        inputs: BuildInputs<'a>,
        volume: &'a mut VoxelVolume,
    ) -> Self {
        let finished = state.is_ready();
        Self { state, budget, inputs, volume, finished }
    }

    pub fn state(&self) -> VolumeGenerationState {
        self.state
    }
}

impl Iterator for VolumeBuild<'_> {
    type Item = VolumeGenerationState;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let (state, progress) = advance(self.state, self.budget, self.inputs, self.volume);
        self.state = state;
        self.finished = progress == Progress::Done;
        Some(state)
    }
}

/// One detail level's volume and its build progress.
#[derive(Clone, Debug)]
pub struct LevelSlot {
    pub volume: VoxelVolume,
    pub state: VolumeGenerationState,
    budget: StepBudget,
}

impl LevelSlot {
    fn new(level: DetailLevel, budget: StepBudget, shaft_total: usize) -> Self {
        Self {
            volume: VoxelVolume::for_level(level),
            state: VolumeGenerationState::new(level, shaft_total),
            budget,
        }
    }

    fn step(&mut self, inputs: BuildInputs<'_>) -> Progress {
        let (state, progress) = advance(self.state, self.budget, inputs, &mut self.volume);
        self.state = state;
        progress
    }

    /// Run this level to completion, returning the number of steps taken.
    fn finish(&mut self, inputs: BuildInputs<'_>) -> usize {
        let build = VolumeBuild::new(self.state, self.budget, inputs, &mut self.volume);
        let mut steps = 0;
        let mut last = None;
        for state in build {
            steps += 1;
            last = Some(state);
        }
        if let Some(state) = last {
            self.state = state;
        }
        steps
    }
}

/// All three detail levels over one set of height layers.
///
/// Low detail is built synchronously on construction. Medium, then high,
/// are built incrementally by [`TerrainVolumes::tick`].
pub struct TerrainVolumes {
    layers: HeightLayers,
    segments: Vec<TunnelSegment>,
    shaft_diameter: usize,
    low: LevelSlot,
    medium: LevelSlot,
    high: LevelSlot,
}

impl TerrainVolumes {
    /// Set up all levels with the stock tunnel network.
    pub fn new(layers: HeightLayers, config: &TerrainConfig) -> Self {
        Self::with_segments(layers, MINE_SHAFTS.to_vec(), config)
    }

    pub fn with_segments(layers: HeightLayers, segments: Vec<TunnelSegment>, config: &TerrainConfig) -> Self {
        let total = segments.len();
        let mut volumes = Self {
            layers,
            segments,
            shaft_diameter: config.shaft_diameter,
            low: LevelSlot::new(DetailLevel::Low, config.budget(DetailLevel::Low), total),
            medium: LevelSlot::new(DetailLevel::Medium, config.budget(DetailLevel::Medium), total),
            high: LevelSlot::new(DetailLevel::High, config.budget(DetailLevel::High), total),
        };

        let inputs = BuildInputs {
            layers: &volumes.layers,
            segments: &volumes.segments,
            shaft_diameter: volumes.shaft_diameter,
        };
        volumes.low.finish(inputs);
        info!(level = %DetailLevel::Low, "volume ready");

        volumes
    }

    pub fn slot(&self, level: DetailLevel) -> &LevelSlot {
        match level {
            DetailLevel::Low => &self.low,
            DetailLevel::Medium => &self.medium,
            DetailLevel::High => &self.high,
        }
    }

    pub fn volume(&self, level: DetailLevel) -> &VoxelVolume {
        &self.slot(level).volume
    }

    pub fn state(&self, level: DetailLevel) -> VolumeGenerationState {
        self.slot(level).state
    }

    pub fn is_ready(&self, level: DetailLevel) -> bool {
        self.state(level).is_ready()
    }

    /// Levels that can be displayed.
    pub fn ready_levels(&self) -> Vec<DetailLevel> {
        DetailLevel::all().iter().copied().filter(|&l| self.is_ready(l)).collect()
    }

    /// One cooperative scheduler tick: a bounded step on the first level
    /// that is not ready yet, medium before high. Returns `Done` once every
    /// level is ready.
    pub fn tick(&mut self) -> Progress {
        let inputs = BuildInputs {
            layers: &self.layers,
            segments: &self.segments,
            shaft_diameter: self.shaft_diameter,
        };

        for slot in [&mut self.medium, &mut self.high] {
            if slot.state.is_ready() {
                continue;
            }
            let progress = slot.step(inputs);
            debug!(
                level = %slot.state.level,
                slab = slot.state.slab_cursor,
                shaft = slot.state.shaft_cursor,
                "generation tick"
            );
            if progress == Progress::Done {
                info!(level = %slot.state.level, "volume ready");
            }
            break;
        }

        if self.medium.state.is_ready() && self.high.state.is_ready() {
            Progress::Done
        } else {
            Progress::Continue
        }
    }

    /// Tick until every level is ready. Returns the number of ticks.
    pub fn run_to_completion(&mut self) -> usize {
        let mut ticks = 0;
        while self.tick() == Progress::Continue {
            ticks += 1;
        }
        ticks + 1
    }

    /// Build medium and high detail concurrently on the rayon pool. Levels
    /// share only the immutable layers, so each owns its volume outright.
    pub fn build_parallel(&mut self) {
        let inputs = BuildInputs {
            layers: &self.layers,
            segments: &self.segments,
            shaft_diameter: self.shaft_diameter,
        };
        let (medium, high) = (&mut self.medium, &mut self.high);
        let (medium_steps, high_steps) = rayon::join(|| medium.finish(inputs), || high.finish(inputs));
        info!(medium_steps, high_steps, "parallel build finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightmap::HeightLayer;
    use crate::strata::{is_valid_voxel, AIR_COLOR_INDEX, MINE_SHAFT_COLOR_INDEX};

    fn layers() -> HeightLayers {
        HeightLayers {
            ground: HeightLayer::from_fn(|x, y| (120 + (x + y) % 100) as u8),
            water: HeightLayer::flat(110),
            magma: HeightLayer::from_fn(|x, _| (20 + x % 30) as u8),
        }
    }

    fn inputs(layers: &HeightLayers) -> BuildInputs<'_> {
        BuildInputs { layers, segments: &MINE_SHAFTS, shaft_diameter: 1 }
    }

    #[test]
    fn test_phases() {
        let layers = layers();
        let mut volume = VoxelVolume::for_level(DetailLevel::Low);
        let state = VolumeGenerationState::new(DetailLevel::Low, MINE_SHAFTS.len());
        assert_eq!(state.phase(), Phase::Unbuilt);

        let (state, progress) = advance(state, StepBudget::new(10, 1), inputs(&layers), &mut volume);
        assert_eq!(progress, Progress::Continue);
        assert_eq!(state.phase(), Phase::Building { slab_cursor: 10, shaft_cursor: 0 });

        let (state, _) = advance(state, StepBudget::new(1000, 1), inputs(&layers), &mut volume);
        assert_eq!(state.slab_cursor, 128);
        assert_eq!(state.shaft_cursor, 0);

        // Carving starts only after every slab is done
        let (state, _) = advance(state, StepBudget::new(1000, 5), inputs(&layers), &mut volume);
        assert_eq!(state.shaft_cursor, 5);

        let (state, progress) = advance(state, StepBudget::new(1, 100), inputs(&layers), &mut volume);
        assert_eq!(progress, Progress::Done);
        assert_eq!(state.phase(), Phase::Ready);
        assert_eq!(state.fraction_done(), 1.0);
    }

    #[test]
    fn test_ready_is_terminal() {
        let layers = layers();
        let mut volume = VoxelVolume::for_level(DetailLevel::Low);
        let state = VolumeGenerationState::new(DetailLevel::Low, MINE_SHAFTS.len());
        let done: Vec<_> = VolumeBuild::new(state, StepBudget::UNBOUNDED, inputs(&layers), &mut volume).collect();
        let ready = *done.last().unwrap();
        assert!(ready.is_ready());

        let snapshot = volume.clone();
        let (again, progress) = advance(ready, StepBudget::UNBOUNDED, inputs(&layers), &mut volume);
        assert_eq!(again, ready);
        assert_eq!(progress, Progress::Done);
        assert!(snapshot == volume);

        let empty: Vec<_> = VolumeBuild::new(ready, StepBudget::UNBOUNDED, inputs(&layers), &mut volume).collect();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_step_size_does_not_change_result() {
        let layers = layers();
        let state = VolumeGenerationState::new(DetailLevel::Low, MINE_SHAFTS.len());

        let mut coarse = VoxelVolume::for_level(DetailLevel::Low);
        let coarse_steps = VolumeBuild::new(state, StepBudget::UNBOUNDED, inputs(&layers), &mut coarse).count();
        assert_eq!(coarse_steps, 2);

        let mut fine = VoxelVolume::for_level(DetailLevel::Low);
        let fine_steps = VolumeBuild::new(state, StepBudget::new(1, 1), inputs(&layers), &mut fine).count();
        assert_eq!(fine_steps, 128 + MINE_SHAFTS.len());

        assert!(coarse == fine);
        assert!(fine.as_bytes().iter().all(|&v| is_valid_voxel(v)));
        assert!(fine.count(MINE_SHAFT_COLOR_INDEX) > 0);
        assert!(fine.count(AIR_COLOR_INDEX) > 0);
    }

    #[test]
    fn test_terrain_volumes_tick_order() {
        let config = TerrainConfig { medium_slabs_per_tick: 64, high_slabs_per_tick: 128, ..TerrainConfig::default() };
        let mut volumes = TerrainVolumes::new(layers(), &config);
        assert!(volumes.is_ready(DetailLevel::Low));
        assert_eq!(volumes.state(DetailLevel::Medium).phase(), Phase::Unbuilt);
        assert_eq!(volumes.ready_levels(), vec![DetailLevel::Low]);

        volumes.tick();
        assert_eq!(volumes.state(DetailLevel::Medium).slab_cursor, 64);
        assert_eq!(volumes.state(DetailLevel::High).phase(), Phase::Unbuilt);

        // 4 slab ticks + 34 segment ticks finish medium
        for _ in 0..(3 + MINE_SHAFTS.len()) {
            volumes.tick();
        }
        assert!(volumes.is_ready(DetailLevel::Medium));
        assert_eq!(volumes.state(DetailLevel::High).phase(), Phase::Unbuilt);

        volumes.tick();
        assert_eq!(volumes.state(DetailLevel::High).slab_cursor, 128);

        volumes.run_to_completion();
        assert_eq!(volumes.ready_levels().len(), 3);
        assert_eq!(volumes.tick(), Progress::Done);
    }

    #[test]
    fn test_parallel_matches_ticks() {
        let config = TerrainConfig { medium_slabs_per_tick: 32, high_slabs_per_tick: 64, ..TerrainConfig::default() };
        let mut ticked = TerrainVolumes::new(layers(), &config);
        ticked.run_to_completion();

        let mut parallel = TerrainVolumes::new(layers(), &config);
        parallel.build_parallel();

        for &level in DetailLevel::all() {
            assert!(parallel.is_ready(level));
            assert!(parallel.volume(level) == ticked.volume(level));
            assert_eq!(ticked.volume(level).find_invalid(), None);
            assert!(ticked.volume(level).count(MINE_SHAFT_COLOR_INDEX) > 0);
        }
    }
}
