//! Synthetic height layers
//!
//! Stand-in terrain for runs without height-map images: a noisy mountain
//! rising out of a lake, with a magma surface undulating below. Every
//! layer is deterministic for a given seed.

use std::fmt;

use noise::{NoiseFn, Perlin, Seedable};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::heightmap::{HeightLayer, HeightLayers};
use crate::strata::LAYER_DATA_SIZE;
use crate::tilemap::Tilemap;

/// Shape parameters for synthetic terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticParams {
    /// Ground height of the plain around the mountain
    pub base_height: f32,
    /// Height the mountain peak adds above the plain
    pub mountain_height: f32,
    /// Mountain radius as a fraction of the map
    pub mountain_radius: f32,
    /// Flat water surface height
    pub water_level: u8,
    /// Mean magma surface height
    pub magma_level: f32,
    /// Amplitude of the ground noise
    pub roughness: f32,
    /// Octaves of fractal noise
    pub octaves: usize,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            base_height: 95.0,
            mountain_height: 130.0,
            mountain_radius: 0.22,
            water_level: 110,
            magma_level: 35.0,
            roughness: 18.0,
            octaves: 5,
        }
    }
}

impl fmt::Display for SyntheticParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Synthetic Terrain:")?;
        writeln!(f, "  Base height: {:.0}", self.base_height)?;
        writeln!(f, "  Mountain: +{:.0} over radius {:.2}", self.mountain_height, self.mountain_radius)?;
        writeln!(f, "  Water level: {}", self.water_level)?;
        writeln!(f, "  Magma level: {:.0}", self.magma_level)?;
        write!(f, "  Roughness: {:.1} ({} octaves)", self.roughness, self.octaves)
    }
}

/// Fractal Brownian motion over Perlin noise, roughly in [-1, 1].
fn fbm(noise: &Perlin, x: f64, y: f64, octaves: usize) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves.max(1) {
        total += noise.get([x * frequency, y * frequency]) * amplitude;
        max_value += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }

    total / max_value
}

/// Evaluate `f` for every sample, one row per rayon task.
fn layer_par(f: impl Fn(usize, usize) -> u8 + Sync) -> HeightLayer {
    let data: Vec<u8> = (0..LAYER_DATA_SIZE)
        .into_par_iter()
        .flat_map_iter(|y| (0..LAYER_DATA_SIZE).map(move |x| (x, y)))
        .map(|(x, y)| f(x, y))
        .collect();
    Tilemap::from_vec(LAYER_DATA_SIZE, LAYER_DATA_SIZE, data)
        .and_then(HeightLayer::from_tilemap)
        .unwrap_or_else(|| HeightLayer::flat(0))
}

fn to_height(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Generate ground, water and magma layers from a seed.
pub fn generate_layers(seed: u64, params: &SyntheticParams) -> HeightLayers {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let ground_noise = Perlin::new(1).set_seed(rng.gen::<u32>());
    let magma_noise = Perlin::new(1).set_seed(rng.gen::<u32>());

    // Mountain centre jittered around the middle of the map
    let peak_x: f32 = 0.5 + rng.gen_range(-0.1..0.1);
    let peak_y: f32 = 0.5 + rng.gen_range(-0.1..0.1);

    let size = LAYER_DATA_SIZE as f32;
    let radius = params.mountain_radius.max(f32::EPSILON);

    let ground = layer_par(|x, y| {
        let nx = x as f32 / size;
        let ny = y as f32 / size;
        let dist = ((nx - peak_x).powi(2) + (ny - peak_y).powi(2)).sqrt() / radius;
        let mountain = (-dist * dist).exp() * params.mountain_height;
        let noise = fbm(&ground_noise, nx as f64 * 4.0, ny as f64 * 4.0, params.octaves) as f32;
        to_height(params.base_height + mountain + noise * params.roughness)
    });

    let water = HeightLayer::flat(params.water_level);

    let magma = layer_par(|x, y| {
        let nx = x as f64 / LAYER_DATA_SIZE as f64;
        let ny = y as f64 / LAYER_DATA_SIZE as f64;
        let noise = fbm(&magma_noise, nx * 3.0, ny * 3.0, 3) as f32;
        to_height(params.magma_level + noise * params.magma_level * 0.5)
    });

    info!(seed, "generated synthetic height layers");
    HeightLayers { ground, water, magma }
}
