//! Height-map layers
//!
//! Each layer is a 512x512 grid of byte heights decoded from a grayscale
//! raster. Three layers (ground, water surface, magma surface) describe the
//! whole terrain; the voxel builder downsamples them per detail level.

use std::path::Path;

use image::{DynamicImage, GenericImageView, GrayImage, ImageBuffer, Luma};
use tracing::debug;

use crate::error::{TerrainError, TerrainResult};
use crate::strata::LAYER_DATA_SIZE;
use crate::tilemap::Tilemap;

/// Default file names inside a height-map directory
pub const GROUND_LAYER_FILE: &str = "layer_ground.png";
pub const WATER_LAYER_FILE: &str = "layer_water.png";
pub const MAGMA_LAYER_FILE: &str = "layer_magma.png";

/// Immutable 512x512 grid of height samples.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightLayer {
    samples: Tilemap<u8>,
}

impl HeightLayer {
    /// A layer at constant height everywhere.
    pub fn flat(height: u8) -> Self {
        Self {
            samples: Tilemap::new_with(LAYER_DATA_SIZE, LAYER_DATA_SIZE, height),
        }
    }

    /// Build a layer by evaluating `f(x, y)` for each sample.
    pub fn from_fn(f: impl FnMut(usize, usize) -> u8) -> Self {
        Self {
            samples: Tilemap::from_fn(LAYER_DATA_SIZE, LAYER_DATA_SIZE, f),
        }
    }

    /// Wrap a grid, returning `None` unless it is exactly 512x512.
    pub fn from_tilemap(samples: Tilemap<u8>) -> Option<Self> {
        if samples.width != LAYER_DATA_SIZE || samples.height != LAYER_DATA_SIZE {
            return None;
        }
        Some(Self { samples })
    }

    /// Take the red channel of every pixel as the height sample.
    /// Returns `None` if the image is not 512x512.
    pub fn from_image(image: &DynamicImage) -> Option<Self> {
        let rgba = image.to_rgba8();
        let data = rgba.pixels().map(|p| p.0[0]).collect();
        Tilemap::from_vec(rgba.width() as usize, rgba.height() as usize, data)
            .and_then(Self::from_tilemap)
    }

    /// Decode a height-map image from disk.
    ///
    /// Unreadable files and images of the wrong size are fatal; a build
    /// never proceeds with a partially defined layer.
    pub fn load(path: &Path) -> TerrainResult<Self> {
        let image = image::open(path).map_err(|source| TerrainError::Image {
            path: path.to_path_buf(),
            source,
        })?;

        if image.width() as usize != LAYER_DATA_SIZE || image.height() as usize != LAYER_DATA_SIZE {
            return Err(TerrainError::LayerSize {
                path: path.to_path_buf(),
                width: image.width(),
                height: image.height(),
                expected: LAYER_DATA_SIZE,
            });
        }

        debug!(path = %path.display(), "decoded height layer");
        Self::from_image(&image).ok_or_else(|| TerrainError::LayerSize {
            path: path.to_path_buf(),
            width: image.width(),
            height: image.height(),
            expected: LAYER_DATA_SIZE,
        })
    }

    /// Height sample at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        *self.samples.get(x, y)
    }

    pub fn samples(&self) -> &Tilemap<u8> {
        &self.samples
    }

    /// Write the layer back out as an 8-bit grayscale image.
    pub fn save(&self, path: &Path) -> Result<(), image::ImageError> {
        let size = LAYER_DATA_SIZE as u32;
        let img: GrayImage = ImageBuffer::from_fn(size, size, |x, y| {
            Luma([self.get(x as usize, y as usize)])
        });
        img.save(path)
    }
}

/// The three layers that together describe the terrain.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightLayers {
    pub ground: HeightLayer,
    pub water: HeightLayer,
    pub magma: HeightLayer,
}

/// File names of the three layers inside a height-map directory.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayerFiles {
    pub ground: String,
    pub water: String,
    pub magma: String,
}

impl Default for LayerFiles {
    fn default() -> Self {
        Self {
            ground: GROUND_LAYER_FILE.to_string(),
            water: WATER_LAYER_FILE.to_string(),
            magma: MAGMA_LAYER_FILE.to_string(),
        }
    }
}

impl HeightLayers {
    /// Load all three layers from `dir`. The first failure aborts the load.
    pub fn load_dir(dir: &Path, files: &LayerFiles) -> TerrainResult<Self> {
        Ok(Self {
            ground: HeightLayer::load(&dir.join(&files.ground))?,
            water: HeightLayer::load(&dir.join(&files.water))?,
            magma: HeightLayer::load(&dir.join(&files.magma))?,
        })
    }

    /// Flat layers at fixed heights.
    pub fn flat(ground: u8, water: u8, magma: u8) -> Self {
        Self {
            ground: HeightLayer::flat(ground),
            water: HeightLayer::flat(water),
            magma: HeightLayer::flat(magma),
        }
    }

    /// `(magma, water, ground)` heights of one source sample.
    pub fn column(&self, x: usize, y: usize) -> (u8, u8, u8) {
        (self.magma.get(x, y), self.water.get(x, y), self.ground.get(x, y))
    }

    /// Save all three layers into `dir` using the given file names.
    pub fn save_dir(&self, dir: &Path, files: &LayerFiles) -> Result<(), image::ImageError> {
        self.ground.save(&dir.join(&files.ground))?;
        self.water.save(&dir.join(&files.water))?;
        self.magma.save(&dir.join(&files.magma))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_from_image_uses_red_channel() {
        let size = LAYER_DATA_SIZE as u32;
        let img = RgbImage::from_fn(size, size, |x, _| image::Rgb([(x % 256) as u8, 7, 9]));
        let layer = HeightLayer::from_image(&DynamicImage::ImageRgb8(img)).unwrap();
        assert_eq!(layer.get(0, 0), 0);
        assert_eq!(layer.get(200, 3), 200);
        assert_eq!(layer.get(300, 511), 44);
    }

    #[test]
    fn test_from_image_rejects_wrong_size() {
        let img = GrayImage::new(256, 256);
        assert!(HeightLayer::from_image(&DynamicImage::ImageLuma8(img)).is_none());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let err = HeightLayer::load(Path::new("/nonexistent/layer_ground.png")).unwrap_err();
        assert!(matches!(err, TerrainError::Image { .. }));
    }

    #[test]
    fn test_save_and_load_dir() {
        let dir = std::env::temp_dir().join(format!("volumetric_layers_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let layers = HeightLayers {
            ground: HeightLayer::from_fn(|x, y| ((x + y) % 256) as u8),
            water: HeightLayer::flat(90),
            magma: HeightLayer::flat(20),
        };
        let files = LayerFiles::default();
        layers.save_dir(&dir, &files).unwrap();

        let loaded = HeightLayers::load_dir(&dir, &files).unwrap();
        assert_eq!(loaded, layers);
        assert_eq!(loaded.column(10, 5), (20, 90, 15));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_wrong_size_is_error() {
        let path = std::env::temp_dir().join(format!("volumetric_small_{}.png", std::process::id()));
        GrayImage::new(64, 64).save(&path).unwrap();
        let err = HeightLayer::load(&path).unwrap_err();
        assert!(matches!(err, TerrainError::LayerSize { width: 64, height: 64, .. }));
        std::fs::remove_file(&path).ok();
    }
}
