use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::color_table::{ColorTable, Rgba};
use crate::error::TerrainResult;
use crate::slice::render_slice;
use crate::volume::{Axis, DetailLevel, VoxelVolume};

/// Export one slice of a volume as a PNG.
pub fn export_slice(
    volume: &VoxelVolume,
    table: &ColorTable,
    axis: Axis,
    index: usize,
    path: &Path,
) -> Result<(), image::ImageError> {
    let img = render_slice(volume, table, axis, index);
    img.save(path)
}

/// Export the slice through each axis at the given indices into `dir`.
/// Files are named `<prefix>_<axis>_<index>.png`.
pub fn export_slices(
    volume: &VoxelVolume,
    table: &ColorTable,
    indices: [usize; 3],
    dir: &Path,
    prefix: &str,
) -> TerrainResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (&axis, &index) in Axis::all().iter().zip(indices.iter()) {
        let name = format!("{}_{}_{}.png", prefix, axis_name(axis), index);
        let path = dir.join(name);
        export_slice(volume, table, axis, index, &path)?;
        debug!(path = %path.display(), "wrote slice");
        written.push(path);
    }
    Ok(written)
}

fn axis_name(axis: Axis) -> &'static str {
    match axis {
        Axis::X => "x",
        Axis::Y => "y",
        Axis::Z => "z",
    }
}

/// Metadata written next to a raw volume dump.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeManifest {
    pub level: DetailLevel,
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    /// Byte offset formula of voxel `(x, y, z)`
    pub layout: String,
    pub file: String,
}

impl VolumeManifest {
    pub fn new(level: DetailLevel, volume: &VoxelVolume, file: &str) -> Self {
        Self {
            level,
            width: volume.width,
            height: volume.height,
            depth: volume.depth,
            layout: "x + y*width + z*width*height".to_string(),
            file: file.to_string(),
        }
    }
}

/// Dump the voxel bytes of a volume plus a JSON manifest.
/// Writes `<stem>.raw` and `<stem>.json` into `dir`.
pub fn export_volume_raw(
    volume: &VoxelVolume,
    level: DetailLevel,
    dir: &Path,
    stem: &str,
) -> TerrainResult<PathBuf> {
    let raw_name = format!("{}.raw", stem);
    let raw_path = dir.join(&raw_name);
    fs::write(&raw_path, volume.as_bytes())?;

    let manifest = VolumeManifest::new(level, volume, &raw_name);
    let json = serde_json::to_string_pretty(&manifest)?;
    fs::write(dir.join(format!("{}.json", stem)), json)?;

    info!(%level, bytes = volume.len(), path = %raw_path.display(), "wrote volume");
    Ok(raw_path)
}

/// Write a colour table as JSON (a list of RGBA entries).
pub fn export_color_table_json(table: &ColorTable, path: &Path) -> TerrainResult<()> {
    let entries: &[Rgba] = table.entries();
    let json = serde_json::to_string_pretty(entries)?;
    fs::write(path, json)?;
    Ok(())
}

/// Write a colour table as 1024 packed RGBA bytes.
pub fn export_color_table_raw(table: &ColorTable, path: &Path) -> TerrainResult<()> {
    fs::write(path, table.as_bytes())?;
    Ok(())
}

/// Render a colour table as a 256x16 swatch strip.
pub fn export_color_table_swatch(table: &ColorTable, path: &Path) -> Result<(), image::ImageError> {
    let img = image::RgbaImage::from_fn(table.len() as u32, 16, |x, _| {
        image::Rgba(table.get(x as u8).to_array())
    });
    img.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_table::build_color_tables;
    use image::GenericImageView;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("volumetric_export_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_export_volume_raw() {
        let dir = temp_dir("raw");
        let mut volume = VoxelVolume::new(128);
        volume.set(3, 2, 1, 200);

        let path = export_volume_raw(&volume, DetailLevel::Low, &dir, "low").unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 128 * 64 * 128);
        assert_eq!(bytes[3 + 2 * 128 + 128 * 64], 200);

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("low.json")).unwrap()).unwrap();
        assert_eq!(manifest["level"], "low");
        assert_eq!(manifest["height"], 64);
        assert_eq!(manifest["file"], "low.raw");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_export_color_tables() {
        let dir = temp_dir("tables");
        let (primary, _) = build_color_tables(true, true);

        export_color_table_raw(&primary, &dir.join("primary.rgba")).unwrap();
        let bytes = fs::read(dir.join("primary.rgba")).unwrap();
        assert_eq!(bytes.len(), 1024);
        assert_eq!(&bytes[1020..], &[50, 50, 50, 255]);

        export_color_table_json(&primary, &dir.join("primary.json")).unwrap();
        let entries: Vec<Rgba> =
            serde_json::from_str(&fs::read_to_string(dir.join("primary.json")).unwrap()).unwrap();
        assert_eq!(entries.len(), 256);
        assert_eq!(entries[254], Rgba::TRANSPARENT);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_export_slices_names() {
        let dir = temp_dir("slices");
        let volume = VoxelVolume::new(128);
        let (primary, _) = build_color_tables(true, true);

        let written = export_slices(&volume, &primary, [89, 38, 89], &dir, "low").unwrap();
        assert_eq!(written.len(), 3);
        assert!(written[1].ends_with("low_y_38.png"));

        let img = image::open(&written[0]).unwrap();
        assert_eq!((img.width(), img.height()), (128, 64));

        fs::remove_dir_all(&dir).ok();
    }
}
