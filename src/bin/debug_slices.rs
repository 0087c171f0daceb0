//! Debug tool for comparing slices visually
//! Renders a grid of X, Y and Z slices for both colour tables at every
//! detail level, composited over a checkerboard so translucency shows.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba, RgbaImage};
use volumetric_terrain::color_table::{ColorTables, TableVariant};
use volumetric_terrain::config::TerrainConfig;
use volumetric_terrain::generation::TerrainVolumes;
use volumetric_terrain::slice::render_slice;
use volumetric_terrain::synthetic::{generate_layers, SyntheticParams};
use volumetric_terrain::view::VolumeView;
use volumetric_terrain::volume::{Axis, DetailLevel};
use volumetric_terrain::TerrainResult;

const SEED: u64 = 42;
const CELL: u32 = 256;
const GAP: u32 = 4;

fn main() -> TerrainResult<()> {
    println!("Generating slice comparison grid...");

    let layers = generate_layers(SEED, &SyntheticParams::default());
    let mut volumes = TerrainVolumes::new(layers, &TerrainConfig::default());
    volumes.build_parallel();

    let mut view = VolumeView::new(ColorTables::default());
    let variants = [TableVariant::Primary, TableVariant::Alternate];

    // One row per level and table, one column per axis
    let mut rows: Vec<Vec<RgbaImage>> = Vec::new();
    for &level in DetailLevel::all() {
        view.set_level(level, &volumes);
        for &variant in &variants {
            println!("  Rendering: {} {:?}", level.label(), variant);
            view.set_variant(variant);
            let cells = Axis::all()
                .iter()
                .map(|&axis| {
                    let img = render_slice(view.volume(&volumes), view.table(), axis, view.slice_index(axis));
                    fit_cell(&img)
                })
                .collect();
            rows.push(cells);
        }
    }

    let grid = create_grid(&rows);
    grid.save("slice_comparison.png")?;

    println!("Saved slice_comparison.png");
    Ok(())
}

/// Scale a slice into a square cell (nearest neighbour, aspect kept)
/// and flatten it over a checkerboard.
fn fit_cell(img: &RgbaImage) -> RgbaImage {
    let scale = (CELL as f32 / img.width() as f32).min(CELL as f32 / img.height() as f32);
    let w = ((img.width() as f32 * scale) as u32).max(1);
    let h = ((img.height() as f32 * scale) as u32).max(1);
    let scaled = imageops::resize(img, w, h, FilterType::Nearest);

    let mut cell: RgbaImage = ImageBuffer::from_fn(CELL, CELL, |x, y| {
        if (x / 16 + y / 16) % 2 == 0 {
            Rgba([200, 200, 200, 255])
        } else {
            Rgba([150, 150, 150, 255])
        }
    });
    imageops::overlay(&mut cell, &scaled, 0, ((CELL - h) / 2) as i64);
    cell
}

fn create_grid(rows: &[Vec<RgbaImage>]) -> RgbaImage {
    let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
    let grid_width = (cols * (CELL + GAP)).max(1);
    let grid_height = (rows.len() as u32 * (CELL + GAP)).max(1);

    let mut grid: RgbaImage = ImageBuffer::from_pixel(grid_width, grid_height, Rgba([40, 40, 40, 255]));
    for (row, cells) in rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            let x = col as u32 * (CELL + GAP);
            let y = row as u32 * (CELL + GAP);
            imageops::replace(&mut grid, cell, x as i64, y as i64);
        }
    }
    grid
}
