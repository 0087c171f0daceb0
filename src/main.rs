use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info, warn};

use volumetric_terrain::color_table::{ColorTables, TableVariant, TransparencyFlags};
use volumetric_terrain::config::TerrainConfig;
use volumetric_terrain::export;
use volumetric_terrain::generation::{Progress, TerrainVolumes};
use volumetric_terrain::heightmap::HeightLayers;
use volumetric_terrain::logging::init_logging;
use volumetric_terrain::synthetic::{generate_layers, SyntheticParams};
use volumetric_terrain::view::{VolumeView, INITIAL_SLIDERS};
use volumetric_terrain::volume::{Axis, DetailLevel};
use volumetric_terrain::TerrainResult;

#[derive(Parser, Debug)]
#[command(name = "volumetric_terrain")]
#[command(about = "Build stratified voxel terrain with a mine-shaft network from height maps")]
struct Args {
    /// Directory holding the ground, water and magma height maps
    #[arg(short, long)]
    layers: Option<PathBuf>,

    /// Seed for synthetic layers when no directory is given (random if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Build medium and high detail on worker threads instead of ticking
    #[arg(long)]
    parallel: bool,

    /// Only export this detail level (low, medium, high or 128/256/512)
    #[arg(long)]
    level: Option<DetailLevel>,

    /// X slice slider (0-1023)
    #[arg(long, default_value_t = INITIAL_SLIDERS[0])]
    slice_x: usize,

    /// Y slice slider (0-1023)
    #[arg(long, default_value_t = INITIAL_SLIDERS[1])]
    slice_y: usize,

    /// Z slice slider (0-1023)
    #[arg(long, default_value_t = INITIAL_SLIDERS[2])]
    slice_z: usize,

    /// Render slices with the alternate (grey terrain) colour table
    #[arg(long)]
    alternate_table: bool,

    /// Make ground bands translucent
    #[arg(long)]
    transparent_ground: bool,

    /// Make every band opaque
    #[arg(long)]
    no_transparency: bool,

    /// Also dump raw voxel bytes per level
    #[arg(long)]
    raw: bool,

    /// Save the height layers used as PNGs (useful with synthetic layers)
    #[arg(long)]
    save_layers: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("unable to install log subscriber: {}", e);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> TerrainResult<()> {
    let config = match &args.config {
        Some(path) => TerrainConfig::load(path)?,
        None => TerrainConfig::default(),
    };

    std::fs::create_dir_all(&args.output)?;

    // Height layers
    let layers = match &args.layers {
        Some(dir) => {
            info!(dir = %dir.display(), "loading height layers");
            HeightLayers::load_dir(dir, &config.layer_files)?
        }
        None => {
            let seed = args.seed.unwrap_or_else(rand::random);
            let params = SyntheticParams::default();
            println!("Generating synthetic terrain with seed: {}", seed);
            println!("{}", params);
            generate_layers(seed, &params)
        }
    };

    if args.save_layers {
        layers.save_dir(&args.output, &config.layer_files)?;
    }

    // Volumes
    let start = Instant::now();
    let mut volumes = TerrainVolumes::new(layers, &config);
    println!("Low detail ready in {:.2}s", start.elapsed().as_secs_f32());

    if args.parallel {
        volumes.build_parallel();
    } else {
        let mut ticks = 0usize;
        let mut reported = DetailLevel::Low;
        while volumes.tick() == Progress::Continue {
            ticks += 1;
            if let Some(&level) = volumes.ready_levels().last() {
                if level != reported {
                    println!("{} ready after {} ticks", level.label(), ticks);
                    reported = level;
                }
            }
        }
    }
    println!("All detail levels ready in {:.2}s", start.elapsed().as_secs_f32());

    for &level in DetailLevel::all() {
        if let Some((x, y, z, v)) = volumes.volume(level).find_invalid() {
            warn!(%level, x, y, z, value = v, "invalid voxel value");
        }
    }

    // Colour tables
    let flags = TransparencyFlags {
        transparency_enabled: !args.no_transparency,
        ground_transparent: args.transparent_ground,
    };
    let tables = ColorTables::new(flags, config.terrain_transparency);
    export::export_color_table_json(&tables.primary, &args.output.join("color_table_primary.json"))?;
    export::export_color_table_json(&tables.alternate, &args.output.join("color_table_alternate.json"))?;
    export::export_color_table_raw(&tables.primary, &args.output.join("color_table_primary.rgba"))?;
    export::export_color_table_raw(&tables.alternate, &args.output.join("color_table_alternate.rgba"))?;
    export::export_color_table_swatch(&tables.primary, &args.output.join("color_table_primary.png"))?;
    export::export_color_table_swatch(&tables.alternate, &args.output.join("color_table_alternate.png"))?;

    // Slices and raw dumps per level
    let mut view = VolumeView::new(tables);
    view.set_variant(if args.alternate_table { TableVariant::Alternate } else { TableVariant::Primary });
    view.set_slider(Axis::X, args.slice_x);
    view.set_slider(Axis::Y, args.slice_y);
    view.set_slider(Axis::Z, args.slice_z);

    for &level in DetailLevel::all() {
        if args.level.is_some_and(|only| only != level) {
            continue;
        }
        if !view.set_level(level, &volumes) {
            continue;
        }

        let indices = [
            view.slice_index(Axis::X),
            view.slice_index(Axis::Y),
            view.slice_index(Axis::Z),
        ];
        let volume = view.volume(&volumes);
        let written = export::export_slices(volume, view.table(), indices, &args.output, &level.to_string())?;
        println!("{}: {} slices at x={} y={} z={}", level.label(), written.len(), indices[0], indices[1], indices[2]);

        if args.raw {
            export::export_volume_raw(volume, level, &args.output, &format!("volume_{}", level))?;
        }
    }

    println!("Done. Output written to {}", args.output.display());
    Ok(())
}
