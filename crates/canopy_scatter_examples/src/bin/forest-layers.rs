use std::path::PathBuf;

use anyhow::Context;
use canopy_scatter::prelude::*;
use canopy_scatter_examples::{
    init_tracing, load_ecosystem, load_heightmap, render_placements_png, save_raster_png,
    temperate_ecosystem, water_mask_params,
};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "forest-layers")]
#[command(about = "Place three canopy layers of vegetation on a heightmap")]
struct Args {
    /// Grayscale heightmap PNG (8 or 16 bit)
    heightmap: PathBuf,

    /// Water map PNG (white = water); derived from the heightmap when omitted
    #[arg(short, long)]
    water: Option<PathBuf>,

    /// Pixel threshold (0-255) used when deriving water
    #[arg(short, long, default_value_t = 40)]
    threshold: u8,

    /// Apply Gaussian smoothing to a derived water map
    #[arg(short, long)]
    smooth: bool,

    /// Gaussian blur sigma used with --smooth
    #[arg(long, default_value_t = 2.0)]
    sigma: f32,

    /// Ecosystem RON file (default: bundled temperate forest)
    #[arg(short, long)]
    ecosystem: Option<PathBuf>,

    /// Run seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Base acceptance threshold
    #[arg(long, default_value_t = 0.2)]
    acceptance: f32,

    /// Candidate tile size in pixels
    #[arg(long, default_value_t = 64.0)]
    tile_size: f32,

    /// Minimum candidate distance in pixels
    #[arg(long, default_value_t = 4.0)]
    min_distance: f32,

    /// Use the exact-distance influence falloff instead of dilation
    #[arg(long)]
    exact_distance: bool,

    /// Draw a species for every candidate instead of once per tile
    #[arg(long)]
    per_point: bool,

    /// Directory for the exported PNGs
    #[arg(short, long, default_value = "target/forest-layers")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let elevation = load_heightmap(&args.heightmap)?;
    let water = match &args.water {
        Some(path) => load_heightmap(path)?,
        None => derive_water_mask(
            &elevation,
            &water_mask_params(args.threshold, args.smooth, args.sigma),
        )?,
    };
    info!(
        "Loaded {} ({}x{}).",
        args.heightmap.display(),
        elevation.width,
        elevation.height
    );

    let ecosystem = match &args.ecosystem {
        Some(path) => load_ecosystem(path)?,
        None => temperate_ecosystem()?,
    };

    let mut rasters = RasterSet::from_inputs(elevation, water);
    MapEngine::new(MapParams::default())?.generate_into(&mut rasters)?;

    let config = PlacementConfig::new(args.acceptance)
        .with_sampler(SamplerParams::new(args.tile_size, args.min_distance))
        .with_influence_mode(if args.exact_distance {
            InfluenceMode::ExactDistance
        } else {
            InfluenceMode::Dilate
        })
        .with_selection_granularity(if args.per_point {
            SelectionGranularity::PerPoint
        } else {
            SelectionGranularity::PerTile
        });

    let mut warnings = 0usize;
    let mut sink = FnSink::new(|event| {
        if let RunEvent::Warning { context, message } = event {
            warnings += 1;
            warn!("{context}: {message}");
        }
    });
    let mut rng = StdRng::seed_from_u64(args.seed);
    let result = LayerOrchestrator::new(&ecosystem, &rasters, config, &mut rng)
        .run_with_events(&mut sink)
        .context("placement run failed")?;

    for layer in &result.layers {
        if layer.skipped {
            info!("{}: skipped.", layer.layer);
            continue;
        }
        info!(
            "{}: {} placed, {} rejected, threshold {:.2}.",
            layer.layer, layer.summary.accepted, layer.summary.rejected, layer.threshold
        );
        save_raster_png(
            &layer.occupancy,
            args.out_dir.join(format!("occupancy-{}.png", layer.layer)),
        )?;
    }

    for id in [
        RasterId::Slope,
        RasterId::RelativeHeight,
        RasterId::WaterSpread,
        RasterId::Moisture,
    ] {
        if let Some(raster) = rasters.get(id) {
            save_raster_png(&raster, args.out_dir.join(format!("{id}.png")))?;
        }
    }
    save_raster_png(&result.influence, args.out_dir.join("influence.png"))?;

    let elevation = rasters.require(RasterId::Elevation, Pass::Placement)?;
    let water = rasters.require(RasterId::Water, Pass::Placement)?;
    render_placements_png(
        &result,
        &elevation,
        &water,
        args.out_dir.join("placements.png"),
    )?;

    info!(
        "{} placements from {} candidates ({} warnings); images in {}.",
        result.placement_count(),
        result.summary.evaluated,
        warnings,
        args.out_dir.display()
    );
    Ok(())
}
