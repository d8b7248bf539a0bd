use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use canopy_scatter::prelude::*;
use canopy_scatter_examples::{
    derived_watermap_path, init_tracing, load_heightmap, save_raster_png, water_mask_params,
};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "water-map")]
#[command(about = "Derive water maps from grayscale heightmaps by thresholding")]
struct Args {
    /// Heightmap PNG, or a directory whose PNG heightmaps are processed in batch
    input: PathBuf,

    /// Pixel value threshold (0-255); darker pixels become water
    #[arg(short, long, default_value_t = 40)]
    threshold: u8,

    /// Output file, or output directory in batch mode
    /// (default: derived-watermaps next to the heightmap folder)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Apply Gaussian smoothing to the water map
    #[arg(short, long)]
    smooth: bool,

    /// Gaussian blur sigma for smoothing (higher = more smoothing)
    #[arg(long, default_value_t = 2.0)]
    sigma: f32,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let params = water_mask_params(args.threshold, args.smooth, args.sigma);

    if args.input.is_dir() {
        let heightmaps = png_files(&args.input)?;
        if heightmaps.is_empty() {
            bail!("no PNG files found in {}", args.input.display());
        }
        info!("Found {} heightmaps to process.", heightmaps.len());
        if args.smooth {
            info!("Smoothing enabled (sigma {}).", args.sigma);
        }
        for heightmap in &heightmaps {
            let output = match &args.output {
                Some(dir) => dir.join(heightmap.file_name().unwrap_or_default()),
                None => derived_watermap_path(heightmap),
            };
            convert(heightmap, &output, &params)?;
        }
        info!("Processed {} heightmaps.", heightmaps.len());
    } else {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| derived_watermap_path(&args.input));
        convert(&args.input, &output, &params)?;
    }
    Ok(())
}

fn convert(heightmap: &Path, output: &Path, params: &WaterMaskParams) -> anyhow::Result<()> {
    let elevation = load_heightmap(heightmap)?;
    let mask = derive_water_mask(&elevation, params)
        .with_context(|| format!("deriving water from {}", heightmap.display()))?;
    save_raster_png(&mask, output)?;

    let water_pixels = mask.data.iter().filter(|v| **v >= 0.5).count();
    info!(
        "{} -> {} ({:.1}% water).",
        heightmap.display(),
        output.display(),
        100.0 * water_pixels as f64 / mask.len().max(1) as f64
    );
    Ok(())
}

fn png_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if path.is_file() && is_png {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
