use std::fs;
use std::path::Path;

use anyhow::Context;
use canopy_scatter::prelude::*;
use tracing_subscriber::EnvFilter;

const TEMPERATE_RON: &str = include_str!("../assets/temperate.ron");

/// Installs a formatting subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Reads an ecosystem from a RON file and validates every species.
pub fn load_ecosystem(path: impl AsRef<Path>) -> anyhow::Result<Ecosystem> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading ecosystem {}", path.display()))?;
    parse_ecosystem(&text).with_context(|| format!("parsing ecosystem {}", path.display()))
}

/// The bundled temperate forest ecosystem.
pub fn temperate_ecosystem() -> anyhow::Result<Ecosystem> {
    parse_ecosystem(TEMPERATE_RON).context("parsing bundled temperate ecosystem")
}

/// Water-mask parameters for an 8-bit threshold; the Gaussian blur only applies when
/// `smooth` is set.
pub fn water_mask_params(threshold: u8, smooth: bool, sigma: f32) -> WaterMaskParams {
    let params = WaterMaskParams::from_pixel_threshold(threshold);
    if smooth {
        params.with_smoothing(sigma)
    } else {
        params
    }
}

fn parse_ecosystem(text: &str) -> anyhow::Result<Ecosystem> {
    let ecosystem: Ecosystem = ron::de::from_str(text)?;
    ecosystem.validate()?;
    Ok(ecosystem)
}
