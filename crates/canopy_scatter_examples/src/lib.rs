#![forbid(unsafe_code)]

mod imaging;
mod setup;

pub use imaging::{
    derived_watermap_path, load_heightmap, raster_to_gray, render_placements_png,
    save_raster_png, LayerStyle,
};
pub use setup::{init_tracing, load_ecosystem, temperate_ecosystem, water_mask_params};
