use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use canopy_scatter::prelude::*;
use image::{ColorType, GrayImage, Luma, Rgb, RgbImage};

/// Loads a grayscale heightmap as a normalized raster.
///
/// 8-bit images map `0..=255` to `[0, 1]`. 16-bit images are normalized by their largest
/// value, so the highest point always reads `1.0`. Color images are converted to luma first.
pub fn load_heightmap(path: impl AsRef<Path>) -> anyhow::Result<Raster> {
    let path = path.as_ref();
    let img = image::open(path).with_context(|| format!("opening {}", path.display()))?;
    let (width, height) = (img.width() as usize, img.height() as usize);

    let data: Vec<f32> = match img.color() {
        ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => {
            let pixels = img.to_luma16().into_raw();
            let max = pixels.iter().copied().max().unwrap_or(0);
            if max == 0 {
                vec![0.0; pixels.len()]
            } else {
                pixels.iter().map(|v| *v as f32 / max as f32).collect()
            }
        }
        _ => img
            .to_luma8()
            .into_raw()
            .into_iter()
            .map(|v| v as f32 / 255.0)
            .collect(),
    };
    Ok(Raster::from_vec(width, height, data)?)
}

/// 8-bit grayscale image of a `[0, 1]` raster.
pub fn raster_to_gray(raster: &Raster) -> GrayImage {
    GrayImage::from_fn(raster.width as u32, raster.height as u32, |x, y| {
        Luma([to_byte(raster.get(x as usize, y as usize))])
    })
}

/// Writes a `[0, 1]` raster as an 8-bit grayscale PNG, creating parent directories.
pub fn save_raster_png(raster: &Raster, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    raster_to_gray(raster)
        .save(path)
        .with_context(|| format!("writing {}", path.display()))
}

/// `<heightmap dir>/../derived-watermaps/<file name>`.
pub fn derived_watermap_path(heightmap: &Path) -> PathBuf {
    let parent = heightmap.parent().unwrap_or_else(|| Path::new("."));
    let root = parent.parent().unwrap_or(parent);
    let name = heightmap.file_name().unwrap_or_default();
    root.join("derived-watermaps").join(name)
}

/// How placements of one layer are drawn.
#[derive(Clone, Copy, Debug)]
pub struct LayerStyle {
    pub color: [u8; 3],
    /// Disc radius in pixels.
    pub radius: i32,
}

impl LayerStyle {
    pub fn for_layer(layer: CanopyLayer) -> Self {
        match layer {
            CanopyLayer::L1 => Self {
                color: [24, 82, 36],
                radius: 3,
            },
            CanopyLayer::L2 => Self {
                color: [74, 140, 58],
                radius: 2,
            },
            CanopyLayer::L3 => Self {
                color: [178, 196, 84],
                radius: 1,
            },
        }
    }
}

/// Draws every placement over the shaded elevation, water tinted blue, and writes a PNG.
pub fn render_placements_png(
    result: &RunResult,
    elevation: &Raster,
    water: &Raster,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut img = RgbImage::from_fn(elevation.width as u32, elevation.height as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let shade = 0.35 + 0.5 * elevation.get(x, y);
        let wet = water.get(x, y).clamp(0.0, 1.0);
        let land = [shade * 0.92, shade * 0.88, shade * 0.78];
        let lake = [0.18, 0.34, 0.62];
        Rgb(std::array::from_fn(|i| {
            to_byte(land[i] * (1.0 - wet) + lake[i] * wet)
        }))
    });

    // Lower layers first so the canopy stays on top.
    for layer in result.layers.iter().rev() {
        let style = LayerStyle::for_layer(layer.layer);
        for placement in &layer.placements {
            draw_disc(&mut img, placement.position.x, placement.position.y, style);
        }
    }

    ensure_parent(path)?;
    img.save(path)
        .with_context(|| format!("writing {}", path.display()))
}

fn draw_disc(img: &mut RgbImage, cx: f32, cy: f32, style: LayerStyle) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    let (cx, cy) = (cx.floor() as i32, cy.floor() as i32);
    let r2 = style.radius * style.radius;
    for dy in -style.radius..=style.radius {
        for dx in -style.radius..=style.radius {
            let (x, y) = (cx + dx, cy + dy);
            if dx * dx + dy * dy > r2 || x < 0 || y < 0 || x >= w || y >= h {
                continue;
            }
            img.put_pixel(x as u32, y as u32, Rgb(style.color));
        }
    }
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    Ok(())
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
