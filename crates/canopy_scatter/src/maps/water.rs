//! Water spread and water mask derivation.
use crate::config::{MapParams, WaterMaskParams};
use crate::error::{Pass, Result};
use crate::maps::{check_raster, saturate};
use crate::raster::{disc_taps, Raster};

/// Spreads water into nearby terrain.
///
/// Every water pixel within `water_spread_radius` contributes its water value with weight
/// `1 / (1 + dist * water_spread_factor)`; the pixel itself is excluded. The accumulated sum
/// is damped by `1 - relative_height`, so depressions keep more of it than ridges, added to
/// the pixel's own water value and clamped to `[0, 1]`.
pub fn water_spread(water: &Raster, relative_height: &Raster, params: &MapParams) -> Raster {
    let factor = params.water_spread_factor;
    let taps: Vec<_> = disc_taps(params.water_spread_radius as f32)
        .into_iter()
        .skip(1)
        .map(|t| (t, 1.0 / (1.0 + t.distance * factor)))
        .collect();

    Raster::from_fn(water.width, water.height, |x, y| {
        let own = water.get(x, y);
        let nearby: f32 = taps
            .iter()
            .filter_map(|(tap, weight)| {
                tap.offset_in(water, x, y)
                    .map(|(nx, ny)| water.get(nx, ny) * weight)
            })
            .sum();
        saturate(nearby * (1.0 - relative_height.get(x, y)) + own)
    })
}

/// Marks elevation strictly below `params.threshold` as water (`1.0`), optionally softened
/// by a separable Gaussian blur.
pub fn derive_water_mask(elevation: &Raster, params: &WaterMaskParams) -> Result<Raster> {
    params.validate()?;
    check_raster(elevation, Pass::WaterMask)?;

    let threshold = params.threshold;
    let mut mask = Raster::from_fn(elevation.width, elevation.height, |x, y| {
        if elevation.get(x, y) < threshold {
            1.0
        } else {
            0.0
        }
    });

    if let Some(sigma) = params.smoothing_sigma.filter(|s| *s > 0.0) {
        mask = gaussian_blur(&mask, sigma);
        mask.clamp_values(0.0, 1.0);
    }
    Ok(mask)
}

fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (3.0 * sigma).ceil() as usize;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let d = i as f32 - radius as f32;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Horizontal then vertical pass with clamped edges.
fn gaussian_blur(raster: &Raster, sigma: f32) -> Raster {
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;

    let horizontal = Raster::from_fn(raster.width, raster.height, |x, y| {
        kernel
            .iter()
            .enumerate()
            .map(|(i, k)| raster.get_clamped(x as isize + i as isize - radius, y as isize) * k)
            .sum()
    });
    Raster::from_fn(raster.width, raster.height, |x, y| {
        kernel
            .iter()
            .enumerate()
            .map(|(i, k)| {
                horizontal.get_clamped(x as isize, y as isize + i as isize - radius) * k
            })
            .sum()
    })
}
