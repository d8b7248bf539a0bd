use std::time::Duration;

use canopy_scatter::prelude::*;
use criterion::{Criterion, Throughput};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Rolling terrain with a lake in the lower-left corner.
#[allow(dead_code)]
pub fn synthetic_elevation(size: usize) -> Raster {
    let s = size as f32;
    Raster::from_fn(size, size, |x, y| {
        let u = x as f32 / s;
        let v = y as f32 / s;
        let hills = 0.5 + 0.25 * (u * 9.0).sin() * (v * 7.0).cos();
        let basin = ((u - 0.2).powi(2) + (v - 0.8).powi(2)).sqrt();
        (hills * basin.min(0.4) / 0.4).clamp(0.0, 1.0)
    })
}
