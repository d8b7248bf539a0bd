//! Owned row-major scalar rasters.
//!
//! A [`Raster`] is the only buffer type in the pipeline. Passes allocate a fresh raster for
//! their output, fill it (row-parallel), and hand it over by value once complete, so no
//! reader ever observes a half-written buffer.
use glam::Vec2;
use rayon::prelude::*;

use crate::error::{Error, Result};

/// A row-major grid of `f32` values.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl Raster {
    /// Create a new raster of the given size with all values set to zero.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0.0)
    }

    /// Create a new raster of the given size with all values set to `value`.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Wrap existing row-major data. Fails if `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != width * height {
            return Err(Error::InvalidConfig(format!(
                "raster data has {} values, expected {}x{} = {}",
                data.len(),
                width,
                height,
                width * height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a raster by evaluating `f(x, y)` for every pixel, one row per task.
    pub fn from_fn<F>(width: usize, height: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> f32 + Sync + Send,
    {
        let mut raster = Self::new(width, height);
        raster.fill_with(f);
        raster
    }

    /// Overwrite every pixel with `f(x, y)`, one row per task.
    pub fn fill_with<F>(&mut self, f: F)
    where
        F: Fn(usize, usize) -> f32 + Sync + Send,
    {
        if self.data.is_empty() {
            return;
        }
        let width = self.width;
        self.data
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, value) in row.iter_mut().enumerate() {
                    *value = f(x, y);
                }
            });
    }

    /// Size as `(width, height)`.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether `other` has the same dimensions.
    pub fn same_size(&self, other: &Raster) -> bool {
        self.size() == other.size()
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Value at `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Value at signed coordinates clamped into the raster. Empty rasters read as `0.0`.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.data[cy * self.width + cx]
    }

    /// Pixel containing `p` (map-pixel coordinates), clamped into the raster.
    pub fn pixel_at(&self, p: Vec2) -> Option<(usize, usize)> {
        if self.data.is_empty() {
            return None;
        }
        let x = clamp_coord(p.x, self.width);
        let y = clamp_coord(p.y, self.height);
        Some((x, y))
    }

    /// Nearest-pixel sample at a map-pixel position, clamped into the raster.
    #[inline]
    pub fn sample(&self, p: Vec2) -> f32 {
        match self.pixel_at(p) {
            Some((x, y)) => self.data[y * self.width + x],
            None => 0.0,
        }
    }

    /// Clamp every value into `[min, max]`.
    pub fn clamp_values(&mut self, min: f32, max: f32) {
        self.data
            .par_iter_mut()
            .for_each(|v| *v = v.clamp(min, max));
    }

    /// Smallest and largest value, or `None` for an empty raster.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        if self.data.is_empty() {
            return None;
        }
        let (min, max) = self
            .data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        Some((min, max))
    }

    /// Number of pixels whose value is strictly positive.
    pub fn count_positive(&self) -> usize {
        self.data.iter().filter(|v| **v > 0.0).count()
    }
}

#[inline]
fn clamp_coord(v: f32, len: usize) -> usize {
    if !v.is_finite() || v <= 0.0 {
        return if v == f32::INFINITY { len - 1 } else { 0 };
    }
    (v.floor() as usize).min(len - 1)
}
