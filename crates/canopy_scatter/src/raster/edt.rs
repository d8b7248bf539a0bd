//! Exact Euclidean distance transform over rasters.
//!
//! Felzenszwalb-Huttenlocher: squared distances are computed with two separable 1D passes
//! (rows, then columns), each taking the lower envelope of parabolas rooted at the sites.
use rayon::prelude::*;

use crate::raster::Raster;

/// Distance in pixels from every pixel to the nearest pixel whose value is `>= threshold`.
///
/// Sites themselves have distance `0.0`. When the raster has no site at all, every pixel
/// reports the raster diagonal, which is larger than any real distance.
pub fn distance_to_sites(raster: &Raster, threshold: f32) -> Raster {
    let (w, h) = raster.size();
    if raster.is_empty() {
        return Raster::new(w, h);
    }

    let far = (w * w + h * h) as f32;
    let mut squared: Vec<f32> = raster
        .data
        .iter()
        .map(|v| if *v >= threshold { 0.0 } else { far })
        .collect();

    squared.par_chunks_mut(w).for_each(|row| {
        let input = row.to_vec();
        lower_envelope(&input, row);
    });

    let columns: Vec<Vec<f32>> = (0..w)
        .into_par_iter()
        .map(|x| {
            let input: Vec<f32> = (0..h).map(|y| squared[y * w + x]).collect();
            let mut output = vec![0.0; h];
            lower_envelope(&input, &mut output);
            output
        })
        .collect();

    let data = (0..w * h)
        .map(|i| columns[i % w][i / w].sqrt())
        .collect::<Vec<f32>>();

    Raster {
        width: w,
        height: h,
        data,
    }
}

/// 1D squared distance transform of the sampled function `f`.
fn lower_envelope(f: &[f32], out: &mut [f32]) {
    let n = f.len();
    debug_assert_eq!(n, out.len());
    if n == 0 {
        return;
    }

    // Parabola roots and the boundaries between consecutive parabolas.
    let mut roots = vec![0usize; n];
    let mut bounds = vec![0.0f32; n + 1];
    let mut k = 0usize;
    bounds[0] = f32::NEG_INFINITY;
    bounds[1] = f32::INFINITY;

    for q in 1..n {
        let mut s = crossing(f, q, roots[k]);
        while k > 0 && s <= bounds[k] {
            k -= 1;
            s = crossing(f, q, roots[k]);
        }
        k += 1;
        roots[k] = q;
        bounds[k] = s;
        bounds[k + 1] = f32::INFINITY;
    }

    k = 0;
    for (q, slot) in out.iter_mut().enumerate() {
        while bounds[k + 1] < q as f32 {
            k += 1;
        }
        let dx = q as f32 - roots[k] as f32;
        *slot = dx * dx + f[roots[k]];
    }
}

/// Horizontal position where the parabolas rooted at `q` and `r` intersect (`q > r`).
#[inline]
fn crossing(f: &[f32], q: usize, r: usize) -> f32 {
    let qf = q as f32;
    let rf = r as f32;
    ((f[q] + qf * qf) - (f[r] + rf * rf)) / (2.0 * (qf - rf))
}
