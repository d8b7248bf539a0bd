//! Weighted species selection within a canopy layer.
//!
//! [`select_species`] draws proportionally to each species' predominance. Weights need not
//! be normalized. When every weight is zero (or negative) the draw falls back to a uniform
//! pick, so only an empty layer yields `None`.
use rand::RngCore;

use crate::ecosystem::Species;
use crate::sampling::rand01;

pub fn select_species<'a>(species: &'a [Species], rng: &mut dyn RngCore) -> Option<&'a Species> {
    if species.is_empty() {
        return None;
    }

    let weight = |s: &Species| {
        if s.predominance.is_finite() {
            s.predominance.max(0.0)
        } else {
            0.0
        }
    };
    let total: f32 = species.iter().map(weight).sum();
    if total <= 0.0 {
        let idx = ((rand01(rng) * species.len() as f32) as usize).min(species.len() - 1);
        return species.get(idx);
    }

    let mut roll = rand01(rng) * total;
    for s in species {
        let w = weight(s);
        if w <= 0.0 {
            continue;
        }
        if roll < w {
            return Some(s);
        }
        roll -= w;
    }

    species.iter().rev().find(|s| weight(s) > 0.0)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    struct FixedRng {
        value: u32,
    }

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.value
        }

        fn next_u64(&mut self) -> u64 {
            self.value as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 4];
            }
        }
    }

    fn layer(weights: &[f32]) -> Vec<Species> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| Species::new(format!("s{i}"), *w))
            .collect()
    }

    #[test]
    fn weighted_pick_follows_roll() {
        let species = layer(&[0.7, 0.3]);

        let mut low = FixedRng { value: 0 };
        assert_eq!(select_species(&species, &mut low).unwrap().id, "s0");

        let mut high = FixedRng {
            value: (0.8 * u32::MAX as f32) as u32,
        };
        assert_eq!(select_species(&species, &mut high).unwrap().id, "s1");
    }

    #[test]
    fn zero_weight_species_is_never_picked() {
        let species = layer(&[0.0, 1.0]);
        let mut rng = FixedRng { value: 0 };
        assert_eq!(select_species(&species, &mut rng).unwrap().id, "s1");
    }

    #[test]
    fn empty_layer_yields_none() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_species(&[], &mut rng).is_none());
    }

    #[test]
    fn zero_sum_falls_back_to_uniform() {
        let species = layer(&[0.0, 0.0, 0.0]);
        let mut rng = StdRng::seed_from_u64(9);
        let mut seen = [0usize; 3];
        for _ in 0..300 {
            let picked = select_species(&species, &mut rng).unwrap();
            let idx: usize = picked.id[1..].parse().unwrap();
            seen[idx] += 1;
        }
        assert!(seen.iter().all(|n| *n > 0));
    }

    #[test]
    fn ill_formed_layer_still_selects() {
        let species = layer(&[0.9, 0.2]);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            assert!(select_species(&species, &mut rng).is_some());
        }
    }

    #[test]
    fn frequencies_track_predominance() {
        let species = layer(&[0.8, 0.2]);
        let mut rng = StdRng::seed_from_u64(77);
        let draws = 4000;
        let first = (0..draws)
            .filter(|_| select_species(&species, &mut rng).unwrap().id == "s0")
            .count();
        let share = first as f32 / draws as f32;
        assert!((share - 0.8).abs() < 0.05, "share {share}");
    }
}
