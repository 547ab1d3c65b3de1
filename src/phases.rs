use ndarray::{Array2, ArrayD, IxDyn};
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;

/// Matrix of phase angles, row `i` holds the phases for mask `i`
pub type PhaseMatrix = Array2<f64>;

/// Build an isolated generator: seeded streams are reproducible, unseeded ones
/// are drawn fresh from OS entropy.
pub(crate) fn rng_for(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Uniform phase angles in [0, 2π) drawn from a generator owned by the sampler.
#[derive(Clone, Debug)]
pub struct PhaseSampler {
    rng: ChaCha8Rng,
    distribution: Uniform<f64>,
}

impl PhaseSampler {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: rng_for(seed),
            distribution: Uniform::new(0.0, 2.0 * PI),
        }
    }

    /* elements are filled in row-major order */
    pub fn sample(&mut self, shape: &[usize]) -> ArrayD<f64> {
        let Self { rng, distribution } = self;
        ArrayD::from_shape_simple_fn(IxDyn(shape), || distribution.sample(rng))
    }

    /// One row of `k` phases per mask.
    pub fn sample_matrix(&mut self, n_masks: usize, k: usize) -> PhaseMatrix {
        let Self { rng, distribution } = self;
        Array2::from_shape_simple_fn((n_masks, k), || distribution.sample(rng))
    }
}

/// Array of independent random phases in [0, 2π) with the given shape.
///
/// Two calls with the same shape and `Some(seed)` return identical arrays.
/// With `None` every call uses a fresh entropy-seeded stream.
pub fn sample_phases(shape: &[usize], seed: Option<u64>) -> ArrayD<f64> {
    PhaseSampler::new(seed).sample(shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape() {
        let phases = sample_phases(&[5, 5], None);
        assert_eq!(phases.shape(), &[5, 5]);

        let phases = sample_phases(&[2, 3, 4], Some(3));
        assert_eq!(phases.shape(), &[2, 3, 4]);
    }

    #[test]
    fn test_values_range() {
        let phases = sample_phases(&[50, 50], None);
        assert!(phases.iter().all(|&phi| (0.0..=2.0 * PI).contains(&phi)));
    }

    #[test]
    fn test_seed_is_reproducible() {
        let first = sample_phases(&[5, 5], Some(1));
        let second = sample_phases(&[5, 5], Some(1));
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seeds_differ() {
        let first = sample_phases(&[5, 5], Some(1));
        let second = sample_phases(&[5, 5], Some(2));
        assert_ne!(first, second);
    }

    #[test]
    fn test_unseeded_calls_differ() {
        let first = sample_phases(&[8, 8], None);
        let second = sample_phases(&[8, 8], None);
        assert_ne!(first, second);
    }

    #[test]
    fn test_matrix_matches_flat_sample() {
        let matrix = PhaseSampler::new(Some(9)).sample_matrix(10, 4);
        let dynamic = sample_phases(&[10, 4], Some(9));
        assert_eq!(matrix.into_dyn(), dynamic);
    }

    #[test]
    fn test_phases_spread_over_full_circle() {
        let phases = sample_phases(&[4000], Some(5));
        let mean = phases.mean().unwrap();
        assert!((mean - PI).abs() < 0.15, "mean phase {mean}");
        assert!(phases.iter().any(|&phi| phi < 0.5));
        assert!(phases.iter().any(|&phi| phi > 2.0 * PI - 0.5));
    }
}
