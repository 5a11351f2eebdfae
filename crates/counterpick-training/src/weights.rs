//! Weight vector initialisation.

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Creates a weight vector by applying a function to each index.
///
/// # Examples
///
/// ```
/// use counterpick_training::weights;
///
/// let weights = weights::from_fn(|i| 1.0 / (i as f64 + 1.0), 4);
/// assert_eq!(weights, vec![1.0, 0.5, 1.0 / 3.0, 0.25]);
/// ```
pub fn from_fn<F>(mut f: F, len: usize) -> Vec<f64>
where
    F: FnMut(usize) -> f64,
{
    let mut values = Vec::with_capacity(len);
    for i in 0..len {
        values.push(f(i));
    }
    values
}

/// Samples `len` weights from `N(0, sigma²)`.
///
/// A `sigma` of zero yields all-zero weights.
pub fn normal<R>(rng: &mut R, sigma: f64, len: usize) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    match Normal::new(0.0, sigma) {
        Ok(dist) if sigma > 0.0 => from_fn(|_| dist.sample(rng), len),
        _ => vec![0.0; len],
    }
}

/// Euclidean norm.
#[must_use]
pub fn l2_norm(weights: &[f64]) -> f64 {
    weights.iter().map(|w| w * w).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_normal_is_seeded() {
        let a = normal(&mut Pcg32::seed_from_u64(3), 0.1, 16);
        let b = normal(&mut Pcg32::seed_from_u64(3), 0.1, 16);
        assert_eq!(a, b);
        assert!(a.iter().all(|w| w.abs() < 1.0));
        assert!(a.iter().any(|w| *w != 0.0));
    }

    #[test]
    fn test_zero_sigma() {
        let weights = normal(&mut Pcg32::seed_from_u64(3), 0.0, 4);
        assert_eq!(weights, vec![0.0; 4]);
        assert_eq!(l2_norm(&[3.0, 4.0]), 5.0);
    }
}
