//! Residual noise model.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::math::{mean, population_std};

/// Mean and population standard deviation of spline residuals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseModel {
    mean: f64,
    std_dev: f64,
    n: usize,
}

impl NoiseModel {
    /// Returns `None` for non-finite values or a negative standard deviation.
    pub fn new(mean: f64, std_dev: f64, n: usize) -> Option<Self> {
        if !(mean.is_finite() && std_dev.is_finite() && std_dev >= 0.0) {
            return None;
        }
        Some(Self { mean, std_dev, n })
    }

    /// Characterize residuals; `None` when there are none.
    pub fn from_residuals(residuals: &[f64]) -> Option<Self> {
        Self::new(
            mean(residuals)?,
            population_std(residuals)?,
            residuals.len(),
        )
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Number of residuals the statistics were computed from.
    pub fn sample_size(&self) -> usize {
        self.n
    }

    /// Draw `count` independent Gaussian samples, in order.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<f64> {
        match Normal::new(self.mean, self.std_dev) {
            Ok(normal) => (0..count).map(|_| normal.sample(rng)).collect(),
            // std_dev is finite and >= 0 by construction.
            Err(_) => vec![self.mean; count],
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn residual_statistics() {
        let model = NoiseModel::from_residuals(&[1.0, -1.0, 1.0, -1.0]).unwrap();
        assert_eq!(model.mean(), 0.0);
        assert_eq!(model.std_dev(), 1.0);
        assert_eq!(model.sample_size(), 4);
        assert!(NoiseModel::from_residuals(&[]).is_none());
    }

    #[test]
    fn zero_spread_draws_the_mean() {
        let model = NoiseModel::new(0.25, 0.0, 10).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(model.draw(&mut rng, 3), vec![0.25; 3]);
    }

    #[test]
    fn draws_are_reproducible_with_a_seed() {
        let model = NoiseModel::new(0.0, 2.0, 10).unwrap();
        let a = model.draw(&mut StdRng::seed_from_u64(9), 5);
        let b = model.draw(&mut StdRng::seed_from_u64(9), 5);
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(NoiseModel::new(0.0, -1.0, 1).is_none());
        assert!(NoiseModel::new(f64::NAN, 1.0, 1).is_none());
    }
}
