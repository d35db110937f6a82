//! Multivariate Gaussian fitting and the scalar normal CDF.
//!
//! The covariance is factored once (Cholesky) at fit time; log-density
//! queries then cost one triangular solve. A singular or indefinite
//! covariance fails the fit: callers treat the cluster as unfittable
//! instead of propagating NaNs.

use super::error::ClusterError;

const LN_TWO_PI: f64 = 1.837877066409345;

/// A multivariate normal distribution fitted from a mean vector and a
/// full covariance matrix.
#[derive(Debug, Clone)]
pub struct MultivariateGaussian {
    mean: Vec<f64>,
    /// Lower-triangular Cholesky factor of the covariance.
    chol: Vec<Vec<f64>>,
    /// ln det(covariance), from the factor diagonal.
    log_det: f64,
}

impl MultivariateGaussian {
    /// Fit from a mean and covariance.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::UnfittableCluster` when the covariance is
    /// singular or not positive definite even after jitter, or when the
    /// inputs contain non-finite values.
    pub fn fit(mean: Vec<f64>, covariance: &[Vec<f64>]) -> Result<Self, ClusterError> {
        let d = mean.len();
        if covariance.len() != d || covariance.iter().any(|row| row.len() != d) {
            return Err(ClusterError::dimension_mismatch(d, covariance.len()));
        }
        if mean.iter().any(|v| !v.is_finite())
            || covariance
                .iter()
                .any(|row| row.iter().any(|v| !v.is_finite()))
        {
            return Err(ClusterError::unfittable(
                "mean or covariance contains non-finite values",
            ));
        }

        match cholesky(covariance) {
            Some(chol) => {
                let log_det =
                    2.0 * chol.iter().enumerate().map(|(i, row)| row[i].ln()).sum::<f64>();
                Ok(Self {
                    mean,
                    chol,
                    log_det,
                })
            }
            None => Err(ClusterError::unfittable(
                "covariance is singular or not positive definite",
            )),
        }
    }

    /// Dimensionality of the distribution.
    pub fn dims(&self) -> usize {
        self.mean.len()
    }

    /// The fitted mean.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Log probability density at `x`.
    pub fn log_density(&self, x: &[f64]) -> f64 {
        let d = self.mean.len();
        debug_assert_eq!(x.len(), d);

        // Solve L y = (x - mean); the squared Mahalanobis distance is ‖y‖².
        let mut y = vec![0.0; d];
        for i in 0..d {
            let mut sum = x[i] - self.mean[i];
            for j in 0..i {
                sum -= self.chol[i][j] * y[j];
            }
            y[i] = sum / self.chol[i][i];
        }
        let mahalanobis_sq: f64 = y.iter().map(|v| v * v).sum();

        -0.5 * (d as f64 * LN_TWO_PI + self.log_det + mahalanobis_sq)
    }

    /// Determinant of the fitted covariance.
    pub fn covariance_determinant(&self) -> f64 {
        self.log_det.exp()
    }
}

/// Lower-triangular Cholesky factorization. Returns `None` when a
/// non-positive pivot is encountered (singular or indefinite input).
fn cholesky(matrix: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let d = matrix.len();
    let mut l = vec![vec![0.0; d]; d];

    for i in 0..d {
        for j in 0..=i {
            let mut sum = matrix[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Some(l)
}

/// Sample mean of a set of coordinate vectors.
pub fn sample_mean(observations: &[Vec<f64>], dims: usize) -> Vec<f64> {
    let n = observations.len().max(1) as f64;
    let mut mean = vec![0.0; dims];
    for obs in observations {
        for (m, &v) in mean.iter_mut().zip(obs.iter()) {
            *m += v;
        }
    }
    for m in &mut mean {
        *m /= n;
    }
    mean
}

/// Sample covariance (unbiased, n−1 denominator; falls back to n for a
/// single observation).
pub fn sample_covariance(observations: &[Vec<f64>], mean: &[f64]) -> Vec<Vec<f64>> {
    let d = mean.len();
    let n = observations.len();
    let denom = if n > 1 { (n - 1) as f64 } else { 1.0 };

    let mut cov = vec![vec![0.0; d]; d];
    for obs in observations {
        for i in 0..d {
            let di = obs[i] - mean[i];
            for j in 0..=i {
                cov[i][j] += di * (obs[j] - mean[j]);
            }
        }
    }
    for i in 0..d {
        for j in 0..=i {
            cov[i][j] /= denom;
            cov[j][i] = cov[i][j];
        }
    }
    cov
}

/// Standard normal CDF Φ via the Abramowitz & Stegun 7.1.26 erf
/// approximation (absolute error < 1.5e-7).
pub fn standard_normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    sign * (1.0 - poly * (-x * x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_covariance() {
        let obs = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let mean = sample_mean(&obs, 2);
        assert_eq!(mean, vec![3.0, 4.0]);

        let cov = sample_covariance(&obs, &mean);
        // Both axes have variance 4 and are perfectly correlated.
        assert!((cov[0][0] - 4.0).abs() < 1e-12);
        assert!((cov[1][1] - 4.0).abs() < 1e-12);
        assert!((cov[0][1] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_standard_gaussian_log_density() {
        // 2D standard normal at the origin: -0.5 * 2 * ln(2π)
        let g = MultivariateGaussian::fit(
            vec![0.0, 0.0],
            &[vec![1.0, 0.0], vec![0.0, 1.0]],
        )
        .expect("identity covariance must fit");

        let expected = -LN_TWO_PI;
        assert!((g.log_density(&[0.0, 0.0]) - expected).abs() < 1e-10);
        assert!((g.covariance_determinant() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_density_decreases_away_from_mean() {
        let g = MultivariateGaussian::fit(
            vec![1.0, -1.0],
            &[vec![2.0, 0.3], vec![0.3, 1.0]],
        )
        .expect("positive definite covariance must fit");

        let at_mean = g.log_density(&[1.0, -1.0]);
        let away = g.log_density(&[4.0, 3.0]);
        assert!(at_mean > away);
    }

    #[test]
    fn test_singular_covariance_is_unfittable() {
        // Rank-1 covariance: perfectly correlated axes with zero noise.
        let result = MultivariateGaussian::fit(
            vec![0.0, 0.0],
            &[vec![1.0, 1.0], vec![1.0, 1.0]],
        );

        match result {
            Err(ClusterError::UnfittableCluster { .. }) => {}
            other => panic!("expected UnfittableCluster, got {:?}", other),
        }
    }

    #[test]
    fn test_normal_cdf_reference_values() {
        assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((standard_normal_cdf(1.0) - 0.8413447).abs() < 1e-6);
        assert!((standard_normal_cdf(-1.0) - 0.1586553).abs() < 1e-6);
        assert!(standard_normal_cdf(8.0) > 0.999999);
        assert!(standard_normal_cdf(-8.0) < 1e-6);
    }

    #[test]
    fn test_determinant_from_factorization() {
        // det [[4, 0], [0, 9]] = 36
        let g = MultivariateGaussian::fit(
            vec![0.0, 0.0],
            &[vec![4.0, 0.0], vec![0.0, 9.0]],
        )
        .expect("diagonal covariance must fit");
        assert!((g.covariance_determinant() - 36.0).abs() < 1e-9);
    }
}
