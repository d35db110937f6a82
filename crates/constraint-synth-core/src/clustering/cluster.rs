//! Cluster of points with cached distribution statistics.

use serde::{Deserialize, Serialize};

use crate::model::Point;

use super::error::ClusterError;
use super::gaussian::{sample_covariance, sample_mean, MultivariateGaussian};

/// A group of points plus the statistics the synthesis pipeline needs:
/// per-axis bounds, mean, covariance, and a multivariate Gaussian fit
/// with cached log-likelihood and BIC.
///
/// Only positive-labeled points participate in fitting; negative points
/// ride along untouched. Clusters are created once by X-means and never
/// re-split after acceptance.
///
/// The number of free parameters of a full-covariance Gaussian in `d`
/// dimensions is `K = d(d+3)/2` (mean plus symmetric covariance),
/// which is the complexity penalty used by the BIC.
///
/// # Example
///
/// ```
/// use constraint_synth_core::clustering::Cluster;
/// use constraint_synth_core::model::Point;
///
/// let cluster = Cluster::new(vec![
///     Point::positive(vec![0.0, 0.0]),
///     Point::positive(vec![2.0, 0.0]),
///     Point::positive(vec![0.0, 2.0]),
///     Point::positive(vec![2.0, 2.0]),
/// ]).unwrap();
///
/// assert_eq!(cluster.dims(), 2);
/// assert_eq!(cluster.mean(), &[1.0, 1.0]);
/// assert_eq!(cluster.minimums(), &[0.0, 0.0]);
/// assert_eq!(cluster.maximums(), &[2.0, 2.0]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    points: Vec<Point>,
    dims: usize,
    minimums: Vec<f64>,
    maximums: Vec<f64>,
    mean: Vec<f64>,
    covariance: Vec<Vec<f64>>,
    #[serde(skip)]
    model: Option<MultivariateGaussian>,
    #[serde(skip)]
    log_likelihood: Option<f64>,
}

impl Cluster {
    /// Build a cluster and compute its statistics.
    ///
    /// The Gaussian fit is attempted but allowed to fail (degenerate
    /// covariance): statistics that need it report
    /// `ClusterError::UnfittableCluster` on access.
    ///
    /// # Errors
    ///
    /// - `InsufficientData` when the input has no positive points.
    /// - `DimensionMismatch` when points disagree on dimensionality.
    pub fn new(points: Vec<Point>) -> Result<Self, ClusterError> {
        let positive_count = points.iter().filter(|p| p.is_positive()).count();
        if positive_count == 0 {
            return Err(ClusterError::insufficient_data(1, 0));
        }

        let dims = points[0].dims();
        for p in &points {
            if p.dims() != dims {
                return Err(ClusterError::dimension_mismatch(dims, p.dims()));
            }
        }

        let observations: Vec<Vec<f64>> = points
            .iter()
            .filter(|p| p.is_positive())
            .map(|p| p.coords().to_vec())
            .collect();

        let mut minimums = vec![f64::INFINITY; dims];
        let mut maximums = vec![f64::NEG_INFINITY; dims];
        for obs in &observations {
            for i in 0..dims {
                minimums[i] = minimums[i].min(obs[i]);
                maximums[i] = maximums[i].max(obs[i]);
            }
        }

        let mean = sample_mean(&observations, dims);
        let covariance = sample_covariance(&observations, &mean);

        let model = MultivariateGaussian::fit(mean.clone(), &covariance).ok();
        let log_likelihood = model
            .as_ref()
            .map(|m| observations.iter().map(|obs| m.log_density(obs)).sum());

        Ok(Self {
            points,
            dims,
            minimums,
            maximums,
            mean,
            covariance,
            model,
            log_likelihood,
        })
    }

    /// All points of the cluster.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The positive-labeled points that drive fitting.
    pub fn positive_points(&self) -> impl Iterator<Item = &Point> {
        self.points.iter().filter(|p| p.is_positive())
    }

    /// Number of positive points.
    pub fn size(&self) -> usize {
        self.points.iter().filter(|p| p.is_positive()).count()
    }

    /// Dimensionality.
    #[inline]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Per-axis minimum over positive points.
    pub fn minimums(&self) -> &[f64] {
        &self.minimums
    }

    /// Per-axis maximum over positive points.
    pub fn maximums(&self) -> &[f64] {
        &self.maximums
    }

    /// Mean of the positive points.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Sample covariance of the positive points.
    pub fn covariance(&self) -> &[Vec<f64>] {
        &self.covariance
    }

    /// Free-parameter count of a full-covariance Gaussian:
    /// `d(d+3)/2`.
    pub fn free_parameters(&self) -> usize {
        self.dims * (self.dims + 3) / 2
    }

    /// The fitted Gaussian, when the covariance admitted one.
    pub fn model(&self) -> Option<&MultivariateGaussian> {
        self.model.as_ref()
    }

    /// Sum of log-densities of the positive points under the fitted
    /// Gaussian.
    ///
    /// # Errors
    ///
    /// `UnfittableCluster` when no Gaussian could be fitted.
    pub fn log_likelihood(&self) -> Result<f64, ClusterError> {
        self.log_likelihood
            .ok_or_else(|| ClusterError::unfittable("no Gaussian fit for this cluster"))
    }

    /// Bayesian Information Criterion of the single-Gaussian model:
    /// `−2·LL + K·ln(n)`.
    ///
    /// # Errors
    ///
    /// `UnfittableCluster` when no Gaussian could be fitted.
    pub fn bic(&self) -> Result<f64, ClusterError> {
        let ll = self.log_likelihood()?;
        Ok(-2.0 * ll + self.free_parameters() as f64 * (self.size() as f64).ln())
    }

    /// Determinant of the fitted covariance.
    ///
    /// # Errors
    ///
    /// `UnfittableCluster` when no Gaussian could be fitted.
    pub fn covariance_determinant(&self) -> Result<f64, ClusterError> {
        self.model
            .as_ref()
            .map(|m| m.covariance_determinant())
            .ok_or_else(|| ClusterError::unfittable("no Gaussian fit for this cluster"))
    }

    /// The mean-subtracted sibling cluster used during optimization, so
    /// that step sizes stay well-scaled regardless of where the cluster
    /// sits in space.
    pub fn centralized(&self) -> Result<Cluster, ClusterError> {
        let mean = self.mean.clone();
        let points = self
            .points
            .iter()
            .map(|p| {
                let coords = p
                    .coords()
                    .iter()
                    .zip(mean.iter())
                    .map(|(c, m)| c - m)
                    .collect();
                Point::new(coords, p.label())
            })
            .collect();

        Cluster::new(points)
    }
}
