//! Recursive X-means clustering with BIC-gated splits.

use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::model::Point;

use super::cluster::Cluster;
use super::error::ClusterError;
use super::gaussian::standard_normal_cdf;
use super::kmeans::kmeans;

/// Clusters below this size are never split: a full-covariance Gaussian
/// cannot be meaningfully fitted on 3 points or fewer.
pub const MIN_SPLITTABLE_SIZE: usize = 4;

/// Recursive clusterer: partitions a point set by repeated 2-way
/// k-means splits, accepting a split only when the children's combined,
/// complexity-penalized likelihood improves on the parent's BIC.
///
/// # Example
///
/// ```
/// use constraint_synth_core::clustering::XMeans;
/// use constraint_synth_core::model::Point;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let points: Vec<Point> = (0..8)
///     .map(|i| Point::positive(vec![(i % 3) as f64, (i % 5) as f64]))
///     .collect();
///
/// let mut rng = ChaCha8Rng::seed_from_u64(42);
/// let clusters = XMeans::new().fit(&points, &mut rng).unwrap();
/// assert!(!clusters.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct XMeans {
    min_k: usize,
    normalize: bool,
    enforce_single_cluster: bool,
    max_iterations: usize,
    tolerance: f64,
}

impl Default for XMeans {
    fn default() -> Self {
        Self {
            min_k: 1,
            normalize: true,
            enforce_single_cluster: false,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

impl XMeans {
    /// Clusterer with defaults: `min_k = 1`, normalization on.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum cluster count of the initial partition.
    #[must_use]
    pub fn with_min_k(mut self, min_k: usize) -> Self {
        self.min_k = min_k;
        self
    }

    /// Enable or disable per-axis z-score normalization of the k-means
    /// assignment. Cluster statistics always use original coordinates.
    #[must_use]
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Bypass splitting entirely and return the whole input as one
    /// cluster.
    #[must_use]
    pub fn with_enforce_single_cluster(mut self, enforce: bool) -> Self {
        self.enforce_single_cluster = enforce;
        self
    }

    /// Set the Lloyd iteration cap of the inner k-means runs.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the centroid-shift convergence tolerance of the inner
    /// k-means runs.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Validate parameters.
    ///
    /// # Errors
    ///
    /// `ClusterError::InvalidParameter` when `min_k` is 0 or the
    /// iteration cap is 0.
    pub fn validate(&self) -> Result<(), ClusterError> {
        if self.min_k == 0 {
            return Err(ClusterError::invalid_parameter(
                "min_k must be >= 1; an empty partition is meaningless",
            ));
        }
        if self.max_iterations == 0 {
            return Err(ClusterError::invalid_parameter(
                "max_iterations must be >= 1",
            ));
        }
        Ok(())
    }

    /// Partition `points` into clusters.
    ///
    /// The returned partition is final: no accepted cluster can be
    /// split into two children whose penalized likelihood beats the
    /// parent's BIC. Degenerate splits (empty child, unfittable child
    /// Gaussian) count as no-split and the parent is accepted.
    ///
    /// # Errors
    ///
    /// - `InsufficientData` when the input is empty or smaller than
    ///   `min_k`.
    /// - `DimensionMismatch` when points disagree on dimensionality.
    pub fn fit(
        &self,
        points: &[Point],
        rng: &mut ChaCha8Rng,
    ) -> Result<Vec<Cluster>, ClusterError> {
        self.validate()?;

        if points.is_empty() {
            return Err(ClusterError::insufficient_data(self.min_k.max(1), 0));
        }
        let dims = points[0].dims();
        for p in points {
            if p.dims() != dims {
                return Err(ClusterError::dimension_mismatch(dims, p.dims()));
            }
        }

        if self.enforce_single_cluster {
            return Ok(vec![Cluster::new(points.to_vec())?]);
        }

        let initial = self.split_into(points, self.min_k, rng)?;
        let mut pending: Vec<Cluster> = Vec::with_capacity(initial.len());
        for group in initial {
            pending.push(Cluster::new(group)?);
        }

        let mut accepted = Vec::new();
        while let Some(cluster) = pending.pop() {
            match self.try_split(&cluster, rng) {
                Some((c1, c2)) => {
                    pending.push(c1);
                    pending.push(c2);
                }
                None => accepted.push(cluster),
            }
        }

        // Worklist order is LIFO; restore a stable presentation order.
        accepted.sort_by(|a, b| {
            a.mean()
                .partial_cmp(b.mean())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(clusters = accepted.len(), "x-means partition accepted");
        Ok(accepted)
    }

    /// Attempt a 2-way split; `Some` children when the BIC favors the
    /// split, `None` when the parent is accepted as a leaf.
    fn try_split(&self, cluster: &Cluster, rng: &mut ChaCha8Rng) -> Option<(Cluster, Cluster)> {
        if cluster.size() < MIN_SPLITTABLE_SIZE {
            return None;
        }

        let parent_bic = cluster.bic().ok()?;

        let groups = self.split_into(cluster.points(), 2, rng).ok()?;
        if groups.len() < 2 {
            return None;
        }

        let c1 = Cluster::new(groups[0].clone()).ok()?;
        let c2 = Cluster::new(groups[1].clone()).ok()?;

        let ll1 = c1.log_likelihood().ok()?;
        let ll2 = c2.log_likelihood().ok()?;
        let det_sum = c1.covariance_determinant().ok()? + c2.covariance_determinant().ok()?;
        if det_sum <= 0.0 {
            return None;
        }

        let separation: f64 = c1
            .mean()
            .iter()
            .zip(c2.mean().iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt();
        let beta = separation / det_sum.sqrt();
        let alpha = 0.5 / standard_normal_cdf(beta);

        let n = cluster.size() as f64;
        let k = cluster.free_parameters() as f64;
        let split_bic = -2.0 * (n * alpha.ln() + ll1 + ll2) + 2.0 * k * n.ln();

        debug!(
            parent_bic,
            split_bic,
            beta,
            size = cluster.size(),
            "x-means split test"
        );

        if split_bic < parent_bic {
            Some((c1, c2))
        } else {
            None
        }
    }

    /// Run k-means and group the points by assignment. Empty groups are
    /// dropped, so fewer than `k` groups may come back.
    fn split_into(
        &self,
        points: &[Point],
        k: usize,
        rng: &mut ChaCha8Rng,
    ) -> Result<Vec<Vec<Point>>, ClusterError> {
        let mut observations: Vec<Vec<f64>> =
            points.iter().map(|p| p.coords().to_vec()).collect();

        if self.normalize {
            normalize_in_place(&mut observations);
        }

        let outcome = kmeans(&observations, k, self.max_iterations, self.tolerance, rng)?;

        let mut groups: Vec<Vec<Point>> = vec![Vec::new(); k];
        for (point, &label) in points.iter().zip(outcome.labels.iter()) {
            groups[label].push(point.clone());
        }
        groups.retain(|g| !g.is_empty());

        Ok(groups)
    }
}

/// Per-axis z-score normalization; zero-variance axes are left at their
/// mean-subtracted value.
fn normalize_in_place(observations: &mut [Vec<f64>]) {
    if observations.is_empty() {
        return;
    }
    let d = observations[0].len();
    let n = observations.len() as f64;

    for axis in 0..d {
        let mean: f64 = observations.iter().map(|o| o[axis]).sum::<f64>() / n;
        let variance: f64 =
            observations.iter().map(|o| (o[axis] - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        for obs in observations.iter_mut() {
            obs[axis] -= mean;
            if std > 0.0 {
                obs[axis] /= std;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    /// Rough Gaussian blob via the central limit of uniforms; enough
    /// for separation tests without pulling a distribution type in.
    fn blob(center: &[f64], std: f64, count: usize, rng: &mut ChaCha8Rng) -> Vec<Point> {
        (0..count)
            .map(|_| {
                let coords = center
                    .iter()
                    .map(|&c| {
                        let sum: f64 = (0..12).map(|_| rng.gen::<f64>()).sum();
                        c + (sum - 6.0) * std
                    })
                    .collect();
                Point::positive(coords)
            })
            .collect()
    }

    #[test]
    fn test_empty_input_rejected() {
        let result = XMeans::new().fit(&[], &mut rng());
        assert!(matches!(result, Err(ClusterError::InsufficientData { .. })));
    }

    #[test]
    fn test_mixed_dimensionality_rejected() {
        let points = vec![Point::positive(vec![1.0]), Point::positive(vec![1.0, 2.0])];
        let result = XMeans::new().fit(&points, &mut rng());
        assert!(matches!(result, Err(ClusterError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_tiny_cluster_is_never_split() {
        let points = vec![
            Point::positive(vec![0.0, 0.0]),
            Point::positive(vec![100.0, 0.0]),
            Point::positive(vec![0.0, 100.0]),
        ];
        let clusters = XMeans::new().fit(&points, &mut rng()).unwrap();
        assert_eq!(clusters.len(), 1);
    }

    #[test]
    fn test_enforce_single_cluster_bypasses_splitting() {
        let mut r = rng();
        let mut points = blob(&[0.0, 0.0], 1.0, 100, &mut r);
        points.extend(blob(&[50.0, 50.0], 1.0, 100, &mut r));

        let clusters = XMeans::new()
            .with_enforce_single_cluster(true)
            .fit(&points, &mut r)
            .unwrap();

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].size(), 200);

        println!(
            "[PASS] test_enforce_single_cluster_bypasses_splitting - {} points in one cluster",
            clusters[0].size()
        );
    }

    #[test]
    fn test_collinear_points_accepted_unsplit() {
        // Singular covariance at every level: the clusterer must
        // terminate and hand back the degenerate input as one leaf.
        let points: Vec<Point> = (0..10)
            .map(|i| Point::positive(vec![i as f64, i as f64]))
            .collect();

        let clusters = XMeans::new().fit(&points, &mut rng()).unwrap();
        assert_eq!(clusters.len(), 1);
    }

    #[test]
    fn test_min_k_initial_partition() {
        let mut r = rng();
        let mut points = blob(&[0.0, 0.0], 1.0, 50, &mut r);
        points.extend(blob(&[40.0, 0.0], 1.0, 50, &mut r));
        points.extend(blob(&[0.0, 40.0], 1.0, 50, &mut r));

        let clusters = XMeans::new().with_min_k(3).fit(&points, &mut r).unwrap();
        assert!(clusters.len() >= 3, "initial partition must honor min_k");
    }

    #[test]
    fn test_validate_rejects_zero_min_k() {
        let result = XMeans::new().with_min_k(0).validate();
        assert!(matches!(result, Err(ClusterError::InvalidParameter { .. })));
    }
}
