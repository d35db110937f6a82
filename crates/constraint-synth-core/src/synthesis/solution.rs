//! Per-cluster orchestration and the top-level synthesis entry point.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clustering::{Cluster, XMeans};
use crate::config::{OptimizerConfig, RedundancyConfig, SynthConfig};
use crate::error::{SynthError, SynthResult};
use crate::model::{LinearConstraint, Point};

use super::generators::{
    generate_initial_constraints, generate_random_constraints, SamplingMode,
};
use super::metric::UtilityMetric;
use super::optimizer::{optimize, ConstraintOptimizer, OptimizeSteps};
use super::redundancy::RedundantConstraintFinder;

/// Per-cluster synthesis statistics, reported to callers alongside the
/// constraint list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterStats {
    /// Positive points in the cluster.
    pub size: usize,
    /// Dimensionality.
    pub dims: usize,
    /// BIC of the cluster's Gaussian fit, when one exists.
    pub bic: Option<f64>,
    /// Constraints accumulated before redundancy removal.
    pub constraints_total: usize,
    /// Constraints retained after redundancy removal.
    pub constraints_retained: usize,
    /// Candidates whose optimization hit the iteration cap.
    pub non_converged: usize,
}

/// One disjunct of the synthesized system: a cluster plus the
/// constraints bounding it.
///
/// Internally all candidate generation and optimization run on the
/// cluster's centralized (zero-mean) sibling for numerical stability;
/// [`constraints`](Solution::constraints) translates results back into
/// original coordinates.
pub struct Solution {
    cluster: Cluster,
    centralized: Cluster,
    constraints: Vec<LinearConstraint>,
    initial: Vec<LinearConstraint>,
    non_converged: usize,
}

impl Solution {
    /// Bind a solution to a cluster.
    pub fn new(cluster: Cluster) -> SynthResult<Self> {
        let centralized = cluster.centralized()?;
        Ok(Self {
            cluster,
            centralized,
            constraints: Vec::new(),
            initial: Vec::new(),
            non_converged: 0,
        })
    }

    /// The cluster this solution bounds.
    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    /// Seed the constraint set with the axis-aligned bounding box of
    /// the cluster. Must run before the other stages.
    pub fn generate_initial_solution(&mut self) -> SynthResult<&mut Self> {
        let initial = generate_initial_constraints(&self.centralized);

        self.initial = initial.clone();
        self.constraints.extend(initial);

        Ok(self)
    }

    /// Squeeze fresh clones of the initial box constraints against the
    /// data, `iterations` times over.
    ///
    /// # Errors
    ///
    /// `MissingInitialSolution` when `generate_initial_solution` has
    /// not run.
    pub fn generate_improved_initial_constraints(
        &mut self,
        iterations: usize,
        config: &OptimizerConfig,
        rng: &mut ChaCha8Rng,
    ) -> SynthResult<&mut Self> {
        if self.initial.is_empty() {
            return Err(SynthError::MissingInitialSolution);
        }

        for _ in 0..iterations {
            for template in self.initial.clone() {
                let mut constraint = template;
                let mut optimizer = ConstraintOptimizer::new(
                    constraint.as_constraint_mut(),
                    &self.centralized,
                    config,
                );
                optimizer.squeeze(rng);
                self.constraints.push(constraint);
            }
        }

        Ok(self)
    }

    /// Generate `count` random candidate hyperplanes and run the full
    /// sign/coefficients/squeeze optimization on each.
    ///
    /// Candidates that hit the iteration cap are kept best-effort and
    /// counted in [`ClusterStats::non_converged`].
    pub fn generate_improving_constraints(
        &mut self,
        count: usize,
        mode: SamplingMode,
        coefficient_std_dev: f64,
        config: &OptimizerConfig,
        rng: &mut ChaCha8Rng,
    ) -> SynthResult<&mut Self> {
        let candidates = generate_random_constraints(
            &self.centralized,
            count,
            mode,
            coefficient_std_dev,
            rng,
        );

        for mut constraint in candidates {
            let outcome = optimize(
                &mut constraint,
                &self.centralized,
                OptimizeSteps::default(),
                config,
                rng,
            );
            if !outcome.converged {
                self.non_converged += 1;
            }
            self.constraints.push(constraint);
        }

        Ok(self)
    }

    /// Flag redundant constraints; returns the flagged indices.
    pub fn remove_redundant_constraints(
        &mut self,
        metric: UtilityMetric,
        config: &RedundancyConfig,
        rng: &mut ChaCha8Rng,
    ) -> SynthResult<Vec<usize>> {
        let finder = RedundantConstraintFinder::new(&self.centralized, config);
        Ok(finder.find(&mut self.constraints, metric, rng))
    }

    /// The retained constraints, translated back into original
    /// coordinates.
    pub fn constraints(&self) -> Vec<LinearConstraint> {
        let mean = self.cluster.mean();
        self.constraints
            .iter()
            .filter(|c| !c.is_redundant())
            .map(|c| {
                let mut translated = c.clone();
                translated.translate(mean);
                translated
            })
            .collect()
    }

    /// Number of accumulated constraints, flagged ones included.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Synthesis statistics for this cluster.
    pub fn stats(&self) -> ClusterStats {
        ClusterStats {
            size: self.cluster.size(),
            dims: self.cluster.dims(),
            bic: self.cluster.bic().ok(),
            constraints_total: self.constraints.len(),
            constraints_retained: self
                .constraints
                .iter()
                .filter(|c| !c.is_redundant())
                .count(),
            non_converged: self.non_converged,
        }
    }
}

/// The synthesized system: one solution per cluster, forming a
/// disjunction (a point belongs to the approximated shape when it
/// satisfies every retained constraint of at least one cluster).
pub struct Synthesis {
    solutions: Vec<Solution>,
}

impl Synthesis {
    /// Per-cluster solutions, in cluster order.
    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    /// Number of disjuncts (clusters).
    pub fn disjunct_count(&self) -> usize {
        self.solutions.len()
    }

    /// Whether a point satisfies every retained constraint of at least
    /// one cluster.
    pub fn contains(&self, point: &Point) -> bool {
        self.solutions
            .iter()
            .any(|s| s.constraints().iter().all(|c| c.is_satisfying(point)))
    }
}

/// Cluster the positive point cloud into locally elliptical groups.
///
/// This is the clustering entry point on its own; the full pipeline is
/// [`synthesize`].
pub fn cluster_points(
    points: &[Point],
    config: &SynthConfig,
) -> SynthResult<Vec<Cluster>> {
    if points.is_empty() {
        return Err(SynthError::EmptyInput);
    }
    let dims = points[0].dims();
    for p in points {
        if p.dims() != dims {
            return Err(SynthError::DimensionMismatch {
                expected: dims,
                actual: p.dims(),
            });
        }
    }

    let positives: Vec<Point> = points.iter().filter(|p| p.is_positive()).cloned().collect();
    if positives.is_empty() {
        return Err(SynthError::NoPositivePoints);
    }

    let xmeans = XMeans::new()
        .with_min_k(config.clustering.min_k)
        .with_normalize(config.clustering.normalize)
        .with_enforce_single_cluster(config.clustering.enforce_single_cluster)
        .with_max_iterations(config.clustering.max_iterations)
        .with_tolerance(config.clustering.tolerance);

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let clusters = xmeans.fit(&positives, &mut rng)?;

    info!(
        points = positives.len(),
        clusters = clusters.len(),
        "clustered positive point cloud"
    );
    Ok(clusters)
}

/// Run the whole pipeline: cluster the positive points, then per
/// cluster seed the bounding box, squeeze improved initials, optimize
/// random candidates, and drop redundant constraints.
///
/// Deterministic given `config.seed` and the input; each cluster gets
/// its own seed-derived random source, so clusters could be processed
/// independently without changing results.
pub fn synthesize(points: &[Point], config: &SynthConfig) -> SynthResult<Synthesis> {
    config.validate()?;
    let clusters = cluster_points(points, config)?;

    let mut solutions = Vec::with_capacity(clusters.len());
    for (index, cluster) in clusters.into_iter().enumerate() {
        let cluster_seed = config
            .seed
            .wrapping_add(0x9E37_79B9u64.wrapping_mul(index as u64 + 1));
        let mut rng = ChaCha8Rng::seed_from_u64(cluster_seed);

        let mut solution = Solution::new(cluster)?;
        solution.generate_initial_solution()?;
        solution.generate_improved_initial_constraints(
            config.generator.improve_iterations,
            &config.optimizer,
            &mut rng,
        )?;
        solution.generate_improving_constraints(
            config.generator.count,
            config.generator.sampling,
            config.generator.coefficient_std_dev,
            &config.optimizer,
            &mut rng,
        )?;
        let discarded = solution.remove_redundant_constraints(
            config.redundancy.metric,
            &config.redundancy,
            &mut rng,
        )?;

        debug!(
            cluster = index,
            total = solution.constraint_count(),
            discarded = discarded.len(),
            "cluster synthesis complete"
        );
        solutions.push(solution);
    }

    info!(disjuncts = solutions.len(), "synthesis complete");
    Ok(Synthesis { solutions })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_points() -> Vec<Point> {
        vec![
            Point::positive(vec![0.0, 0.0]),
            Point::positive(vec![5.0, 0.0]),
            Point::positive(vec![10.0, 0.0]),
            Point::positive(vec![0.0, 5.0]),
            Point::positive(vec![10.0, 5.0]),
            Point::positive(vec![0.0, 10.0]),
            Point::positive(vec![5.0, 10.0]),
            Point::positive(vec![10.0, 10.0]),
        ]
    }

    fn square_solution() -> Solution {
        let cluster = Cluster::new(square_points()).unwrap();
        Solution::new(cluster).unwrap()
    }

    #[test]
    fn test_initial_solution_is_the_bounding_box() {
        let mut solution = square_solution();
        solution.generate_initial_solution().unwrap();

        let constraints = solution.constraints();
        assert_eq!(constraints.len(), 4);

        for constraint in &constraints {
            for point in square_points() {
                assert!(constraint.is_satisfying(&point));
            }
        }
    }

    #[test]
    fn test_improved_initials_require_initial_solution() {
        let mut solution = square_solution();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let result = solution.generate_improved_initial_constraints(
            1,
            &OptimizerConfig::default(),
            &mut rng,
        );
        assert!(matches!(result, Err(SynthError::MissingInitialSolution)));
    }

    #[test]
    fn test_translated_constraints_satisfy_original_points() {
        let mut solution = square_solution();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        solution.generate_initial_solution().unwrap();
        solution
            .generate_improving_constraints(
                5,
                SamplingMode::ThroughPoint,
                1.0,
                &OptimizerConfig::default(),
                &mut rng,
            )
            .unwrap();

        for constraint in solution.constraints() {
            for point in square_points() {
                assert!(
                    constraint.is_satisfying(&point),
                    "{} must satisfy {}",
                    constraint,
                    point
                );
            }
        }
    }

    #[test]
    fn test_stats_track_retention() {
        let mut solution = square_solution();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        solution.generate_initial_solution().unwrap();
        solution
            .remove_redundant_constraints(
                UtilityMetric::default(),
                &RedundancyConfig::default(),
                &mut rng,
            )
            .unwrap();

        let stats = solution.stats();
        assert_eq!(stats.size, 8);
        assert_eq!(stats.dims, 2);
        assert_eq!(stats.constraints_total, 4);
        assert!(stats.constraints_retained >= 1);
        assert!(stats.constraints_retained <= 4);
    }

    #[test]
    fn test_cluster_points_rejects_bad_input() {
        let config = SynthConfig::default();

        assert!(matches!(
            cluster_points(&[], &config),
            Err(SynthError::EmptyInput)
        ));

        let mixed = vec![Point::positive(vec![1.0]), Point::positive(vec![1.0, 2.0])];
        assert!(matches!(
            cluster_points(&mixed, &config),
            Err(SynthError::DimensionMismatch { .. })
        ));

        let negatives = vec![Point::negative(vec![1.0])];
        assert!(matches!(
            cluster_points(&negatives, &config),
            Err(SynthError::NoPositivePoints)
        ));
    }
}
