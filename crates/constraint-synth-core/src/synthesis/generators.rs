//! Candidate constraint generators: the axis-aligned bounding box and
//! random hyperplanes through sampled cluster points.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::clustering::Cluster;
use crate::model::{Inequality, LinearConstraint};

/// How random candidate hyperplanes are anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SamplingMode {
    /// The hyperplane passes exactly through one uniformly sampled
    /// cluster point.
    #[default]
    ThroughPoint,
    /// The hyperplane passes through a sampled cluster point AND the
    /// origin; the last coefficient is solved for, and the sign is
    /// drawn at random. Falls back to [`SamplingMode::ThroughPoint`]
    /// when the anchor coordinate is numerically zero.
    ThroughPointAndOrigin,
}

/// Emit two axis-aligned constraints per axis fixing the lower and
/// upper bound of the cluster's positive points: `x_i ≥ min_i` and
/// `x_i ≤ max_i`. Every cluster point satisfies the result by
/// construction, so the seed feasible region is the bounding box.
pub fn generate_initial_constraints(cluster: &Cluster) -> Vec<LinearConstraint> {
    let dims = cluster.dims();
    let mut constraints = Vec::with_capacity(2 * dims);

    for axis in 0..dims {
        constraints.push(LinearConstraint::axis_bound(
            axis,
            dims,
            cluster.minimums()[axis],
            Inequality::GreaterOrEqual,
        ));
        constraints.push(LinearConstraint::axis_bound(
            axis,
            dims,
            cluster.maximums()[axis],
            Inequality::LessOrEqual,
        ));
    }

    constraints
}

/// Generate `count` random linear constraints over the cluster's
/// positive points.
///
/// Coefficients are drawn from an isotropic normal (mean 0,
/// `coefficient_std_dev`); the absolute term is set so the hyperplane
/// passes exactly through the sampled anchor point.
pub fn generate_random_constraints(
    cluster: &Cluster,
    count: usize,
    mode: SamplingMode,
    coefficient_std_dev: f64,
    rng: &mut ChaCha8Rng,
) -> Vec<LinearConstraint> {
    let positives: Vec<&crate::model::Point> = cluster.positive_points().collect();
    let dims = cluster.dims();
    let normal = Normal::new(0.0, coefficient_std_dev)
        .expect("coefficient_std_dev is validated to be positive and finite");

    let mut constraints = Vec::with_capacity(count);
    for _ in 0..count {
        let anchor = positives[rng.gen_range(0..positives.len())];
        let mut coefficients: Vec<f64> = (0..dims).map(|_| normal.sample(rng)).collect();

        let constraint = match mode {
            SamplingMode::ThroughPoint => {
                let absolute: f64 = coefficients
                    .iter()
                    .zip(anchor.coords().iter())
                    .map(|(c, p)| c * p)
                    .sum();
                LinearConstraint::new(coefficients, absolute)
            }
            SamplingMode::ThroughPointAndOrigin => {
                let last = dims - 1;
                let pivot = anchor.coord(last);
                if dims < 2 || pivot.abs() <= f64::EPSILON {
                    // Cannot solve for the last coefficient; anchor the
                    // plane through the point only.
                    let absolute: f64 = coefficients
                        .iter()
                        .zip(anchor.coords().iter())
                        .map(|(c, p)| c * p)
                        .sum();
                    LinearConstraint::new(coefficients, absolute)
                } else {
                    let partial: f64 = (0..last)
                        .map(|i| coefficients[i] * anchor.coord(i))
                        .sum();
                    coefficients[last] = -partial / pivot;

                    let sign = if rng.gen::<bool>() {
                        Inequality::LessOrEqual
                    } else {
                        Inequality::GreaterOrEqual
                    };
                    LinearConstraint::with_sign(coefficients, 0.0, sign)
                }
            }
        };

        constraints.push(constraint);
    }

    constraints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;
    use rand::SeedableRng;

    fn square_cluster() -> Cluster {
        Cluster::new(vec![
            Point::positive(vec![0.0, 0.0]),
            Point::positive(vec![10.0, 0.0]),
            Point::positive(vec![0.0, 10.0]),
            Point::positive(vec![10.0, 10.0]),
        ])
        .unwrap()
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_initial_constraints_form_the_bounding_box() {
        let cluster = square_cluster();
        let constraints = generate_initial_constraints(&cluster);

        assert_eq!(constraints.len(), 4, "two constraints per axis");

        for constraint in &constraints {
            for point in cluster.points() {
                assert!(
                    constraint.is_satisfying(point),
                    "box constraint {} must satisfy {}",
                    constraint,
                    point
                );
            }
        }
    }

    #[test]
    fn test_initial_constraints_are_tight() {
        let cluster = square_cluster();
        let constraints = generate_initial_constraints(&cluster);

        // x0 >= 0, x0 <= 10, x1 >= 0, x1 <= 10 in axis order.
        assert_eq!(constraints[0].sign(), Inequality::GreaterOrEqual);
        assert_eq!(constraints[0].absolute_term(), 0.0);
        assert_eq!(constraints[1].sign(), Inequality::LessOrEqual);
        assert_eq!(constraints[1].absolute_term(), 10.0);
        assert_eq!(constraints[3].absolute_term(), 10.0);
    }

    #[test]
    fn test_random_constraints_pass_through_a_cluster_point() {
        let cluster = square_cluster();
        let constraints = generate_random_constraints(
            &cluster,
            20,
            SamplingMode::ThroughPoint,
            1.0,
            &mut rng(),
        );

        assert_eq!(constraints.len(), 20);

        for constraint in &constraints {
            // Anchored through a point: some cluster point lies exactly
            // on the hyperplane (margin 0).
            let touches = cluster
                .points()
                .iter()
                .any(|p| constraint.margin_for_point(p).abs() < 1e-9);
            assert!(touches, "{} passes through no cluster point", constraint);
        }
    }

    #[test]
    fn test_origin_mode_crosses_origin() {
        let cluster = Cluster::new(vec![
            Point::positive(vec![1.0, 2.0]),
            Point::positive(vec![3.0, 1.0]),
            Point::positive(vec![2.0, 4.0]),
        ])
        .unwrap();

        let constraints = generate_random_constraints(
            &cluster,
            10,
            SamplingMode::ThroughPointAndOrigin,
            1.0,
            &mut rng(),
        );

        let origin = Point::positive(vec![0.0, 0.0]);
        for constraint in &constraints {
            assert!(
                constraint.value_for_point(&origin).abs() < 1e-9
                    && constraint.absolute_term().abs() < 1e-9,
                "{} does not cross the origin",
                constraint
            );
        }
    }

    #[test]
    fn test_determinism_given_same_seed() {
        let cluster = square_cluster();
        let a = generate_random_constraints(&cluster, 5, SamplingMode::ThroughPoint, 1.0, &mut rng());
        let b = generate_random_constraints(&cluster, 5, SamplingMode::ThroughPoint, 1.0, &mut rng());

        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.coefficients(), y.coefficients());
            assert_eq!(x.absolute_term(), y.absolute_term());
        }
    }
}
