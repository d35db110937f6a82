//! Utility metrics ranking constraints during redundancy elimination.

use serde::{Deserialize, Serialize};

use crate::model::{LinearConstraint, Point};

/// Pluggable constraint-utility strategy: higher score means "more
/// useful", i.e. the constraint a similarity group should keep.
///
/// No single metric is canonically correct, so the choice stays
/// injected rather than hardcoded; `AvgDistanceFromUnsatisfied` is the
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UtilityMetric {
    /// Distance of the constraint hyperplane from the cluster centroid.
    DistanceFromCentroid,
    /// Total hyperplane distance of the sample points the constraint
    /// satisfies.
    DistanceFromSatisfied,
    /// Negated total hyperplane distance of the sample points the
    /// constraint violates.
    DistanceFromUnsatisfied,
    /// Average hyperplane distance over satisfied sample points.
    AvgDistanceFromSatisfied,
    /// Negated average hyperplane distance over violated sample points.
    #[default]
    AvgDistanceFromUnsatisfied,
}

impl UtilityMetric {
    /// Score a constraint against the cluster centroid and the sampled
    /// point cloud. Averaging metrics score 0.0 when their side of the
    /// partition is empty.
    pub fn score(
        &self,
        constraint: &LinearConstraint,
        centroid: &Point,
        samples: &[Point],
    ) -> f64 {
        match self {
            UtilityMetric::DistanceFromCentroid => constraint.distance_from_point(centroid),
            UtilityMetric::DistanceFromSatisfied => {
                sum_distance(constraint, samples, true)
            }
            UtilityMetric::DistanceFromUnsatisfied => {
                -sum_distance(constraint, samples, false)
            }
            UtilityMetric::AvgDistanceFromSatisfied => {
                let (sum, count) = sum_and_count(constraint, samples, true);
                if count == 0 {
                    0.0
                } else {
                    sum / count as f64
                }
            }
            UtilityMetric::AvgDistanceFromUnsatisfied => {
                let (sum, count) = sum_and_count(constraint, samples, false);
                if count == 0 {
                    0.0
                } else {
                    -sum / count as f64
                }
            }
        }
    }
}

fn sum_distance(constraint: &LinearConstraint, samples: &[Point], satisfied: bool) -> f64 {
    sum_and_count(constraint, samples, satisfied).0
}

fn sum_and_count(
    constraint: &LinearConstraint,
    samples: &[Point],
    satisfied: bool,
) -> (f64, usize) {
    let mut sum = 0.0;
    let mut count = 0;
    for point in samples {
        if constraint.is_satisfying(point) == satisfied {
            sum += constraint.distance_from_point(point);
            count += 1;
        }
    }
    (sum, count)
}
