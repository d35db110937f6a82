//! Redundant constraint detection.
//!
//! Directionally near-duplicate constraints are grouped by the angle
//! between their coefficient vectors; each group keeps its most useful
//! member and flags the rest. Decisions are informed by a uniform point
//! cloud sampled around the cluster, so "redundant" means: dropping the
//! constraint does not change which sample points the retained set cuts
//! off.

use std::collections::HashSet;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::clustering::Cluster;
use crate::config::RedundancyConfig;
use crate::model::{ConstraintsSatisfaction, LinearConstraint, Point};

use super::metric::UtilityMetric;

/// Finds constraints that are safe to discard.
pub struct RedundantConstraintFinder<'a> {
    cluster: &'a Cluster,
    config: &'a RedundancyConfig,
}

impl<'a> RedundantConstraintFinder<'a> {
    /// Bind the finder to a cluster and its parameters.
    pub fn new(cluster: &'a Cluster, config: &'a RedundancyConfig) -> Self {
        Self { cluster, config }
    }

    /// Sample points uniformly in the cluster's bounding box expanded
    /// by the margin fraction on every axis.
    pub fn sample_points(&self, rng: &mut ChaCha8Rng) -> Vec<Point> {
        let dims = self.cluster.dims();
        let minimums = self.cluster.minimums();
        let maximums = self.cluster.maximums();

        let expanded: Vec<(f64, f64)> = (0..dims)
            .map(|i| {
                let range = maximums[i] - minimums[i];
                let margin = range * self.config.margin_expansion;
                (minimums[i] - margin, maximums[i] + margin)
            })
            .collect();

        (0..self.config.sample_size)
            .map(|_| {
                let coords = expanded
                    .iter()
                    .map(|&(lo, hi)| {
                        if hi > lo {
                            rng.gen_range(lo..hi)
                        } else {
                            lo
                        }
                    })
                    .collect();
                Point::positive(coords)
            })
            .collect()
    }

    /// Flag redundant constraints and return their indices, ascending.
    ///
    /// Walks similarity groups (same sign, coefficient angle within the
    /// threshold): a group anchor whose violated sample set is already
    /// covered by retained constraints is flagged outright; otherwise
    /// the group keeps its highest-utility member (ties keep the
    /// earlier one) and flags the rest. The winner's violated set then
    /// informs later groups' coverage checks.
    ///
    /// The last remaining constraint of a set is never flagged.
    pub fn find(
        &self,
        constraints: &mut [LinearConstraint],
        metric: UtilityMetric,
        rng: &mut ChaCha8Rng,
    ) -> Vec<usize> {
        let n = constraints.len();
        if n <= 1 {
            return Vec::new();
        }

        let samples = self.sample_points(rng);
        let cache = ConstraintsSatisfaction::new(constraints, samples);
        let centroid = Point::positive(self.cluster.mean().to_vec());
        let angle_threshold = self.config.angle_threshold_degrees.to_radians();

        let scores: Vec<f64> = constraints
            .iter()
            .map(|c| metric.score(c, &centroid, cache.points()))
            .collect();

        let mut redundant = vec![false; n];
        let mut processed = vec![false; n];
        // Sample indices violated by constraints retained so far.
        let mut covered: HashSet<usize> = HashSet::new();

        for anchor in 0..n {
            if processed[anchor] {
                continue;
            }
            processed[anchor] = true;

            // Coverage check: an anchor cutting off nothing new is
            // redundant outright.
            let anchor_violated = cache.violating_indices(anchor);
            if !covered.is_empty() && anchor_violated.iter().all(|pi| covered.contains(pi)) {
                redundant[anchor] = true;
                continue;
            }

            // Gather the anchor's similarity group.
            let mut group = vec![anchor];
            for other in anchor + 1..n {
                if processed[other] {
                    continue;
                }
                if constraints[other].sign() != constraints[anchor].sign() {
                    continue;
                }
                if let Some(angle) =
                    coefficient_angle(&constraints[anchor], &constraints[other])
                {
                    if angle <= angle_threshold {
                        group.push(other);
                        processed[other] = true;
                    }
                }
            }

            // Keep the best-scoring member; earlier index wins ties.
            let mut best = group[0];
            for &member in &group[1..] {
                if scores[member] > scores[best] {
                    redundant[best] = true;
                    best = member;
                } else {
                    redundant[member] = true;
                }
            }
            redundant[best] = false; // rescue the group winner

            for pi in cache.violating_indices(best) {
                covered.insert(pi);
            }
        }

        // A cluster must always retain at least one bounding constraint.
        if redundant.iter().all(|&r| r) {
            let keep = (0..n)
                .max_by(|&a, &b| {
                    scores[a]
                        .partial_cmp(&scores[b])
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(0);
            redundant[keep] = false;
        }

        for (constraint, &flag) in constraints.iter_mut().zip(redundant.iter()) {
            if flag {
                constraint.mark_redundant();
            }
        }

        let indices: Vec<usize> = (0..n).filter(|&i| redundant[i]).collect();
        debug!(
            total = n,
            redundant = indices.len(),
            "redundancy pass complete"
        );
        indices
    }
}

/// Angle in radians between two constraints' coefficient vectors; the
/// normalized dot product is clamped to [-1, 1] before `acos`. `None`
/// when either vector is all-zero.
fn coefficient_angle(a: &LinearConstraint, b: &LinearConstraint) -> Option<f64> {
    let va = a.coefficients();
    let vb = b.coefficients();

    let dot: f64 = va.iter().zip(vb.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = va.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = vb.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    Some((dot / (norm_a * norm_b)).clamp(-1.0, 1.0).acos())
}
