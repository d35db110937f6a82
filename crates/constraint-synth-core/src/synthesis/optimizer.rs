//! Heuristic local-search optimization of a single constraint.
//!
//! The optimizer works under purely combinatorial feedback: the count
//! of cluster points violating the constraint. It first flips the sign
//! toward the majority, then walks coefficients with an adaptive step
//! until every point is satisfied, and finally squeezes the boundary
//! toward the data. Clusters are expected in centralized (zero-mean)
//! coordinates so step sizes and the squeeze geometry stay well-scaled;
//! the caller translates results back afterwards.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::clustering::Cluster;
use crate::config::OptimizerConfig;
use crate::model::{Constraint, Inequality, LinearConstraint, Point};

/// Which optimization stages to run.
#[derive(Debug, Clone, Copy)]
pub struct OptimizeSteps {
    pub sign: bool,
    pub coefficients: bool,
    pub squeeze: bool,
}

impl Default for OptimizeSteps {
    fn default() -> Self {
        Self {
            sign: true,
            coefficients: true,
            squeeze: true,
        }
    }
}

/// Result of an optimization run.
///
/// Non-convergence is recoverable: the constraint holds the best state
/// found and `violated_remaining` tells the caller how short it fell.
#[derive(Debug, Clone, Copy)]
pub struct OptimizeOutcome {
    /// Whether the run reached its goal (zero violations for the
    /// coefficient stage; an emptied working set for squeeze).
    pub converged: bool,
    /// Cluster points still violating the constraint.
    pub violated_remaining: usize,
    /// Iterations spent.
    pub iterations: usize,
}

/// Run the requested stages on a linear constraint over a cluster.
///
/// This is the pipeline's entry point into the optimizer; the squeeze
/// stage only runs when the constraint satisfies every cluster point.
pub fn optimize(
    constraint: &mut LinearConstraint,
    cluster: &Cluster,
    steps: OptimizeSteps,
    config: &OptimizerConfig,
    rng: &mut ChaCha8Rng,
) -> OptimizeOutcome {
    let mut optimizer = ConstraintOptimizer::new(constraint.as_constraint_mut(), cluster, config);

    if steps.sign {
        optimizer.optimize_sign();
    }

    let mut outcome = OptimizeOutcome {
        converged: true,
        violated_remaining: optimizer.violated_count(),
        iterations: 0,
    };
    if steps.coefficients {
        outcome = optimizer.optimize_coefficients();
    }

    if steps.squeeze && outcome.violated_remaining == 0 {
        let squeeze = optimizer.squeeze(rng);
        outcome.iterations += squeeze.iterations;
    }

    outcome
}

/// Local-search state for one constraint: the cluster's positive
/// points plus per-term probe direction and step factor, held in
/// arrays parallel to the constraint's term list.
pub struct ConstraintOptimizer<'a> {
    constraint: &'a mut Constraint,
    points: Vec<&'a Point>,
    config: &'a OptimizerConfig,
    /// Most recently successful probe direction per term (±1).
    directions: Vec<f64>,
    /// Per-term multiplier on the adaptive step; grows on accepted
    /// moves, resets to neutral when a term stops helping.
    step_factors: Vec<f64>,
}

impl<'a> ConstraintOptimizer<'a> {
    /// Bind a constraint to its cluster's positive points.
    pub fn new(
        constraint: &'a mut Constraint,
        cluster: &'a Cluster,
        config: &'a OptimizerConfig,
    ) -> Self {
        let points: Vec<&Point> = cluster.positive_points().collect();
        let term_count = constraint.term_count();

        Self {
            constraint,
            points,
            config,
            directions: vec![1.0; term_count],
            step_factors: vec![1.0; term_count],
        }
    }

    /// The constraint being optimized.
    pub fn constraint(&self) -> &Constraint {
        self.constraint
    }

    /// Number of cluster points currently violating the constraint.
    pub fn violated_count(&self) -> usize {
        self.points
            .iter()
            .filter(|p| !self.constraint.is_satisfying(p))
            .count()
    }

    /// Number of cluster points currently satisfying the constraint.
    pub fn satisfied_count(&self) -> usize {
        self.points.len() - self.violated_count()
    }

    /// Flip the relational operator when fewer than half the cluster's
    /// points satisfy the constraint. A hyperplane through one point
    /// cuts space roughly in half, so whichever side holds the
    /// majority should be the satisfying one.
    pub fn optimize_sign(&mut self) -> &mut Self {
        if self.satisfied_count() * 2 < self.points.len() {
            self.constraint.invert_sign();
        }
        self
    }

    /// Walk coefficients until zero cluster points violate the
    /// constraint.
    ///
    /// Each iteration: probe every term at an adaptive step
    /// (`max(violated/total, min_step)`, scaled per term), tracked
    /// direction first, opposite second; apply the single best
    /// improving move atomically. When no term improves, move the
    /// absolute term in the helping direction instead; when that fails
    /// too, the step doubles after two consecutive non-improving
    /// passes to escape the plateau. The run is bounded by
    /// `max_iterations`; hitting the cap leaves the best-found state
    /// in place and reports `converged: false`.
    pub fn optimize_coefficients(&mut self) -> OptimizeOutcome {
        let total = self.points.len();
        let mut violated = self.violated_count();
        let mut iterations = 0;

        if total == 0 || violated == 0 {
            return OptimizeOutcome {
                converged: true,
                violated_remaining: violated,
                iterations,
            };
        }

        let mut best_seen = violated;
        let mut stalled_passes = 0usize;
        let mut plateau_scale = 1.0f64;

        while violated > 0 {
            if iterations >= self.config.max_iterations {
                warn!(
                    violated,
                    iterations, "coefficient optimization hit the iteration cap"
                );
                return OptimizeOutcome {
                    converged: false,
                    violated_remaining: violated,
                    iterations,
                };
            }
            iterations += 1;

            let base_step =
                (violated as f64 / total as f64).max(self.config.min_step) * plateau_scale;

            // Probe every term in both directions; remember the single
            // best improving move.
            let mut best: Option<(usize, f64, usize)> = None;
            for idx in 0..self.constraint.term_count() {
                let step = base_step * self.step_factors[idx];
                let preferred = self.directions[idx];

                let forward = self.trial_coefficient(idx, preferred * step);
                let candidate = if forward < violated {
                    Some((idx, preferred * step, forward))
                } else {
                    let backward = self.trial_coefficient(idx, -preferred * step);
                    if backward < violated {
                        self.directions[idx] = -preferred;
                        Some((idx, -preferred * step, backward))
                    } else {
                        // Neither direction helps: leave the direction
                        // pointing the least-bad way and reset the
                        // term's step factor to neutral.
                        if backward < forward {
                            self.directions[idx] = -preferred;
                        }
                        self.step_factors[idx] = 1.0;
                        None
                    }
                };

                if let Some(c) = candidate {
                    let better = match best {
                        None => true,
                        Some((_, _, best_count)) => c.2 < best_count,
                    };
                    if better {
                        best = Some(c);
                    }
                }
            }

            if let Some((idx, delta, count)) = best {
                let current = self.constraint.coefficient_at(idx);
                self.constraint.set_coefficient_at(idx, current + delta);
                self.step_factors[idx] = (self.step_factors[idx] * self.config.step_growth)
                    .min(self.config.max_step_factor);
                violated = count;
            } else {
                // No term improves: move the whole-constraint offset in
                // the direction that relaxes toward satisfaction.
                let delta = match self.constraint.sign() {
                    Inequality::LessOrEqual => base_step,
                    Inequality::GreaterOrEqual => -base_step,
                };
                let count = self.trial_absolute(delta);
                if count < violated {
                    self.constraint
                        .set_absolute_term(self.constraint.absolute_term() + delta);
                    violated = count;
                }
            }

            if violated < best_seen {
                best_seen = violated;
                stalled_passes = 0;
                plateau_scale = 1.0;
            } else {
                stalled_passes += 1;
                if stalled_passes >= 2 {
                    plateau_scale *= 2.0;
                    stalled_passes = 0;
                }
            }
        }

        debug!(iterations, "coefficient optimization converged");
        OptimizeOutcome {
            converged: true,
            violated_remaining: 0,
            iterations,
        }
    }

    /// Tighten a fully satisfied constraint toward the data.
    ///
    /// First the absolute term is pushed inward (capped by the
    /// smallest point margin, so nothing becomes violated). Then a
    /// shuffled working set of term indices is tightened in small
    /// steps; a step introducing any violation is reverted and the
    /// term is permanently dropped from the set. Runs until the set is
    /// empty or the iteration bound is hit.
    ///
    /// Tightening grows coefficient magnitudes: with the data centered
    /// at the origin that pulls the boundary inward for either sign.
    pub fn squeeze(&mut self, rng: &mut ChaCha8Rng) -> OptimizeOutcome {
        let initially_violated = self.violated_count();
        if initially_violated > 0 {
            warn!(
                violated = initially_violated,
                "squeeze skipped: constraint does not yet satisfy its cluster"
            );
            return OptimizeOutcome {
                converged: false,
                violated_remaining: initially_violated,
                iterations: 0,
            };
        }
        if self.points.is_empty() {
            return OptimizeOutcome {
                converged: true,
                violated_remaining: 0,
                iterations: 0,
            };
        }

        // Inward push, capped by the smallest margin so every cluster
        // point stays satisfied.
        let min_margin = self
            .points
            .iter()
            .map(|p| self.constraint.margin_for_point(p))
            .fold(f64::INFINITY, f64::min);
        let push = self.config.squeeze_offset.min(min_margin).max(0.0);
        let inward = match self.constraint.sign() {
            Inequality::LessOrEqual => -push,
            Inequality::GreaterOrEqual => push,
        };
        self.constraint
            .set_absolute_term(self.constraint.absolute_term() + inward);

        let mut working: Vec<usize> = (0..self.constraint.term_count()).collect();
        working.shuffle(rng);

        let mut iterations = 0;
        let mut capped = false;
        while !working.is_empty() && !capped {
            let mut kept = Vec::with_capacity(working.len());

            for &idx in &working {
                iterations += 1;

                let current = self.constraint.coefficient_at(idx);
                if current == 0.0 {
                    continue; // settled: no magnitude to grow
                }
                let delta = self.config.squeeze_step * current.signum();

                self.constraint.set_coefficient_at(idx, current + delta);
                if self.violated_count() == 0 {
                    kept.push(idx);
                } else {
                    self.constraint.set_coefficient_at(idx, current);
                }

                if iterations >= self.config.max_squeeze_iterations {
                    capped = true;
                    break;
                }
            }

            working = kept;
        }

        if capped {
            warn!(iterations, "squeeze hit the iteration cap");
        }
        OptimizeOutcome {
            converged: !capped && working.is_empty(),
            violated_remaining: 0,
            iterations,
        }
    }

    /// Violation count with the coefficient at `idx` temporarily moved
    /// by `delta`. The saved value is written back verbatim, so the
    /// constraint is numerically identical afterwards.
    fn trial_coefficient(&mut self, idx: usize, delta: f64) -> usize {
        let saved = self.constraint.coefficient_at(idx);
        self.constraint.set_coefficient_at(idx, saved + delta);
        let count = self.violated_count();
        self.constraint.set_coefficient_at(idx, saved);
        count
    }

    /// Violation count with the absolute term temporarily moved by
    /// `delta`; exact-restore like `trial_coefficient`.
    fn trial_absolute(&mut self, delta: f64) -> usize {
        let saved = self.constraint.absolute_term();
        self.constraint.set_absolute_term(saved + delta);
        let count = self.violated_count();
        self.constraint.set_absolute_term(saved);
        count
    }
}
