//! Precomputed margin matrix over frozen constraint and point snapshots.

use super::linear::LinearConstraint;
use super::point::Point;

/// Dense `[n_constraints][n_points]` matrix of signed margins.
///
/// Built once over a fixed snapshot of constraints and sample points
/// and queried repeatedly by the redundancy finder. The matrix is never
/// mutated in place: [`reduce`](ConstraintsSatisfaction::reduce)
/// rebuilds it consistently with the reduced point list.
pub struct ConstraintsSatisfaction {
    constraints: Vec<LinearConstraint>,
    points: Vec<Point>,
    margins: Vec<Vec<f64>>,
}

impl ConstraintsSatisfaction {
    /// Compute the margin of every constraint against every point.
    pub fn new(constraints: &[LinearConstraint], points: Vec<Point>) -> Self {
        let margins = constraints
            .iter()
            .map(|constraint| {
                points
                    .iter()
                    .map(|point| constraint.margin_for_point(point))
                    .collect()
            })
            .collect();

        Self {
            constraints: constraints.to_vec(),
            points,
            margins,
        }
    }

    /// Number of constraints in the snapshot.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of sample points currently retained.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// The retained sample points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Margin of constraint `ci` against point `pi`.
    #[inline]
    pub fn margin(&self, ci: usize, pi: usize) -> f64 {
        self.margins[ci][pi]
    }

    /// Index of a constraint equal (coefficients, absolute term, sign)
    /// to the given one, if present in the snapshot.
    pub fn index_of(&self, constraint: &LinearConstraint) -> Option<usize> {
        self.constraints.iter().position(|c| {
            c.sign() == constraint.sign()
                && c.absolute_term() == constraint.absolute_term()
                && c.coefficients() == constraint.coefficients()
        })
    }

    /// Indices of points satisfying constraint `ci`.
    pub fn satisfying_indices(&self, ci: usize) -> Vec<usize> {
        self.indices_where(ci, |margin| margin >= 0.0)
    }

    /// Indices of points violating constraint `ci`.
    pub fn violating_indices(&self, ci: usize) -> Vec<usize> {
        self.indices_where(ci, |margin| margin < 0.0)
    }

    fn indices_where(&self, ci: usize, condition: impl Fn(f64) -> bool) -> Vec<usize> {
        self.margins[ci]
            .iter()
            .enumerate()
            .filter(|(_, &margin)| condition(margin))
            .map(|(index, _)| index)
            .collect()
    }

    /// Drop sample points satisfied by all constraints or violated by
    /// all constraints: they carry no discriminating information for
    /// redundancy decisions. The margin matrix is rebuilt to stay
    /// consistent with the reduced point list. Returns the number of
    /// points dropped.
    pub fn reduce(&mut self) -> usize {
        if self.constraints.is_empty() {
            return 0;
        }

        let keep: Vec<usize> = (0..self.points.len())
            .filter(|&pi| {
                let satisfied = self
                    .margins
                    .iter()
                    .filter(|row| row[pi] >= 0.0)
                    .count();
                satisfied != 0 && satisfied != self.constraints.len()
            })
            .collect();

        let dropped = self.points.len() - keep.len();
        if dropped == 0 {
            return 0;
        }

        self.points = keep.iter().map(|&pi| self.points[pi].clone()).collect();
        self.margins = self
            .margins
            .iter()
            .map(|row| keep.iter().map(|&pi| row[pi]).collect())
            .collect();

        dropped
    }
}
