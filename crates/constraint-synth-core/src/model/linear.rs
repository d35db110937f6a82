//! Linear (degree-1) constraint specialization.

use serde::{Deserialize, Serialize};

use super::constraint::{Constraint, Inequality};
use super::point::Point;
use super::term::Term;

/// A linear inequality `Σ coefficient_i·x_i {≤|≥} absolute_term`.
///
/// Wraps a [`Constraint`] that carries exactly one degree-1 term per
/// axis, in axis order, so coefficients can be addressed by axis index.
/// The whole pipeline runs on linear constraints; the generic
/// [`Constraint`] evaluation, margin, and optimizer machinery operate
/// on the wrapped value.
///
/// Cloning is an explicit value copy: the clone shares no substructure
/// with the original.
///
/// # Example
///
/// ```
/// use constraint_synth_core::model::{Inequality, LinearConstraint, Point};
///
/// // x0 - x1 <= 2, fitted on mean-subtracted coordinates,
/// // translated back by the cluster mean (3, 1):
/// let mut c = LinearConstraint::new(vec![1.0, -1.0], 2.0);
/// c.translate(&[3.0, 1.0]);
/// assert_eq!(c.absolute_term(), 4.0);
/// assert!(c.is_satisfying(&Point::positive(vec![5.0, 1.0])));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearConstraint {
    constraint: Constraint,
    dims: usize,
}

impl LinearConstraint {
    /// Create a `≤` constraint from per-axis coefficients.
    pub fn new(coefficients: Vec<f64>, absolute_term: f64) -> Self {
        Self::with_sign(coefficients, absolute_term, Inequality::LessOrEqual)
    }

    /// Create a constraint from per-axis coefficients with an explicit
    /// sign.
    pub fn with_sign(coefficients: Vec<f64>, absolute_term: f64, sign: Inequality) -> Self {
        let dims = coefficients.len();
        let mut constraint = Constraint::with_sign(sign);

        for (axis, coefficient) in coefficients.into_iter().enumerate() {
            constraint.set_term(Term::linear(axis), coefficient);
        }
        constraint.set_absolute_term(absolute_term);

        Self { constraint, dims }
    }

    /// An axis-aligned bound `x_axis {≤|≥} bound` in `dims` dimensions
    /// (all other coefficients zero).
    pub fn axis_bound(axis: usize, dims: usize, bound: f64, sign: Inequality) -> Self {
        let mut coefficients = vec![0.0; dims];
        coefficients[axis] = 1.0;
        Self::with_sign(coefficients, bound, sign)
    }

    /// Dimensionality (number of per-axis terms).
    #[inline]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Coefficient of axis `i`.
    #[inline]
    pub fn coefficient(&self, axis: usize) -> f64 {
        self.constraint.coefficient_at(axis)
    }

    /// Overwrite the coefficient of axis `i`.
    #[inline]
    pub fn set_coefficient(&mut self, axis: usize, coefficient: f64) {
        self.constraint.set_coefficient_at(axis, coefficient);
    }

    /// The per-axis coefficient vector.
    pub fn coefficients(&self) -> Vec<f64> {
        (0..self.dims).map(|i| self.coefficient(i)).collect()
    }

    /// Re-center a constraint fitted on centralized (mean-subtracted)
    /// coordinates back into original coordinate space:
    /// `absolute_term += Σ coefficient_i · offset_i`.
    pub fn translate(&mut self, offset: &[f64]) {
        debug_assert_eq!(offset.len(), self.dims);

        let shift: f64 = (0..self.dims)
            .map(|i| self.coefficient(i) * offset[i])
            .sum();
        self.constraint
            .set_absolute_term(self.constraint.absolute_term() + shift);
    }

    /// The wrapped generic constraint.
    #[inline]
    pub fn as_constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// Mutable access to the wrapped constraint for the optimizer.
    #[inline]
    pub fn as_constraint_mut(&mut self) -> &mut Constraint {
        &mut self.constraint
    }

    // Forwards of the operations callers use most; the full surface is
    // on `as_constraint()`.

    /// See [`Constraint::absolute_term`].
    #[inline]
    pub fn absolute_term(&self) -> f64 {
        self.constraint.absolute_term()
    }

    /// See [`Constraint::sign`].
    #[inline]
    pub fn sign(&self) -> Inequality {
        self.constraint.sign()
    }

    /// See [`Constraint::invert_sign`].
    pub fn invert_sign(&mut self) {
        self.constraint.invert_sign();
    }

    /// See [`Constraint::value_for_point`].
    pub fn value_for_point(&self, point: &Point) -> f64 {
        self.constraint.value_for_point(point)
    }

    /// See [`Constraint::margin_for_point`].
    pub fn margin_for_point(&self, point: &Point) -> f64 {
        self.constraint.margin_for_point(point)
    }

    /// See [`Constraint::is_satisfying`].
    pub fn is_satisfying(&self, point: &Point) -> bool {
        self.constraint.is_satisfying(point)
    }

    /// See [`Constraint::distance_from_point`].
    pub fn distance_from_point(&self, point: &Point) -> f64 {
        self.constraint.distance_from_point(point)
    }

    /// See [`Constraint::is_redundant`].
    #[inline]
    pub fn is_redundant(&self) -> bool {
        self.constraint.is_redundant()
    }

    /// See [`Constraint::mark_redundant`].
    pub fn mark_redundant(&mut self) {
        self.constraint.mark_redundant();
    }

    /// See [`Constraint::clear_redundant`].
    pub fn clear_redundant(&mut self) {
        self.constraint.clear_redundant();
    }
}

impl std::fmt::Display for LinearConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.constraint)
    }
}
