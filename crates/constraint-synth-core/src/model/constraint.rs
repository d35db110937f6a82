//! Weighted sum-of-monomials inequality.

use serde::{Deserialize, Serialize};

use super::point::Point;
use super::term::Term;

/// Relational operator of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Inequality {
    /// `Σ coefficient·term ≤ absolute_term`
    #[default]
    LessOrEqual,
    /// `Σ coefficient·term ≥ absolute_term`
    GreaterOrEqual,
}

impl Inequality {
    /// The opposite operator.
    #[must_use]
    pub fn invert(self) -> Self {
        match self {
            Inequality::LessOrEqual => Inequality::GreaterOrEqual,
            Inequality::GreaterOrEqual => Inequality::LessOrEqual,
        }
    }
}

impl std::fmt::Display for Inequality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Inequality::LessOrEqual => write!(f, "<="),
            Inequality::GreaterOrEqual => write!(f, ">="),
        }
    }
}

/// A polynomial inequality: `Σ coefficient·term {≤|≥} absolute_term`.
///
/// Terms are stored as an ordered list of (term, coefficient) pairs so
/// that per-term optimizer state can live in plain index-parallel
/// arrays. A term appears at most once; `set_term` overwrites the
/// coefficient of an existing equal term.
///
/// The `redundant` flag is a soft delete set by the redundancy finder:
/// flagged constraints stay in place during the finding pass and are
/// only dropped when the final constraint set is assembled.
///
/// # Example
///
/// ```
/// use constraint_synth_core::model::{Constraint, Inequality, Point, Term};
///
/// // x0 + 2*x1 <= 10
/// let mut c = Constraint::new();
/// c.set_term(Term::linear(0), 1.0);
/// c.set_term(Term::linear(1), 2.0);
/// c.set_absolute_term(10.0);
///
/// let inside = Point::positive(vec![1.0, 1.0]);
/// let outside = Point::positive(vec![10.0, 10.0]);
/// assert!(c.is_satisfying(&inside));
/// assert!(!c.is_satisfying(&outside));
/// assert_eq!(c.margin_for_point(&inside), 7.0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Constraint {
    terms: Vec<(Term, f64)>,
    absolute_term: f64,
    sign: Inequality,
    redundant: bool,
}

impl Constraint {
    /// Create an empty `≤` constraint with absolute term 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty constraint with the given sign.
    pub fn with_sign(sign: Inequality) -> Self {
        Self {
            sign,
            ..Self::default()
        }
    }

    /// Number of terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// The ordered (term, coefficient) pairs.
    pub fn terms(&self) -> &[(Term, f64)] {
        &self.terms
    }

    /// Set the coefficient of a term, appending it when not yet present.
    pub fn set_term(&mut self, term: Term, coefficient: f64) {
        if let Some(entry) = self.terms.iter_mut().find(|(t, _)| *t == term) {
            entry.1 = coefficient;
        } else {
            self.terms.push((term, coefficient));
        }
    }

    /// Coefficient of the term at `index` in the term list.
    #[inline]
    pub fn coefficient_at(&self, index: usize) -> f64 {
        self.terms[index].1
    }

    /// Overwrite the coefficient of the term at `index`.
    #[inline]
    pub fn set_coefficient_at(&mut self, index: usize, coefficient: f64) {
        self.terms[index].1 = coefficient;
    }

    /// Coefficient of an equal term, if present.
    pub fn coefficient_of(&self, term: &Term) -> Option<f64> {
        self.terms
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, c)| *c)
    }

    /// The constant right-hand side.
    #[inline]
    pub fn absolute_term(&self) -> f64 {
        self.absolute_term
    }

    /// Overwrite the constant right-hand side.
    #[inline]
    pub fn set_absolute_term(&mut self, value: f64) {
        self.absolute_term = value;
    }

    /// The relational operator.
    #[inline]
    pub fn sign(&self) -> Inequality {
        self.sign
    }

    /// Left-hand-side value at a point: `Σ coefficient·term.value(p)`.
    pub fn value_for_point(&self, point: &Point) -> f64 {
        self.terms
            .iter()
            .map(|(term, coefficient)| coefficient * term.value(point))
            .sum()
    }

    /// Signed distance-to-satisfaction. Non-negative iff the point
    /// satisfies the constraint: for `≤` it is `absolute − value`, for
    /// `≥` it is `value − absolute`.
    pub fn margin_for_point(&self, point: &Point) -> f64 {
        let value = self.value_for_point(point);
        match self.sign {
            Inequality::LessOrEqual => self.absolute_term - value,
            Inequality::GreaterOrEqual => value - self.absolute_term,
        }
    }

    /// Whether the point satisfies the constraint.
    #[inline]
    pub fn is_satisfying(&self, point: &Point) -> bool {
        self.margin_for_point(point) >= 0.0
    }

    /// Flip the relational operator without touching coefficients.
    /// This changes which points are considered satisfying.
    pub fn invert_sign(&mut self) {
        self.sign = self.sign.invert();
    }

    /// Convert a `≥` constraint into the equivalent `≤` constraint by
    /// negating every coefficient and the absolute term. Idempotent:
    /// `≤` constraints are left untouched.
    pub fn canonicalize_less_or_equal(&mut self) {
        if self.sign == Inequality::LessOrEqual {
            return;
        }

        for entry in &mut self.terms {
            entry.1 = -entry.1;
        }
        self.absolute_term = -self.absolute_term;
        self.sign = Inequality::LessOrEqual;
    }

    /// Euclidean distance from a point to the hyperplane
    /// `Σ coefficient·term = absolute_term`:
    /// `|value(p) − absolute| / ‖coefficients‖`.
    ///
    /// Returns 0.0 for the degenerate all-zero coefficient vector.
    pub fn distance_from_point(&self, point: &Point) -> f64 {
        let norm = self
            .terms
            .iter()
            .map(|(_, c)| c * c)
            .sum::<f64>()
            .sqrt();

        if norm == 0.0 {
            return 0.0;
        }

        (self.value_for_point(point) - self.absolute_term).abs() / norm
    }

    /// Whether the redundancy finder has flagged this constraint.
    #[inline]
    pub fn is_redundant(&self) -> bool {
        self.redundant
    }

    /// Soft-delete: flag as redundant.
    pub fn mark_redundant(&mut self) {
        self.redundant = true;
    }

    /// Rescue a provisionally flagged constraint.
    pub fn clear_redundant(&mut self) {
        self.redundant = false;
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lhs = self
            .terms
            .iter()
            .filter(|(_, coefficient)| coefficient.abs() > f64::EPSILON)
            .map(|(term, coefficient)| format!("{} * {}", coefficient, term))
            .collect::<Vec<_>>()
            .join(" + ");

        if lhs.is_empty() {
            write!(f, "0 {} {}", self.sign, self.absolute_term)
        } else {
            write!(f, "{} {} {}", lhs, self.sign, self.absolute_term)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_constraint(coefficients: &[f64], absolute_term: f64) -> Constraint {
        let mut c = Constraint::new();
        for (i, &coefficient) in coefficients.iter().enumerate() {
            c.set_term(Term::linear(i), coefficient);
        }
        c.set_absolute_term(absolute_term);
        c
    }

    // =========================================================================
    // SATISFACTION / MARGIN TESTS
    // =========================================================================

    #[test]
    fn test_satisfaction_polynomial() {
        // 2 * x0^3 <= 2 at (2, 3, 3): 16 <= 2 is false
        let mut c = Constraint::new();
        c.set_term(Term::new().with_exponent(0, 3.0), 2.0);
        c.set_absolute_term(2.0);

        let p = Point::positive(vec![2.0, 3.0, 3.0]);
        assert!(!c.is_satisfying(&p));
    }

    #[test]
    fn test_satisfaction_multi_term_polynomial() {
        // -4.5 * x0^3 x1^2 x2^1 + 1.5 * x0^2 x1^1 <= -3.2 at (2, 3, 3)
        // = -4.5*216 + 1.5*12 = -972 + 18 = -954 <= -3.2 is true
        let mut c = Constraint::new();
        c.set_term(
            Term::new()
                .with_exponent(0, 3.0)
                .with_exponent(1, 2.0)
                .with_exponent(2, 1.0),
            -4.5,
        );
        c.set_term(Term::new().with_exponent(0, 2.0).with_exponent(1, 1.0), 1.5);
        c.set_absolute_term(-3.2);

        let p = Point::positive(vec![2.0, 3.0, 3.0]);
        assert!(c.is_satisfying(&p));
    }

    #[test]
    fn test_margin_matches_satisfaction() {
        let c = linear_constraint(&[1.0, -2.0], 4.0);
        let points = [
            Point::positive(vec![0.0, 0.0]),
            Point::positive(vec![10.0, 0.0]),
            Point::positive(vec![4.0, 0.0]),
            Point::negative(vec![-3.0, 7.5]),
        ];

        for p in &points {
            assert_eq!(
                c.is_satisfying(p),
                c.margin_for_point(p) >= 0.0,
                "margin sign must agree with satisfaction for {}",
                p
            );
        }
    }

    #[test]
    fn test_margin_sign_conventions() {
        // x0 <= 4: margin at x0=1 is 3; x0 >= 4: margin at x0=1 is -3
        let mut c = linear_constraint(&[1.0], 4.0);
        let p = Point::positive(vec![1.0]);
        assert_eq!(c.margin_for_point(&p), 3.0);

        c.invert_sign();
        assert_eq!(c.margin_for_point(&p), -3.0);
    }

    // =========================================================================
    // SIGN INVERSION / CANONICALIZATION TESTS
    // =========================================================================

    #[test]
    fn test_invert_sign_is_involutive() {
        let mut c = linear_constraint(&[1.0, -2.0, 1.543, -0.23423], 6.43);
        let p = Point::positive(vec![1.0, 1.0, 1.0, 1.0]);
        let satisfied_before = c.is_satisfying(&p);

        c.invert_sign();
        c.invert_sign();

        assert_eq!(c.sign(), Inequality::LessOrEqual);
        assert_eq!(c.is_satisfying(&p), satisfied_before);
    }

    #[test]
    fn test_canonicalize_negates_everything() {
        let mut c = linear_constraint(&[1.0, -2.0, 1.543, -0.23423], 6.43);
        c.invert_sign(); // now >=
        c.canonicalize_less_or_equal();

        assert_eq!(c.sign(), Inequality::LessOrEqual);
        assert_eq!(c.coefficient_at(0), -1.0);
        assert_eq!(c.coefficient_at(1), 2.0);
        assert_eq!(c.absolute_term(), -6.43);
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let mut once = linear_constraint(&[2.0, -1.0], -3.0);
        once.invert_sign();
        once.canonicalize_less_or_equal();

        let mut twice = once.clone();
        twice.canonicalize_less_or_equal();

        assert_eq!(once.coefficient_at(0), twice.coefficient_at(0));
        assert_eq!(once.coefficient_at(1), twice.coefficient_at(1));
        assert_eq!(once.absolute_term(), twice.absolute_term());
        assert_eq!(once.sign(), twice.sign());
    }

    #[test]
    fn test_canonicalize_preserves_satisfied_set() {
        let mut c = linear_constraint(&[1.0, 2.0], 3.0);
        c.invert_sign();

        let points = [
            Point::positive(vec![5.0, 5.0]),
            Point::positive(vec![0.0, 0.0]),
            Point::positive(vec![1.0, 1.0]),
        ];
        let before: Vec<bool> = points.iter().map(|p| c.is_satisfying(p)).collect();

        c.canonicalize_less_or_equal();
        let after: Vec<bool> = points.iter().map(|p| c.is_satisfying(p)).collect();

        assert_eq!(before, after);
    }

    // =========================================================================
    // TERM STORAGE TESTS
    // =========================================================================

    #[test]
    fn test_set_term_overwrites_equal_term() {
        let mut c = Constraint::new();
        c.set_term(Term::linear(0), 1.0);
        c.set_term(Term::linear(0), 2.5);

        assert_eq!(c.term_count(), 1);
        assert_eq!(c.coefficient_of(&Term::linear(0)), Some(2.5));
    }

    #[test]
    fn test_distance_from_point() {
        // x0 <= 4 is the hyperplane x0 = 4; distance from x0 = 1 is 3
        let c = linear_constraint(&[1.0], 4.0);
        let p = Point::positive(vec![1.0]);
        assert!((c.distance_from_point(&p) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_redundancy_flag_is_soft() {
        let mut c = linear_constraint(&[1.0], 0.0);
        assert!(!c.is_redundant());

        c.mark_redundant();
        assert!(c.is_redundant());
        assert_eq!(c.term_count(), 1, "flagging must not remove terms");

        c.clear_redundant();
        assert!(!c.is_redundant());
    }

    // =========================================================================
    // DISPLAY TESTS
    // =========================================================================

    #[test]
    fn test_display_elides_zero_coefficients() {
        let mut c = Constraint::new();
        c.set_term(
            Term::new().with_exponent(0, 3.0).with_exponent(2, 1.0),
            -4.5,
        );
        c.set_term(Term::new().with_exponent(0, 2.0).with_exponent(1, 1.0), 0.0);
        c.set_absolute_term(-3.2);

        assert_eq!(c.to_string(), "-4.5 * x0^3 x2^1 <= -3.2");
    }

    #[test]
    fn test_display_full_inequality() {
        let mut c = linear_constraint(&[2.0, 1.5], 3.2);
        c.invert_sign();
        assert_eq!(c.to_string(), "2 * x0^1 + 1.5 * x1^1 >= 3.2");
    }
}
