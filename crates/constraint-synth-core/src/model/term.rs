//! Sparse monomial over point coordinates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::point::Point;

/// A monomial: a sparse mapping from coordinate index to exponent.
///
/// Indices absent from the mapping have exponent 0, i.e. the variable
/// does not appear. The pipeline only ever builds degree-1 single
/// variable terms (`x_i^1`), but the model evaluates arbitrary
/// polynomial terms.
///
/// An EMPTY term evaluates to 0.0: the constant slot of a constraint is
/// its explicit absolute term, never an empty `Term`.
///
/// Two terms are equal iff their sorted entry lists match; the sorted
/// order also drives the canonical `Display` rendering (`x0^3 x1^2`).
///
/// # Example
///
/// ```
/// use constraint_synth_core::model::{Point, Term};
///
/// let term = Term::linear(1);
/// let p = Point::positive(vec![2.0, 5.0]);
/// assert_eq!(term.value(&p), 5.0);
/// assert_eq!(term.to_string(), "x1^1");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Term {
    exponents: BTreeMap<usize, f64>,
}

impl Term {
    /// Create an empty term (no variables; evaluates to 0.0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the degree-1 term `x_index^1`.
    pub fn linear(index: usize) -> Self {
        Self::new().with_exponent(index, 1.0)
    }

    /// Set the exponent of a variable. An exponent of 0 removes the
    /// variable from the term (it no longer appears).
    #[must_use]
    pub fn with_exponent(mut self, index: usize, exponent: f64) -> Self {
        if exponent == 0.0 {
            self.exponents.remove(&index);
        } else {
            self.exponents.insert(index, exponent);
        }
        self
    }

    /// Exponent of the variable at `index` (0.0 when absent).
    pub fn exponent(&self, index: usize) -> f64 {
        self.exponents.get(&index).copied().unwrap_or(0.0)
    }

    /// Whether the term has no variables.
    pub fn is_empty(&self) -> bool {
        self.exponents.is_empty()
    }

    /// Whether this is a single-variable degree-1 term.
    pub fn is_linear(&self) -> bool {
        self.exponents.len() == 1 && self.exponents.values().all(|&e| e == 1.0)
    }

    /// The variable index of a linear term, if this term is one.
    pub fn linear_index(&self) -> Option<usize> {
        if self.is_linear() {
            self.exponents.keys().next().copied()
        } else {
            None
        }
    }

    /// Evaluate the term at a point: the product of `coord[i]^exp`
    /// over all entries. An empty term evaluates to 0.0.
    pub fn value(&self, point: &Point) -> f64 {
        if self.exponents.is_empty() {
            return 0.0;
        }

        self.exponents
            .iter()
            .fold(1.0, |acc, (&index, &exponent)| {
                acc * point.coord(index).powf(exponent)
            })
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = self
            .exponents
            .iter()
            .map(|(index, exponent)| format!("x{}^{}", index, exponent))
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{}", rendered)
    }
}
