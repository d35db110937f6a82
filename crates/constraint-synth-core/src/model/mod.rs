//! Data model: points, monomial terms, inequality constraints, and the
//! precomputed margin cache.

pub mod constraint;
pub mod linear;
pub mod point;
pub mod satisfaction;
pub mod term;

pub use constraint::{Constraint, Inequality};
pub use linear::LinearConstraint;
pub use point::Point;
pub use satisfaction::ConstraintsSatisfaction;
pub use term::Term;
