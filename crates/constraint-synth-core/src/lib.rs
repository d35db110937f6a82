//! Constraint Synthesis Core Library
//!
//! Synthesizes a set of linear inequality constraints that tightly
//! bound a cloud of labeled points in R^n: positive points satisfy the
//! derived constraint system, negative points should violate at least
//! one constraint. The output approximates an unknown shape as a
//! disjunction of convex regions, one per cluster.
//!
//! # Pipeline
//!
//! 1. X-means clusters the positive point cloud, accepting a split
//!    only when it improves the BIC ([`clustering`]).
//! 2. Per cluster, the axis-aligned bounding box seeds a feasible
//!    constraint set and random hyperplanes provide candidates
//!    ([`synthesis::generators`]).
//! 3. A derivative-free local search turns each candidate into a
//!    constraint satisfied by every cluster point, then squeezes it
//!    toward the data ([`synthesis::optimizer`]).
//! 4. Directionally near-duplicate constraints collapse to the most
//!    useful representative ([`synthesis::redundancy`]).
//!
//! # Example
//!
//! ```
//! use constraint_synth_core::config::SynthConfig;
//! use constraint_synth_core::model::Point;
//! use constraint_synth_core::synthesis::synthesize;
//!
//! let points = vec![
//!     Point::positive(vec![0.0, 0.0]),
//!     Point::positive(vec![1.0, 0.0]),
//!     Point::positive(vec![0.0, 1.0]),
//!     Point::positive(vec![1.0, 1.0]),
//! ];
//!
//! let config = SynthConfig::default().with_seed(42);
//! let synthesis = synthesize(&points, &config).unwrap();
//!
//! assert_eq!(synthesis.disjunct_count(), 1);
//! assert!(synthesis.contains(&Point::positive(vec![0.5, 0.5])));
//! ```

pub mod clustering;
pub mod config;
pub mod error;
pub mod model;
pub mod synthesis;

// Re-exports for convenience
pub use config::SynthConfig;
pub use error::{SynthError, SynthResult};
pub use model::{Constraint, Inequality, LinearConstraint, Point, Term};
pub use synthesis::{synthesize, Synthesis};
