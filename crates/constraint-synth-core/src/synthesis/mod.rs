//! Constraint synthesis: candidate generation, local-search
//! optimization, redundancy elimination, and per-cluster orchestration.

pub mod generators;
pub mod metric;
pub mod optimizer;
pub mod redundancy;
pub mod solution;

pub use generators::{
    generate_initial_constraints, generate_random_constraints, SamplingMode,
};
pub use metric::UtilityMetric;
pub use optimizer::{optimize, ConstraintOptimizer, OptimizeOutcome, OptimizeSteps};
pub use redundancy::RedundantConstraintFinder;
pub use solution::{cluster_points, synthesize, ClusterStats, Solution, Synthesis};
