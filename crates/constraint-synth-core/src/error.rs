//! Error types for constraint-synth-core.

use thiserror::Error;

use crate::clustering::ClusterError;

/// Top-level error type for the synthesis pipeline.
#[derive(Debug, Error)]
pub enum SynthError {
    /// The input point sequence was empty.
    #[error("Empty input: at least one labeled point is required")]
    EmptyInput,

    /// Points disagree on dimensionality.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// No positive-labeled point in the input; there is nothing to
    /// bound.
    #[error("No positive points: synthesis requires at least one positive-labeled point")]
    NoPositivePoints,

    /// A stage that needs the initial solution ran before
    /// `generate_initial_solution`.
    #[error("No initial constraints are generated: call generate_initial_solution first")]
    MissingInitialSolution,

    /// Clustering failed.
    #[error("Cluster error: {0}")]
    Cluster(#[from] ClusterError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<config::ConfigError> for SynthError {
    fn from(err: config::ConfigError) -> Self {
        SynthError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SynthError {
    fn from(err: serde_json::Error) -> Self {
        SynthError::Serialization(err.to_string())
    }
}

/// Result type alias for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SynthError::EmptyInput;
        assert!(err.to_string().contains("Empty input"));

        let err = SynthError::DimensionMismatch {
            expected: 3,
            actual: 2,
        };
        assert!(err.to_string().contains("3"));
        assert!(err.to_string().contains("2"));
    }

    #[test]
    fn test_cluster_error_converts() {
        let err: SynthError = ClusterError::insufficient_data(4, 1).into();
        assert!(err.to_string().contains("required 4"));
    }
}
