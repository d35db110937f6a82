//! Error types for clustering operations.

use thiserror::Error;

/// Errors that can occur during clustering and cluster fitting.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Not enough data points for the requested operation.
    #[error("Insufficient data: required {required}, actual {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual data points provided
        actual: usize,
    },

    /// Point dimensionality doesn't match the rest of the set.
    #[error("Dimension mismatch: expected {expected}, actual {actual}")]
    DimensionMismatch {
        /// Expected dimensionality
        expected: usize,
        /// Actual dimensionality provided
        actual: usize,
    },

    /// The cluster's covariance is singular or not positive definite:
    /// no multivariate Gaussian can be fitted, so likelihood-based
    /// statistics (log-likelihood, BIC) are unavailable.
    #[error("Unfittable cluster: {reason}")]
    UnfittableCluster {
        /// What made the fit fail
        reason: String,
    },

    /// Invalid parameter provided.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of what's wrong with the parameter
        message: String,
    },
}

impl ClusterError {
    /// Create an InsufficientData error.
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create an UnfittableCluster error.
    pub fn unfittable(reason: impl Into<String>) -> Self {
        Self::UnfittableCluster {
            reason: reason.into(),
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }
}
