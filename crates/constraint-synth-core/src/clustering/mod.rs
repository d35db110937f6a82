//! Recursive clustering of the positive point cloud.

pub mod cluster;
pub mod error;
pub mod gaussian;
pub mod kmeans;
pub mod xmeans;

pub use cluster::Cluster;
pub use error::ClusterError;
pub use gaussian::{standard_normal_cdf, MultivariateGaussian};
pub use kmeans::{kmeans, KMeansOutcome};
pub use xmeans::{XMeans, MIN_SPLITTABLE_SIZE};
