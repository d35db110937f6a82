//! Configuration for the synthesis pipeline.
//!
//! All randomness flows from the single `seed`; given the same seed and
//! input the whole run is deterministic.

use serde::{Deserialize, Serialize};

use crate::error::{SynthError, SynthResult};
use crate::synthesis::generators::SamplingMode;
use crate::synthesis::metric::UtilityMetric;

/// Main configuration structure.
///
/// # Example
///
/// ```
/// use constraint_synth_core::config::SynthConfig;
///
/// let config = SynthConfig::default().with_seed(7);
/// assert_eq!(config.seed, 7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Master seed for every random source in the pipeline.
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub clustering: ClusteringConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub redundancy: RedundancyConfig,
}

fn default_seed() -> u64 {
    42
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            clustering: ClusteringConfig::default(),
            generator: GeneratorConfig::default(),
            optimizer: OptimizerConfig::default(),
            redundancy: RedundancyConfig::default(),
        }
    }
}

impl SynthConfig {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in order:
    /// 1. config/default.toml (base settings)
    /// 2. Environment variables with CONSTRAINT_SYNTH_ prefix
    pub fn load() -> SynthResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("CONSTRAINT_SYNTH").separator("__"));

        let config: SynthConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> SynthResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path));

        let config: SynthConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Set the master seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// `SynthError::Config` naming the offending field.
    pub fn validate(&self) -> SynthResult<()> {
        self.clustering.validate()?;
        self.generator.validate()?;
        self.optimizer.validate()?;
        self.redundancy.validate()?;
        Ok(())
    }
}

/// X-means parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Minimum cluster count of the initial partition.
    pub min_k: usize,
    /// Z-score normalization of the k-means assignment.
    pub normalize: bool,
    /// Skip splitting entirely and treat the input as one cluster.
    pub enforce_single_cluster: bool,
    /// Lloyd iteration cap per k-means run.
    pub max_iterations: usize,
    /// Centroid-shift convergence tolerance.
    pub tolerance: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_k: 1,
            normalize: true,
            enforce_single_cluster: false,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

impl ClusteringConfig {
    /// Validate parameters.
    pub fn validate(&self) -> SynthResult<()> {
        if self.min_k == 0 {
            return Err(SynthError::Config(
                "clustering.min_k must be >= 1; an empty partition is meaningless".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(SynthError::Config(
                "clustering.max_iterations must be >= 1".into(),
            ));
        }
        if !(self.tolerance > 0.0) {
            return Err(SynthError::Config(format!(
                "clustering.tolerance must be > 0, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Random candidate constraint generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of random candidate constraints per cluster.
    pub count: usize,
    /// Std-dev of the isotropic normal coefficient draw.
    pub coefficient_std_dev: f64,
    /// Hyperplane sampling mode.
    pub sampling: SamplingMode,
    /// Squeeze iterations over clones of the initial box constraints.
    pub improve_iterations: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: 100,
            coefficient_std_dev: 1.0,
            sampling: SamplingMode::ThroughPoint,
            improve_iterations: 1,
        }
    }
}

impl GeneratorConfig {
    /// Validate parameters.
    pub fn validate(&self) -> SynthResult<()> {
        if !(self.coefficient_std_dev > 0.0) || !self.coefficient_std_dev.is_finite() {
            return Err(SynthError::Config(format!(
                "generator.coefficient_std_dev must be > 0 and finite, got {}",
                self.coefficient_std_dev
            )));
        }
        Ok(())
    }
}

/// Local-search optimizer parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Floor of the adaptive trial step.
    pub min_step: f64,
    /// Per-term step factor growth applied on an accepted move.
    pub step_growth: f64,
    /// Cap of the per-term step factor.
    pub max_step_factor: f64,
    /// Hard bound on coefficient-optimization iterations; hitting it
    /// surfaces a best-effort, non-converged outcome.
    pub max_iterations: usize,
    /// Fixed inward push of the absolute term at the start of squeeze.
    pub squeeze_offset: f64,
    /// Per-term tightening step during squeeze.
    pub squeeze_step: f64,
    /// Hard bound on squeeze tightening attempts.
    pub max_squeeze_iterations: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            min_step: 1e-3,
            step_growth: 1.5,
            max_step_factor: 64.0,
            max_iterations: 10_000,
            squeeze_offset: 0.1,
            squeeze_step: 0.01,
            max_squeeze_iterations: 10_000,
        }
    }
}

impl OptimizerConfig {
    /// Validate parameters.
    pub fn validate(&self) -> SynthResult<()> {
        if !(self.min_step > 0.0) || !self.min_step.is_finite() {
            return Err(SynthError::Config(format!(
                "optimizer.min_step must be > 0 and finite, got {}",
                self.min_step
            )));
        }
        if self.step_growth < 1.0 {
            return Err(SynthError::Config(format!(
                "optimizer.step_growth must be >= 1, got {}",
                self.step_growth
            )));
        }
        if self.max_step_factor < 1.0 {
            return Err(SynthError::Config(format!(
                "optimizer.max_step_factor must be >= 1, got {}",
                self.max_step_factor
            )));
        }
        if self.max_iterations == 0 || self.max_squeeze_iterations == 0 {
            return Err(SynthError::Config(
                "optimizer iteration caps must be >= 1; the caps are what bound the local search"
                    .into(),
            ));
        }
        if !(self.squeeze_step > 0.0) || !(self.squeeze_offset >= 0.0) {
            return Err(SynthError::Config(format!(
                "optimizer.squeeze_step must be > 0 and squeeze_offset >= 0, got {} / {}",
                self.squeeze_step, self.squeeze_offset
            )));
        }
        Ok(())
    }
}

/// Redundancy elimination parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedundancyConfig {
    /// Number of uniform sample points drawn around the cluster.
    pub sample_size: usize,
    /// Bounding-box expansion fraction for sampling.
    pub margin_expansion: f64,
    /// Directional similarity threshold in degrees.
    pub angle_threshold_degrees: f64,
    /// Utility metric ranking constraints inside a similarity group.
    pub metric: UtilityMetric,
}

impl Default for RedundancyConfig {
    fn default() -> Self {
        Self {
            sample_size: 1000,
            margin_expansion: 0.5,
            angle_threshold_degrees: 5.0,
            metric: UtilityMetric::default(),
        }
    }
}

impl RedundancyConfig {
    /// Validate parameters.
    pub fn validate(&self) -> SynthResult<()> {
        if self.sample_size == 0 {
            return Err(SynthError::Config(
                "redundancy.sample_size must be >= 1; redundancy decisions need samples".into(),
            ));
        }
        if self.margin_expansion < 0.0 {
            return Err(SynthError::Config(format!(
                "redundancy.margin_expansion must be >= 0, got {}",
                self.margin_expansion
            )));
        }
        if !(self.angle_threshold_degrees > 0.0) || self.angle_threshold_degrees >= 90.0 {
            return Err(SynthError::Config(format!(
                "redundancy.angle_threshold_degrees must be in (0, 90), got {}",
                self.angle_threshold_degrees
            )));
        }
        Ok(())
    }
}
