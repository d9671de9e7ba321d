//! Translation run configuration

use itemgraph_store::BatchConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{check_version, ConfigError, ConfigResult};

/// Default target model namespace
pub const DEFAULT_TARGET_NAMESPACE: &str = "http://www.flymine.org/model/genomic#";

/// Phase-1 worker pool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParallelConfig {
    /// Number of workers (0=auto, 1..=256)
    pub num_workers: usize,

    /// Items translated per window before non-deferred output is emitted (1..=100000)
    pub batch_size: usize,
}

impl ParallelConfig {
    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.num_workers > 256 {
            return Err(ConfigError::range_with_hint(
                "parallel.num_workers",
                self.num_workers,
                0,
                256,
                "Number of workers must be reasonable (0=auto)",
            ));
        }

        if self.batch_size < 1 || self.batch_size > 100_000 {
            return Err(ConfigError::range_with_hint(
                "parallel.batch_size",
                self.batch_size,
                1,
                100_000,
                "Window size bounds how many finished items wait before reaching the sink",
            ));
        }

        Ok(())
    }

    /// Worker count with `0` resolved to the number of CPUs
    pub fn effective_workers(&self) -> usize {
        if self.num_workers == 0 {
            num_cpus::get()
        } else {
            self.num_workers
        }
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: 0, // Auto
            batch_size: 1000,
        }
    }
}

/// Complete configuration of a translation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslationConfig {
    /// Schema version (always 1)
    pub version: u32,

    /// Namespace prepended to every target class name
    #[serde(default = "default_target_namespace")]
    pub target_namespace: String,

    #[serde(default)]
    pub parallel: ParallelConfig,

    /// Background writer batching
    #[serde(default)]
    pub writer: BatchConfig,
}

fn default_target_namespace() -> String {
    DEFAULT_TARGET_NAMESPACE.to_string()
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            version: 1,
            target_namespace: default_target_namespace(),
            parallel: ParallelConfig::default(),
            writer: BatchConfig::default(),
        }
    }
}

impl TranslationConfig {
    /// Load and validate a YAML configuration file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        check_version(content)?;
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        serde_yaml::to_string(self).map_err(ConfigError::Yaml)
    }

    pub fn with_target_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.target_namespace = namespace.into();
        self
    }

    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.parallel.num_workers = num_workers;
        self
    }

    pub fn with_window(mut self, batch_size: usize) -> Self {
        self.parallel.batch_size = batch_size;
        self
    }

    /// Validate every section
    pub fn validate(&self) -> ConfigResult<()> {
        if self.version != 1 {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
                supported: vec![1],
            });
        }

        if !self.target_namespace.ends_with('#') {
            return Err(ConfigError::validation(format!(
                "target_namespace '{}' must end with '#'",
                self.target_namespace
            )));
        }

        self.parallel.validate()?;

        if self.writer.batch_size < 1 || self.writer.batch_size > 1_000_000 {
            return Err(ConfigError::range_with_hint(
                "writer.batch_size",
                self.writer.batch_size,
                1,
                1_000_000,
                "Items per sink batch",
            ));
        }
        if self.writer.pipe_length < 1 || self.writer.pipe_length > 64 {
            return Err(ConfigError::range_with_hint(
                "writer.pipe_length",
                self.writer.pipe_length,
                1,
                64,
                "Batches queued for the background writer",
            ));
        }
        self.writer
            .validate()
            .map_err(|e| ConfigError::validation(e.message))?;

        Ok(())
    }
}
