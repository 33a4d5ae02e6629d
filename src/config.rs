//! Configuration System
//!
//! Layered configuration: built-in defaults, the global config file, an
//! explicit `--config` file, then `TREESYNC_*` environment variables. CLI
//! flags are applied on top by the binary.

use crate::diff::DiffOptions;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::tree::builder::BuildConfig;
use crate::tree::hasher::{ContentHasher, DEFAULT_CHUNK_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

mod merge;
mod sources;

pub use sources::global_file::global_config_path;

/// Largest accepted read size
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreesyncConfig {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub hashing: HashingConfig,

    #[serde(default)]
    pub diff: DiffOptions,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hashing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingConfig {
    /// Read size in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Give up on a scan running longer than this
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            timeout_secs: None,
        }
    }
}

impl HashingConfig {
    /// Deadline for a run starting at `start`, if a timeout is configured.
    pub fn deadline_from(&self, start: Instant) -> Option<Instant> {
        self.timeout_secs
            .map(|secs| start + Duration::from_secs(secs))
    }

    /// Hasher configured with this chunk size and an optional deadline.
    pub fn hasher(&self, deadline: Option<Instant>) -> ContentHasher {
        let hasher = ContentHasher::new().with_chunk_size(self.chunk_size);
        match deadline {
            Some(deadline) => hasher.with_deadline(deadline),
            None => hasher,
        }
    }
}

impl TreesyncConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();

        if self.hashing.chunk_size == 0 || self.hashing.chunk_size > MAX_CHUNK_SIZE {
            errors.push(format!(
                "hashing.chunk_size must be between 1 and {} (got {})",
                MAX_CHUNK_SIZE, self.hashing.chunk_size
            ));
        }
        if self.hashing.timeout_secs == Some(0) {
            errors.push("hashing.timeout_secs must be positive".to_string());
        }
        if self.build.ignore.iter().any(|name| name.is_empty()) {
            errors.push("build.ignore entries cannot be empty".to_string());
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            errors.push(format!("logging.format '{}' is invalid", self.logging.format));
        }
        if !matches!(self.logging.output.as_str(), "stdout" | "stderr" | "file") {
            errors.push(format!("logging.output '{}' is invalid", self.logging.output));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ConfigError(errors.join("; ")))
        }
    }
}

/// Loads `TreesyncConfig` from the layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, the global file, `explicit` (must exist when given)
    /// and environment overrides, then validate.
    pub fn load(explicit: Option<&Path>) -> Result<TreesyncConfig, ApiError> {
        let mut builder = merge::merge_policy::builder_with_defaults()?;
        builder = sources::global_file::add_to_builder(builder)?;

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ApiError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            debug!(config_path = %path.display(), "Loading explicit configuration");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = sources::environment::add_to_builder(builder)?;

        let config: TreesyncConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load a single file over the defaults, without global or environment
    /// sources.
    pub fn load_from_file(path: &Path) -> Result<TreesyncConfig, ApiError> {
        let config: TreesyncConfig = merge::merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path).required(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
