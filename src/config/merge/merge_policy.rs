//! Merge rules: defaults applied before any file or environment source.

use crate::tree::hasher::DEFAULT_CHUNK_SIZE;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("build.on_child_error", "abort")?
        .set_default("build.follow_symlinks", false)?
        .set_default("hashing.chunk_size", DEFAULT_CHUNK_SIZE as i64)?
        .set_default("diff.recursive", false)
}
