//! CLI parse: clap types for treesync. No behavior beyond argument checks.

use crate::error::ApiError;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Treesync CLI - compare a "from" tree against a "to" tree by content
#[derive(Parser, Debug)]
#[command(name = "treesync", version)]
#[command(about = "Content-addressed directory comparison and one-way sync planning")]
pub struct Cli {
    /// The "from" path followed by the "to" path
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Descend into same-name sub-directory pairs
    #[arg(long)]
    pub recursive: bool,

    /// Skip unreadable entries instead of aborting
    #[arg(long)]
    pub skip_errors: bool,

    /// Follow symbolic links (cycles are skipped)
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Abort scans that run longer than this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print both tree listings before the diff
    #[arg(long)]
    pub show_trees: bool,

    /// Confirm each planned action on the terminal
    #[arg(long, conflicts_with = "yes")]
    pub interactive: bool,

    /// Approve every planned action
    #[arg(long)]
    pub yes: bool,
}

impl Cli {
    /// The "from" and "to" paths; exactly two are required.
    pub fn endpoints(&self) -> Result<(&Path, &Path), ApiError> {
        match self.paths.as_slice() {
            [from, to] => Ok((from.as_path(), to.as_path())),
            other => Err(ApiError::ConfigError(format!(
                "Expected two paths, but {} got.",
                other.len()
            ))),
        }
    }
}
