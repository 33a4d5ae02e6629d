//! Single-level directory listing and entry classification

use crate::error::StorageError;
use crate::tree::path;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Why an entry was left out of a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum SkipReason {
    /// Symbolic link, not followed
    Symlink,
    /// Socket, FIFO, device or other non-regular entry
    Special,
    /// Name listed in the ignore list
    Ignored,
    /// Followed directory link pointing back at one of its ancestors
    Cycle,
    /// Unreadable entry skipped under the `skip` error policy
    Error(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Symlink => f.write_str("symlink"),
            SkipReason::Special => f.write_str("special file"),
            SkipReason::Ignored => f.write_str("ignored"),
            SkipReason::Cycle => f.write_str("symlink cycle"),
            SkipReason::Error(msg) => write!(f, "error: {}", msg),
        }
    }
}

/// A classified directory entry
#[derive(Debug)]
pub enum Entry {
    File { path: PathBuf, name: String },
    Directory { path: PathBuf, name: String },
    Skipped { path: PathBuf, reason: SkipReason },
    /// Entry whose type or metadata could not be read
    Failed { path: PathBuf, error: StorageError },
}

/// Walker configuration
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links and classify them as their target
    pub follow_symlinks: bool,
    /// Exact entry names to leave out
    pub ignore: Vec<String>,
}

/// Lists the direct entries of one directory at a time
pub struct Walker {
    config: WalkerConfig,
}

impl Walker {
    pub fn new() -> Self {
        Self {
            config: WalkerConfig::default(),
        }
    }

    pub fn with_config(config: WalkerConfig) -> Self {
        Self { config }
    }

    /// List and classify the entries directly inside `dir`, sorted by name.
    ///
    /// Failing to open `dir` itself is an error; failures on individual
    /// entries come back as `Entry::Failed` so the caller can apply its
    /// error policy.
    pub fn list(&self, dir: &Path) -> Result<Vec<Entry>, StorageError> {
        let walker = WalkDir::new(dir)
            .min_depth(0)
            .max_depth(1)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        let mut entries = Vec::new();

        for item in walker {
            let entry = match item {
                Ok(entry) => entry,
                Err(err) => {
                    let err_path = err.path().map(Path::to_path_buf);
                    if let (Some(p), Some(_)) = (&err_path, err.loop_ancestor()) {
                        entries.push(Entry::Skipped {
                            path: p.clone(),
                            reason: SkipReason::Cycle,
                        });
                        continue;
                    }
                    let storage_err = walk_error(dir, err);
                    match err_path {
                        Some(p) if p != dir => entries.push(Entry::Failed {
                            path: p,
                            error: storage_err,
                        }),
                        _ => return Err(storage_err),
                    }
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let name = path::os_name(entry.file_name());
            let entry_path = entry.path().to_path_buf();

            if self.config.ignore.iter().any(|ignored| *ignored == name) {
                entries.push(Entry::Skipped {
                    path: entry_path,
                    reason: SkipReason::Ignored,
                });
                continue;
            }

            let file_type = entry.file_type();
            let classified = if file_type.is_symlink() {
                // Only reachable when links are not followed
                Entry::Skipped {
                    path: entry_path,
                    reason: SkipReason::Symlink,
                }
            } else if file_type.is_dir() {
                Entry::Directory {
                    path: entry_path,
                    name,
                }
            } else if file_type.is_file() {
                Entry::File {
                    path: entry_path,
                    name,
                }
            } else {
                Entry::Skipped {
                    path: entry_path,
                    reason: SkipReason::Special,
                }
            };
            entries.push(classified);
        }

        Ok(entries)
    }
}

impl Default for Walker {
    fn default() -> Self {
        Self::new()
    }
}

fn walk_error(dir: &Path, err: walkdir::Error) -> StorageError {
    let path = err.path().unwrap_or(dir).to_path_buf();
    match err.into_io_error() {
        Some(io) => StorageError::from_io(path, io),
        None => StorageError::InvalidPath(format!("Failed to walk {:?}", path)),
    }
}
