//! Tree builder: materializes a node tree from a filesystem path

use crate::error::StorageError;
use crate::tree::hasher::ContentHasher;
use crate::tree::node::{DirectoryNode, FileNode, Node};
use crate::tree::path;
use crate::tree::walker::{Entry, SkipReason, Walker, WalkerConfig};
use crate::types::Digest;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// What to do when a child entry cannot be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildErrorPolicy {
    /// Fail the whole build
    #[default]
    Abort,
    /// Leave the child out and record it in `Tree::skipped`
    Skip,
}

/// Build options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub on_child_error: ChildErrorPolicy,

    /// Follow symbolic links instead of skipping them
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Exact entry names to leave out
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// An entry deliberately left out of a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub path: PathBuf,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// A built tree: the root node and everything the build left out
#[derive(Debug)]
pub struct Tree {
    root: Node,
    skipped: Vec<SkippedEntry>,
}

impl Tree {
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn name(&self) -> &str {
        self.root.name()
    }

    /// Entries left out of the tree, in walk order.
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    /// Force every digest in the tree and return the root digest.
    pub fn hash_all(&self, hasher: &ContentHasher) -> Result<Digest, StorageError> {
        self.root.hash_all(hasher)
    }
}

/// Builds a `Tree` by walking the filesystem depth-first
pub struct TreeBuilder {
    root: PathBuf,
    config: BuildConfig,
    deadline: Option<Instant>,
}

impl TreeBuilder {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: BuildConfig::default(),
            deadline: None,
        }
    }

    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Abort the build once `deadline` passes.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Scan the filesystem under the root.
    ///
    /// Failures on the root itself always abort. Failures on children follow
    /// `BuildConfig::on_child_error`. Digests are not computed here.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn build(&self) -> Result<Tree, StorageError> {
        let start = Instant::now();
        info!("Starting tree build");

        let canonical = path::canonicalize_path(&self.root).map_err(|e| {
            error!("Cannot resolve root: {}", e);
            e
        })?;
        let metadata = fs::metadata(&canonical).map_err(|e| StorageError::from_io(&canonical, e))?;

        if metadata.is_file() {
            probe_file(&canonical)?;
            info!("Root is a single file");
            return Ok(Tree {
                root: FileNode::new(canonical).into(),
                skipped: Vec::new(),
            });
        }
        if !metadata.is_dir() {
            return Err(StorageError::InvalidPath(format!(
                "Root is neither a file nor a directory: {:?}",
                canonical
            )));
        }

        let walker = Walker::with_config(WalkerConfig {
            follow_symlinks: self.config.follow_symlinks,
            ignore: self.config.ignore.clone(),
        });
        let mut state = BuildState {
            walker,
            ancestors: vec![canonical.clone()],
            skipped: Vec::new(),
        };

        let name = path::entry_name(&canonical);
        let root = self.build_directory(&canonical, name, &mut state)?;

        info!(
            files = root.file_count(),
            directories = root.directory_count() + 1,
            skipped = state.skipped.len(),
            duration_ms = start.elapsed().as_millis(),
            "Tree build completed"
        );

        Ok(Tree {
            root: root.into(),
            skipped: state.skipped,
        })
    }

    fn build_directory(
        &self,
        dir_path: &Path,
        name: String,
        state: &mut BuildState,
    ) -> Result<DirectoryNode, StorageError> {
        self.check_deadline(dir_path)?;

        let entries = state.walker.list(dir_path)?;
        debug!(path = %dir_path.display(), entries = entries.len(), "Listed directory");

        let mut children = Vec::with_capacity(entries.len());

        for entry in entries {
            match entry {
                Entry::File { path, name } => match probe_file(&path) {
                    Ok(()) => children.push(FileNode::with_name(path, name).into()),
                    Err(e) => self.child_failed(path, e, state)?,
                },
                Entry::Directory { path, name } => {
                    let key = if self.config.follow_symlinks {
                        match path::canonicalize_path(&path) {
                            Ok(p) => p,
                            Err(e) => {
                                self.child_failed(path, e, state)?;
                                continue;
                            }
                        }
                    } else {
                        path.clone()
                    };

                    if state.ancestors.contains(&key) {
                        debug!(path = %path.display(), "Skipping symlink cycle");
                        state.skipped.push(SkippedEntry {
                            path,
                            reason: SkipReason::Cycle,
                        });
                        continue;
                    }

                    state.ancestors.push(key);
                    let built = self.build_directory(&path, name, state);
                    state.ancestors.pop();

                    match built {
                        Ok(dir) => children.push(dir.into()),
                        Err(e) => self.child_failed(path, e, state)?,
                    }
                }
                Entry::Skipped { path, reason } => {
                    debug!(path = %path.display(), %reason, "Skipping entry");
                    state.skipped.push(SkippedEntry { path, reason });
                }
                Entry::Failed { path, error } => self.child_failed(path, error, state)?,
            }
        }

        Ok(DirectoryNode::with_name(
            dir_path.to_path_buf(),
            name,
            children,
        ))
    }

    /// Apply the child error policy. Deadline expiry is never skipped.
    fn child_failed(
        &self,
        path: PathBuf,
        err: StorageError,
        state: &mut BuildState,
    ) -> Result<(), StorageError> {
        if matches!(err, StorageError::DeadlineExceeded(_)) {
            return Err(err);
        }
        match self.config.on_child_error {
            ChildErrorPolicy::Abort => {
                error!(path = %path.display(), "Aborting build: {}", err);
                Err(err)
            }
            ChildErrorPolicy::Skip => {
                warn!(path = %path.display(), "Skipping unreadable entry: {}", err);
                state.skipped.push(SkippedEntry {
                    path,
                    reason: SkipReason::Error(err.to_string()),
                });
                Ok(())
            }
        }
    }

    fn check_deadline(&self, path: &Path) -> Result<(), StorageError> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Err(StorageError::DeadlineExceeded(path.to_path_buf()))
            }
            _ => Ok(()),
        }
    }
}

struct BuildState {
    walker: Walker,
    /// Directories on the current descent path, for cycle detection
    ancestors: Vec<PathBuf>,
    skipped: Vec<SkippedEntry>,
}

/// Check that a file can be opened for reading.
fn probe_file(path: &Path) -> Result<(), StorageError> {
    File::open(path)
        .map(drop)
        .map_err(|e| StorageError::from_io(path, e))
}
