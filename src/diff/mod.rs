//! Tree diffing
//!
//! Compares the direct children of two directory nodes by name and by
//! content. Works only from node digests, so a diff costs time proportional
//! to child counts once the trees are hashed.

mod result;

pub use result::{
    ChildEntry, DiffResult, MismatchPair, MoveCandidate, NestedDiff, RenameCandidate,
};

use crate::error::{ApiError, StorageError};
use crate::tree::hasher::ContentHasher;
use crate::tree::node::{DirectoryNode, Node};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Diff options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOptions {
    /// Descend into same-name sub-directory pairs
    #[serde(default)]
    pub recursive: bool,
}

/// Result of content correlation over unmatched children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentCorrelation {
    pub moves: Vec<MoveCandidate>,
    pub only_in_from: Vec<ChildEntry>,
    pub only_in_to: Vec<ChildEntry>,
}

/// Stateless diff engine; every call recomputes from the given trees
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    options: DiffOptions,
    hasher: ContentHasher,
}

impl DiffEngine {
    pub fn new(options: DiffOptions) -> Self {
        Self {
            options,
            hasher: ContentHasher::default(),
        }
    }

    /// Hasher used for any digest not yet memoized.
    pub fn with_hasher(mut self, hasher: ContentHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Diff two directory roots.
    ///
    /// Equal root digests short-circuit: the result is marked content-equal,
    /// carries a rename candidate when the root names differ, and the root's
    /// children are not compared. Recursive mode still diffs same-name
    /// sub-directory pairs below such a root.
    #[instrument(skip_all, fields(from = %from.path().display(), to = %to.path().display()))]
    pub fn diff(&self, from: &Node, to: &Node) -> Result<DiffResult, ApiError> {
        let (from_dir, to_dir) = match (from.as_directory(), to.as_directory()) {
            (Some(f), Some(t)) => (f, t),
            _ => {
                return Err(ApiError::ConfigError(format!(
                    "Both roots must be directories (from: {}, to: {})",
                    from.kind(),
                    to.kind()
                )))
            }
        };

        let from_digest = from_dir.digest_with(&self.hasher)?;
        let to_digest = to_dir.digest_with(&self.hasher)?;

        if from_digest == to_digest {
            let rename = (from_dir.key() != to_dir.key()).then(|| RenameCandidate {
                from_name: from_dir.name().to_string(),
                to_name: to_dir.name().to_string(),
                digest: from_digest,
            });
            let mut result = DiffResult::equal(rename);
            // Root digests only cover direct files, so levels below can still differ
            if self.options.recursive {
                result.nested = self.diff_nested(from_dir, to_dir)?;
            }
            info!(
                digest = %from_digest,
                renamed = result.rename.is_some(),
                nested = result.nested.len(),
                "Roots are content-equal"
            );
            return Ok(result);
        }

        let result = self.diff_directories(from_dir, to_dir)?;
        info!(
            mismatches = result.mismatches.len(),
            moves = result.moves.len(),
            only_in_from = result.only_in_from.len(),
            only_in_to = result.only_in_to.len(),
            changes = result.change_count(),
            "Diff completed"
        );
        Ok(result)
    }

    fn diff_directories(
        &self,
        from: &DirectoryNode,
        to: &DirectoryNode,
    ) -> Result<DiffResult, StorageError> {
        let mismatches = self.diff_by_name(from, to)?;
        let correlation = self.correlate_by_content(from, to)?;

        let nested = if self.options.recursive {
            self.diff_nested(from, to)?
        } else {
            Vec::new()
        };

        Ok(DiffResult {
            equal_content: false,
            rename: None,
            mismatches,
            moves: correlation.moves,
            only_in_from: correlation.only_in_from,
            only_in_to: correlation.only_in_to,
            nested,
        })
    }

    /// Diff every same-name sub-directory pair, keeping non-empty results.
    fn diff_nested(
        &self,
        from: &DirectoryNode,
        to: &DirectoryNode,
    ) -> Result<Vec<NestedDiff>, StorageError> {
        let mut nested = Vec::new();
        for from_sub in from.directories() {
            let to_sub = match to.child(from_sub.key()).and_then(Node::as_directory) {
                Some(d) => d,
                None => continue,
            };
            let result = self.diff_directories(from_sub, to_sub)?;
            if !result.is_empty() {
                debug!(name = from_sub.name(), "Nested differences found");
                nested.push(NestedDiff {
                    name: from_sub.name().to_string(),
                    path: to_sub.path().to_path_buf(),
                    result,
                });
            }
        }
        Ok(nested)
    }

    /// Pair direct children by raw name and report those whose content
    /// differs.
    ///
    /// A file and a directory sharing a name always mismatch. Output follows
    /// the sorted child order.
    pub fn diff_by_name(
        &self,
        from: &DirectoryNode,
        to: &DirectoryNode,
    ) -> Result<Vec<MismatchPair>, StorageError> {
        let mut mismatches = Vec::new();

        for left in from.children() {
            for right in to.children() {
                if left.key() != right.key() {
                    continue;
                }
                let left_digest = left.digest_with(&self.hasher)?;
                let right_digest = right.digest_with(&self.hasher)?;
                if left.kind() != right.kind() || left_digest != right_digest {
                    mismatches.push(MismatchPair {
                        left: entry(left, left_digest),
                        right: entry(right, right_digest),
                    });
                }
            }
        }

        Ok(mismatches)
    }

    /// Pair children that have no name match but share content.
    pub fn diff_by_content(
        &self,
        from: &DirectoryNode,
        to: &DirectoryNode,
    ) -> Result<Vec<MoveCandidate>, StorageError> {
        Ok(self.correlate_by_content(from, to)?.moves)
    }

    /// Children with no name match on the other side, before content
    /// correlation.
    pub fn unmatched<'a>(
        &self,
        from: &'a DirectoryNode,
        to: &'a DirectoryNode,
    ) -> (Vec<&'a Node>, Vec<&'a Node>) {
        let only_from = from
            .children()
            .iter()
            .filter(|c| to.child(c.key()).is_none())
            .collect();
        let only_to = to
            .children()
            .iter()
            .filter(|c| from.child(c.key()).is_none())
            .collect();
        (only_from, only_to)
    }

    /// Match each unmatched `from` child to the first unclaimed unmatched
    /// `to` child of the same kind and digest. The rest are one-sided.
    ///
    /// A directory digest covers only its direct files, so any two
    /// directories without direct files correlate, whatever lies below them.
    pub fn correlate_by_content(
        &self,
        from: &DirectoryNode,
        to: &DirectoryNode,
    ) -> Result<ContentCorrelation, StorageError> {
        let (only_from, only_to) = self.unmatched(from, to);

        let mut to_entries = Vec::with_capacity(only_to.len());
        for node in &only_to {
            to_entries.push((node.kind(), node.digest_with(&self.hasher)?, *node));
        }
        let mut claimed = vec![false; to_entries.len()];

        let mut correlation = ContentCorrelation::default();

        for node in only_from {
            let digest = node.digest_with(&self.hasher)?;
            let found = to_entries
                .iter()
                .enumerate()
                .find(|(i, (kind, d, _))| !claimed[*i] && *kind == node.kind() && *d == digest)
                .map(|(i, _)| i);

            match found {
                Some(i) => {
                    claimed[i] = true;
                    let (_, to_digest, to_node) = to_entries[i];
                    debug!(from = node.name(), to = to_node.name(), "Move candidate");
                    correlation.moves.push(MoveCandidate {
                        from_child: entry(node, digest),
                        to_child: entry(to_node, to_digest),
                    });
                }
                None => correlation.only_in_from.push(entry(node, digest)),
            }
        }

        for (i, (_, digest, node)) in to_entries.into_iter().enumerate() {
            if !claimed[i] {
                correlation.only_in_to.push(entry(node, digest));
            }
        }

        Ok(correlation)
    }
}

fn entry(node: &Node, digest: crate::types::Digest) -> ChildEntry {
    ChildEntry {
        name: node.name().to_string(),
        kind: node.kind(),
        path: node.path().to_path_buf(),
        digest,
    }
}
