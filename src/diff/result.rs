//! Diff result types handed to reconciliation drivers

use crate::types::{Digest, NodeKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One side of a pairing: a direct child of a compared directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEntry {
    pub name: String,
    pub kind: NodeKind,
    pub path: PathBuf,
    pub digest: Digest,
}

/// Same name on both sides, different content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchPair {
    pub left: ChildEntry,
    pub right: ChildEntry,
}

/// Different names, same content: a likely rename or move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCandidate {
    pub from_child: ChildEntry,
    pub to_child: ChildEntry,
}

/// Both roots hash equal but carry different names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameCandidate {
    pub from_name: String,
    pub to_name: String,
    pub digest: Digest,
}

/// Diff of a same-name sub-directory pair (recursive mode only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedDiff {
    pub name: String,
    /// The "to" side directory
    pub path: PathBuf,
    pub result: DiffResult,
}

/// Everything a reconciliation driver needs to decide on actions
///
/// All lists follow the raw name order of the compared children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub equal_content: bool,
    pub rename: Option<RenameCandidate>,
    pub mismatches: Vec<MismatchPair>,
    pub moves: Vec<MoveCandidate>,
    pub only_in_from: Vec<ChildEntry>,
    pub only_in_to: Vec<ChildEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<NestedDiff>,
}

impl DiffResult {
    /// Result of the equality short-circuit.
    pub fn equal(rename: Option<RenameCandidate>) -> Self {
        Self {
            equal_content: true,
            rename,
            ..Self::default()
        }
    }

    /// True when no pairing or one-sided entry was found at any depth.
    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
            && self.moves.is_empty()
            && self.only_in_from.is_empty()
            && self.only_in_to.is_empty()
            && self.nested.is_empty()
    }

    /// Number of reported differences, nested results included.
    pub fn change_count(&self) -> usize {
        self.mismatches.len()
            + self.moves.len()
            + self.only_in_from.len()
            + self.only_in_to.len()
            + self
                .nested
                .iter()
                .map(|n| n.result.change_count())
                .sum::<usize>()
    }
}
