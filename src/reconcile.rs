//! Reconciliation planning
//!
//! Turns a `DiffResult` into the actions a one-way sync from the "from" tree
//! to the "to" tree would take, and lets a driver decide which to approve.
//! Nothing here touches the filesystem; executing approved actions is left
//! to the caller.

use crate::diff::{ChildEntry, DiffResult};
use crate::error::ApiError;
use crate::types::NodeKind;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A proposed change to the "to" tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Rename the "to" root so it matches the "from" root
    RenameRoot { target: PathBuf, new_name: String },
    /// Rename an entry whose content already matches a "from" entry
    Move { source: PathBuf, target: PathBuf },
    /// Overwrite a same-name entry with the "from" content
    Update {
        source: PathBuf,
        target: PathBuf,
        kind: NodeKind,
    },
    /// Copy an entry that exists only in "from"
    Copy {
        source: PathBuf,
        target: PathBuf,
        kind: NodeKind,
    },
    /// Remove an entry that exists only in "to"
    Remove { target: PathBuf, kind: NodeKind },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::RenameRoot { target, new_name } => {
                write!(f, "rename {} to '{}'", target.display(), new_name)
            }
            Action::Move { source, target } => {
                write!(f, "move {} -> {}", source.display(), target.display())
            }
            Action::Update {
                source,
                target,
                kind,
            } => write!(
                f,
                "update {} {} from {}",
                kind,
                target.display(),
                source.display()
            ),
            Action::Copy {
                source,
                target,
                kind,
            } => write!(f, "copy {} {} -> {}", kind, source.display(), target.display()),
            Action::Remove { target, kind } => write!(f, "remove {} {}", kind, target.display()),
        }
    }
}

/// Derive the one-way plan for `diff`, whose "to" side is rooted at `to_root`.
///
/// Per level the order is moves, updates, copies, removals; nested
/// directory results follow their parent level in name order. A root rename
/// comes last so every earlier target still names an existing path.
pub fn plan(diff: &DiffResult, to_root: &Path) -> Vec<Action> {
    let mut actions = Vec::new();

    plan_level(diff, to_root, &mut actions);

    if let Some(rename) = &diff.rename {
        actions.push(Action::RenameRoot {
            target: to_root.to_path_buf(),
            new_name: rename.from_name.clone(),
        });
    }

    debug!(actions = actions.len(), "Planned reconciliation");
    actions
}

fn plan_level(diff: &DiffResult, to_dir: &Path, actions: &mut Vec<Action>) {
    for mv in &diff.moves {
        actions.push(Action::Move {
            source: mv.to_child.path.clone(),
            target: to_dir.join(raw_name(&mv.from_child)),
        });
    }
    for pair in &diff.mismatches {
        // Directory pairs with a nested diff are reconciled entry by entry
        let descended = pair.left.kind == NodeKind::Directory
            && pair.right.kind == NodeKind::Directory
            && diff.nested.iter().any(|n| n.path == pair.right.path);
        if descended {
            continue;
        }
        actions.push(Action::Update {
            source: pair.left.path.clone(),
            target: pair.right.path.clone(),
            kind: pair.left.kind,
        });
    }
    for entry in &diff.only_in_from {
        actions.push(Action::Copy {
            source: entry.path.clone(),
            target: to_dir.join(raw_name(entry)),
            kind: entry.kind,
        });
    }
    for entry in &diff.only_in_to {
        actions.push(Action::Remove {
            target: entry.path.clone(),
            kind: entry.kind,
        });
    }
    for nested in &diff.nested {
        plan_level(&nested.result, &nested.path, actions);
    }
}

/// Entry name as stored on disk; the display name may be normalized.
fn raw_name(entry: &ChildEntry) -> &OsStr {
    entry
        .path
        .file_name()
        .unwrap_or_else(|| OsStr::new(&entry.name))
}

/// Outcome of a driver's decision
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub approved: Vec<Action>,
    pub declined: Vec<Action>,
}

/// Decides which planned actions go ahead
pub trait ReconciliationDriver {
    fn decide(&mut self, actions: Vec<Action>) -> Result<Decision, ApiError>;
}

/// Approves nothing; the plan is only reported
#[derive(Debug, Default)]
pub struct DryRun;

impl ReconciliationDriver for DryRun {
    fn decide(&mut self, actions: Vec<Action>) -> Result<Decision, ApiError> {
        Ok(Decision {
            approved: Vec::new(),
            declined: actions,
        })
    }
}

/// Approves every action
#[derive(Debug, Default)]
pub struct AutoApprove;

impl ReconciliationDriver for AutoApprove {
    fn decide(&mut self, actions: Vec<Action>) -> Result<Decision, ApiError> {
        info!(approved = actions.len(), "Auto-approving plan");
        Ok(Decision {
            approved: actions,
            declined: Vec::new(),
        })
    }
}

/// Asks on the terminal for each action
#[derive(Debug, Default)]
pub struct Interactive;

impl ReconciliationDriver for Interactive {
    fn decide(&mut self, actions: Vec<Action>) -> Result<Decision, ApiError> {
        use dialoguer::Confirm;

        let mut decision = Decision::default();
        for action in actions {
            let confirmed = Confirm::new()
                .with_prompt(format!("{}?", action))
                .default(false)
                .interact()
                .map_err(|e| {
                    ApiError::ReconcileError(format!("Failed to get user input: {}", e))
                })?;
            if confirmed {
                decision.approved.push(action);
            } else {
                decision.declined.push(action);
            }
        }
        info!(
            approved = decision.approved.len(),
            declined = decision.declined.len(),
            "Interactive review finished"
        );
        Ok(decision)
    }
}
