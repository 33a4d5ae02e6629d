//! Human-readable rendering of trees, diffs and plans
//!
//! Diagnostic output only; the machine contract is `DiffResult`.

use crate::diff::{ChildEntry, DiffResult};
use crate::error::StorageError;
use crate::reconcile::Decision;
use crate::tree::hasher::ContentHasher;
use crate::tree::node::Node;
use crate::tree::SkippedEntry;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::fmt::Write;

/// Indentation marker, repeated once per depth level
pub const INDENT: &str = "-   ";

/// Indented listing of names and digests, directories before files.
pub fn render_tree(root: &Node, hasher: &ContentHasher) -> Result<String, StorageError> {
    let mut out = String::new();
    render_node(root, 0, hasher, &mut out)?;
    Ok(out)
}

fn render_node(
    node: &Node,
    depth: usize,
    hasher: &ContentHasher,
    out: &mut String,
) -> Result<(), StorageError> {
    let digest = node.digest_with(hasher)?;
    let _ = writeln!(out, "{}{}\t\t{}", INDENT.repeat(depth), node.name(), digest);

    if let Node::Directory(dir) = node {
        for child in dir.children().iter().filter(|c| c.as_directory().is_some()) {
            render_node(child, depth + 1, hasher, out)?;
        }
        for child in dir.children().iter().filter(|c| c.as_file().is_some()) {
            render_node(child, depth + 1, hasher, out)?;
        }
    }
    Ok(())
}

fn section_title(title: &str, color: bool) -> String {
    if color {
        format!("{}", title.bold().underline())
    } else {
        title.to_string()
    }
}

fn entry_table(entries: &[&ChildEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Kind", "Digest"]);
    for entry in entries {
        table.add_row(vec![
            entry.name.clone(),
            entry.kind.to_string(),
            entry.digest.short(16),
        ]);
    }
    table
}

/// Summary of a diff, one section per non-empty list.
pub fn render_diff(diff: &DiffResult, color: bool) -> String {
    let mut out = String::new();

    if diff.equal_content {
        match &diff.rename {
            Some(rename) => {
                let _ = writeln!(
                    out,
                    "Trees are content-equal; root renamed '{}' -> '{}' ({})",
                    rename.from_name,
                    rename.to_name,
                    rename.digest.short(16)
                );
            }
            None => {
                let _ = writeln!(out, "Trees are content-equal");
            }
        }
        for nested in &diff.nested {
            render_level(&nested.result, &nested.name, color, &mut out);
        }
        if !diff.nested.is_empty() {
            let _ = writeln!(out, "{} difference(s) below the root", diff.change_count());
        }
        return out;
    }

    render_level(diff, "", color, &mut out);
    if diff.is_empty() {
        let _ = writeln!(out, "No differences among direct children");
    } else {
        let _ = writeln!(out, "{} difference(s)", diff.change_count());
    }
    out
}

fn render_level(diff: &DiffResult, prefix: &str, color: bool, out: &mut String) {
    let label = |title: &str| {
        if prefix.is_empty() {
            section_title(title, color)
        } else {
            section_title(&format!("{} ({})", title, prefix), color)
        }
    };

    if !diff.mismatches.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Name", "From", "To"]);
        for pair in &diff.mismatches {
            table.add_row(vec![
                pair.left.name.clone(),
                format!("{} {}", pair.left.kind, pair.left.digest.short(16)),
                format!("{} {}", pair.right.kind, pair.right.digest.short(16)),
            ]);
        }
        let _ = writeln!(out, "{}\n{}", label("Changed"), table);
    }

    if !diff.moves.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["From name", "To name", "Digest"]);
        for mv in &diff.moves {
            table.add_row(vec![
                mv.from_child.name.clone(),
                mv.to_child.name.clone(),
                mv.from_child.digest.short(16),
            ]);
        }
        let _ = writeln!(out, "{}\n{}", label("Moved"), table);
    }

    if !diff.only_in_from.is_empty() {
        let entries: Vec<_> = diff.only_in_from.iter().collect();
        let _ = writeln!(out, "{}\n{}", label("Only in from"), entry_table(&entries));
    }

    if !diff.only_in_to.is_empty() {
        let entries: Vec<_> = diff.only_in_to.iter().collect();
        let _ = writeln!(out, "{}\n{}", label("Only in to"), entry_table(&entries));
    }

    for nested in &diff.nested {
        let path = if prefix.is_empty() {
            nested.name.clone()
        } else {
            format!("{}/{}", prefix, nested.name)
        };
        render_level(&nested.result, &path, color, out);
    }
}

/// Approved and declined actions, one per line.
pub fn render_decision(decision: &Decision) -> String {
    let mut out = String::new();
    if decision.approved.is_empty() && decision.declined.is_empty() {
        let _ = writeln!(out, "Nothing to reconcile");
        return out;
    }
    for action in &decision.approved {
        let _ = writeln!(out, "[approved] {}", action);
    }
    for action in &decision.declined {
        let _ = writeln!(out, "[planned]  {}", action);
    }
    out
}

/// One line per skipped entry.
pub fn render_skipped(label: &str, skipped: &[SkippedEntry]) -> String {
    let mut out = String::new();
    for entry in skipped {
        let _ = writeln!(
            out,
            "{}: skipped {} ({})",
            label,
            entry.path.display(),
            entry.reason
        );
    }
    out
}
