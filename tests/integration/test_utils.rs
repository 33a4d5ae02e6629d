//! Shared fixtures for integration tests
//!
//! Each helper lays out files under a `TempDir` so tests stay isolated and
//! the directory is removed when the guard drops.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use treesync::tree::builder::{Tree, TreeBuilder};

/// Write `content` at `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Create `root/name` populated with `(relative path, content)` pairs.
pub fn make_tree(root: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for (rel, content) in files {
        write_file(&dir, rel, content);
    }
    dir
}

/// Build a tree with default options.
pub fn build(path: &Path) -> Tree {
    TreeBuilder::new(path.to_path_buf()).build().unwrap()
}

/// A temp dir holding a `from` and a `to` tree with the given files.
pub fn tree_pair(from: &[(&str, &str)], to: &[(&str, &str)]) -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let from_path = make_tree(temp_dir.path(), "from", from);
    let to_path = make_tree(temp_dir.path(), "to", to);
    (temp_dir, from_path, to_path)
}
