//! Node digest verification
//!
//! Directory digests fold in direct file digests only. These tests pin that
//! behavior down, including the cases where it surprises.

use super::test_utils::{build, make_tree, write_file};
use std::fs;
use tempfile::TempDir;
use treesync::tree::hasher::digest_bytes;

#[test]
fn test_file_digest_matches_content() {
    let temp_dir = TempDir::new().unwrap();
    let root = make_tree(temp_dir.path(), "root", &[("a.txt", "alpha")]);

    let tree = build(&root);
    let dir = tree.root().as_directory().unwrap();
    let file = dir.child("a.txt").unwrap();
    assert_eq!(file.digest().unwrap(), digest_bytes(b"alpha"));
}

#[test]
fn test_identical_files_identical_digests() {
    let temp_dir = TempDir::new().unwrap();
    let root = make_tree(
        temp_dir.path(),
        "root",
        &[("one.txt", "same"), ("two.txt", "same")],
    );

    let tree = build(&root);
    let dir = tree.root().as_directory().unwrap();
    assert_eq!(
        dir.child("one.txt").unwrap().digest().unwrap(),
        dir.child("two.txt").unwrap().digest().unwrap()
    );
}

#[test]
fn test_directory_digest_invariant_under_subdirectory_layout() {
    let temp_dir = TempDir::new().unwrap();
    let left = make_tree(
        temp_dir.path(),
        "left",
        &[("a.txt", "A"), ("b.txt", "B"), ("x/nested.txt", "N")],
    );
    let right = make_tree(
        temp_dir.path(),
        "right",
        &[("a.txt", "A"), ("b.txt", "B"), ("y/z/other.txt", "O")],
    );

    let left_tree = build(&left);
    let right_tree = build(&right);
    assert_eq!(
        left_tree.root().digest().unwrap(),
        right_tree.root().digest().unwrap()
    );
}

#[test]
fn test_directory_digest_invariant_under_creation_order() {
    let temp_dir = TempDir::new().unwrap();
    let first = make_tree(
        temp_dir.path(),
        "first",
        &[("a.txt", "A"), ("m.txt", "M"), ("z.txt", "Z")],
    );
    let second = make_tree(
        temp_dir.path(),
        "second",
        &[("z.txt", "Z"), ("a.txt", "A"), ("m.txt", "M")],
    );

    assert_eq!(
        build(&first).root().digest().unwrap(),
        build(&second).root().digest().unwrap()
    );
}

#[test]
fn test_directory_digest_changes_with_direct_file_content() {
    let temp_dir = TempDir::new().unwrap();
    let root = make_tree(temp_dir.path(), "root", &[("a.txt", "v1")]);
    let before = build(&root).root().digest().unwrap();

    write_file(&root, "a.txt", "v2");
    let after = build(&root).root().digest().unwrap();

    assert_ne!(before, after);
}

/// Changes confined to a sub-directory leave the parent digest untouched
#[test]
fn test_directory_digest_ignores_nested_changes() {
    let temp_dir = TempDir::new().unwrap();
    let root = make_tree(
        temp_dir.path(),
        "root",
        &[("top.txt", "T"), ("sub/inner.txt", "I1")],
    );
    let baseline = build(&root).root().digest().unwrap();

    write_file(&root, "sub/inner.txt", "I2");
    assert_eq!(build(&root).root().digest().unwrap(), baseline);

    write_file(&root, "sub/added.txt", "new");
    assert_eq!(build(&root).root().digest().unwrap(), baseline);

    fs::remove_file(root.join("sub").join("inner.txt")).unwrap();
    assert_eq!(build(&root).root().digest().unwrap(), baseline);

    fs::remove_dir_all(root.join("sub")).unwrap();
    assert_eq!(build(&root).root().digest().unwrap(), baseline);
}

#[test]
fn test_directory_digest_ignores_file_names() {
    let temp_dir = TempDir::new().unwrap();
    let left = make_tree(temp_dir.path(), "left", &[("a.txt", "same")]);
    let right = make_tree(temp_dir.path(), "right", &[("renamed.bin", "same")]);

    assert_eq!(
        build(&left).root().digest().unwrap(),
        build(&right).root().digest().unwrap()
    );
}

#[test]
fn test_digest_snapshot_survives_later_writes() {
    let temp_dir = TempDir::new().unwrap();
    let root = make_tree(temp_dir.path(), "root", &[("a.txt", "first")]);

    let tree = build(&root);
    let before = tree.root().digest().unwrap();
    write_file(&root, "a.txt", "second");

    assert_eq!(tree.root().digest().unwrap(), before);
    assert_ne!(build(&root).root().digest().unwrap(), before);
}
