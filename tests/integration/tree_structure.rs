//! Integration tests for tree structure correctness

use super::test_utils::{build, make_tree, write_file};
use std::fs;
use tempfile::TempDir;
use treesync::error::StorageError;
use treesync::tree::builder::{BuildConfig, ChildErrorPolicy, TreeBuilder};
use treesync::tree::walker::SkipReason;
use treesync::types::NodeKind;

/// Test that children are partitioned into files and directories
#[test]
fn test_children_partitioned_by_kind() {
    let temp_dir = TempDir::new().unwrap();
    let root = make_tree(
        temp_dir.path(),
        "root",
        &[("b.txt", "B"), ("a.txt", "A"), ("dir1/f.txt", "F")],
    );
    fs::create_dir(root.join("dir2")).unwrap();

    let tree = build(&root);
    let dir = tree.root().as_directory().unwrap();

    let files: Vec<_> = dir.files().map(|f| f.name()).collect();
    let dirs: Vec<_> = dir.directories().map(|d| d.name()).collect();
    assert_eq!(files, vec!["a.txt", "b.txt"]);
    assert_eq!(dirs, vec!["dir1", "dir2"]);
    assert_eq!(dir.file_count(), 2);
    assert_eq!(dir.directory_count(), 2);
}

/// Test that the full tree is built at every depth
#[test]
fn test_nested_structure() {
    let temp_dir = TempDir::new().unwrap();
    let root = make_tree(
        temp_dir.path(),
        "root",
        &[("level1/level2/level3/file.txt", "deep")],
    );

    let tree = build(&root);
    let level3 = tree
        .root()
        .as_directory()
        .and_then(|d| d.child("level1"))
        .and_then(|n| n.as_directory())
        .and_then(|d| d.child("level2"))
        .and_then(|n| n.as_directory())
        .and_then(|d| d.child("level3"))
        .and_then(|n| n.as_directory())
        .unwrap();

    let file = level3.child("file.txt").unwrap();
    assert_eq!(file.kind(), NodeKind::File);
    assert!(file.path().ends_with("level1/level2/level3/file.txt"));
}

#[test]
fn test_root_name_is_last_component() {
    let temp_dir = TempDir::new().unwrap();
    let root = make_tree(temp_dir.path(), "project", &[]);

    let tree = build(&root);
    assert_eq!(tree.name(), "project");
    assert_eq!(tree.root().kind(), NodeKind::Directory);
}

#[test]
fn test_missing_root_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope");

    let err = TreeBuilder::new(missing).build().unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[test]
fn test_file_root_builds_single_node() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_file(temp_dir.path(), "lone.txt", "content");

    let tree = build(&file);
    assert_eq!(tree.root().kind(), NodeKind::File);
    assert_eq!(tree.name(), "lone.txt");
}

#[test]
fn test_ignored_names_are_recorded() {
    let temp_dir = TempDir::new().unwrap();
    let root = make_tree(
        temp_dir.path(),
        "root",
        &[("keep.txt", "K"), (".git/HEAD", "ref")],
    );

    let tree = TreeBuilder::new(root)
        .with_config(BuildConfig {
            ignore: vec![".git".to_string()],
            ..BuildConfig::default()
        })
        .build()
        .unwrap();

    let dir = tree.root().as_directory().unwrap();
    assert!(dir.child(".git").is_none());
    assert!(dir.child("keep.txt").is_some());
    assert_eq!(tree.skipped().len(), 1);
    assert_eq!(tree.skipped()[0].reason, SkipReason::Ignored);
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::{symlink, PermissionsExt};

    #[test]
    fn test_symlinks_skipped_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let root = make_tree(temp_dir.path(), "root", &[("real.txt", "R")]);
        symlink(root.join("real.txt"), root.join("link.txt")).unwrap();

        let tree = build(&root);
        let dir = tree.root().as_directory().unwrap();
        assert!(dir.child("link.txt").is_none());
        assert_eq!(tree.skipped()[0].reason, SkipReason::Symlink);
    }

    #[test]
    fn test_followed_directory_cycle_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = make_tree(temp_dir.path(), "root", &[("sub/f.txt", "F")]);
        symlink(&root, root.join("sub").join("back")).unwrap();

        let tree = TreeBuilder::new(root)
            .with_config(BuildConfig {
                follow_symlinks: true,
                ..BuildConfig::default()
            })
            .build()
            .unwrap();

        assert!(tree
            .skipped()
            .iter()
            .any(|s| s.reason == SkipReason::Cycle));
    }

    fn dangling_link_tree(temp_dir: &TempDir) -> std::path::PathBuf {
        let root = make_tree(temp_dir.path(), "root", &[("ok.txt", "OK")]);
        symlink(root.join("nowhere"), root.join("dangling")).unwrap();
        root
    }

    fn following(on_child_error: ChildErrorPolicy) -> BuildConfig {
        BuildConfig {
            follow_symlinks: true,
            on_child_error,
            ..BuildConfig::default()
        }
    }

    #[test]
    fn test_broken_followed_link_aborts_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let root = dangling_link_tree(&temp_dir);

        let result = TreeBuilder::new(root)
            .with_config(following(ChildErrorPolicy::Abort))
            .build();

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_broken_followed_link_skipped_under_skip_policy() {
        let temp_dir = TempDir::new().unwrap();
        let root = dangling_link_tree(&temp_dir);

        let tree = TreeBuilder::new(root)
            .with_config(following(ChildErrorPolicy::Skip))
            .build()
            .unwrap();

        let dir = tree.root().as_directory().unwrap();
        assert!(dir.child("ok.txt").is_some());
        assert!(dir.child("dangling").is_none());
        assert_eq!(tree.skipped().len(), 1);
        assert!(tree.skipped()[0].path.ends_with("dangling"));
        assert!(matches!(tree.skipped()[0].reason, SkipReason::Error(_)));
    }

    /// Root bypasses permission bits, so these tests bail out when the
    /// locked directory stays readable.
    fn lock(path: &std::path::Path) -> bool {
        fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
        fs::read_dir(path).is_err()
    }

    fn unlock(path: &std::path::Path) {
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_unreadable_directory_aborts_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let root = make_tree(temp_dir.path(), "root", &[("ok.txt", "OK"), ("locked/x", "X")]);
        let locked = root.join("locked");
        if !lock(&locked) {
            unlock(&locked);
            return;
        }

        let result = TreeBuilder::new(root.clone()).build();
        unlock(&locked);

        assert!(matches!(result, Err(StorageError::PermissionDenied(_))));
    }

    #[test]
    fn test_unreadable_directory_skipped_under_skip_policy() {
        let temp_dir = TempDir::new().unwrap();
        let root = make_tree(temp_dir.path(), "root", &[("ok.txt", "OK"), ("locked/x", "X")]);
        let locked = root.join("locked");
        if !lock(&locked) {
            unlock(&locked);
            return;
        }

        let result = TreeBuilder::new(root.clone())
            .with_config(BuildConfig {
                on_child_error: ChildErrorPolicy::Skip,
                ..BuildConfig::default()
            })
            .build();
        unlock(&locked);

        let tree = result.unwrap();
        let dir = tree.root().as_directory().unwrap();
        assert!(dir.child("locked").is_none());
        assert!(dir.child("ok.txt").is_some());
        assert_eq!(tree.skipped().len(), 1);
        assert!(matches!(tree.skipped()[0].reason, SkipReason::Error(_)));
    }
}
