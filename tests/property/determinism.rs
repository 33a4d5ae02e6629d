//! Property-based tests for determinism guarantees

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::io::Cursor;
use tempfile::TempDir;
use treesync::tree::builder::TreeBuilder;
use treesync::tree::hasher::{digest_bytes, ContentHasher};

proptest! {
    /// Streaming digests do not depend on the chunk size
    #[test]
    fn test_chunk_size_independence(content in proptest::collection::vec(any::<u8>(), 0..4096), chunk in 1usize..512) {
        let streamed = ContentHasher::new()
            .with_chunk_size(chunk)
            .digest(Cursor::new(&content))
            .unwrap();
        prop_assert_eq!(streamed, digest_bytes(&content));
    }

    /// Same content, same digest; different content, different digest
    #[test]
    fn test_content_digest_determinism(a in any::<Vec<u8>>(), b in any::<Vec<u8>>()) {
        let (ha, hb) = (digest_bytes(&a), digest_bytes(&b));
        prop_assert_eq!(ha, digest_bytes(&a));
        if a != b {
            prop_assert_ne!(ha, hb);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// The order files were created in never reaches the directory digest
    #[test]
    fn test_directory_digest_independent_of_creation_order(
        files in proptest::collection::btree_map("[a-z]{1,8}", "[ -~]{0,32}", 0..8)
    ) {
        let temp_dir = TempDir::new().unwrap();
        let forward = temp_dir.path().join("forward");
        let backward = temp_dir.path().join("backward");
        fs::create_dir(&forward).unwrap();
        fs::create_dir(&backward).unwrap();

        let files: BTreeMap<String, String> = files;
        for (name, content) in files.iter() {
            fs::write(forward.join(name), content).unwrap();
        }
        for (name, content) in files.iter().rev() {
            fs::write(backward.join(name), content).unwrap();
        }

        let left = TreeBuilder::new(forward).build().unwrap();
        let right = TreeBuilder::new(backward).build().unwrap();
        prop_assert_eq!(left.root().digest().unwrap(), right.root().digest().unwrap());
    }
}
