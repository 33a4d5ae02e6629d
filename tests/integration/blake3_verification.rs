//! BLAKE3 Verification Tests
//!
//! Checks that content digests are plain BLAKE3-256 output, hex encoded,
//! against the official empty-input vector from
//! https://github.com/BLAKE3-team/BLAKE3/blob/main/test_vectors/test_vectors.json

use std::io::Cursor;
use treesync::tree::hasher::{digest_bytes, ContentHasher};

const EMPTY_INPUT_HASH: &str = "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262";

#[test]
fn test_empty_input_matches_official_vector() {
    assert_eq!(digest_bytes(b"").to_hex(), EMPTY_INPUT_HASH);
    let streamed = ContentHasher::new().digest(Cursor::new(b"")).unwrap();
    assert_eq!(streamed.to_string(), EMPTY_INPUT_HASH);
}

#[test]
fn test_digest_equals_direct_blake3() {
    for input in [&b"a"[..], &b"abc"[..], &b"Hello, World!"[..]] {
        let expected = hex::encode(blake3::hash(input).as_bytes());
        let streamed = ContentHasher::new().digest(Cursor::new(input)).unwrap();
        assert_eq!(streamed.to_hex(), expected, "mismatch for {:?}", input);
    }
}

/// Streaming in chunks must agree with a single update
#[test]
fn test_incremental_hashing() {
    let input = b"Hello, World!";
    let whole = digest_bytes(input);

    for chunk_size in [1, 2, 5, 13, 64 * 1024] {
        let streamed = ContentHasher::new()
            .with_chunk_size(chunk_size)
            .digest(Cursor::new(input))
            .unwrap();
        assert_eq!(streamed, whole, "chunk size {}", chunk_size);
    }
}

#[test]
fn test_avalanche_effect() {
    let a = digest_bytes(b"Hello, World!");
    let b = digest_bytes(b"Hello, World?");
    assert_ne!(a, b);
}

/// Inputs larger than one chunk cross several reads
#[test]
fn test_large_input_across_chunks() {
    let input: Vec<u8> = (0..300_000u32).map(|i| (i * 7 % 256) as u8).collect();
    let streamed = ContentHasher::new().digest(Cursor::new(&input)).unwrap();
    assert_eq!(streamed, digest_bytes(&input));
}

#[test]
fn test_hex_output_size() {
    let hex = digest_bytes(b"size").to_hex();
    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}
