//! Integration tests for the treesync library and binary

mod blake3_verification;
mod hasher_verification;
mod test_utils;
mod tree_structure;
