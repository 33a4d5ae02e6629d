//! Content-addressed filesystem trees
//!
//! Files hash their bytes; directories hash the digests of the files they
//! directly contain. Digests are computed lazily and memoized per node.

pub mod builder;
pub mod hasher;
pub mod memo;
pub mod node;
pub mod path;
pub mod walker;

pub use builder::{BuildConfig, ChildErrorPolicy, SkippedEntry, Tree, TreeBuilder};
pub use hasher::ContentHasher;
pub use node::{DirectoryNode, FileNode, Node};
