//! Tree entities: files (leaves) and directories (interiors)
//!
//! Each node is exclusively owned by its parent and computes its digest
//! lazily, at most once. After the first successful computation the digest
//! is a snapshot: later changes on disk are not observed.

use crate::error::StorageError;
use crate::tree::hasher::ContentHasher;
use crate::tree::memo::Memo;
use crate::tree::path;
use crate::types::{Digest, NodeKind};
use blake3::Hasher;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// A node in a built tree
#[derive(Debug)]
pub enum Node {
    File(FileNode),
    Directory(DirectoryNode),
}

/// A file; its digest is the hash of its bytes
#[derive(Debug)]
pub struct FileNode {
    path: PathBuf,
    key: OsString,
    name: String,
    digest: Memo<Digest>,
}

/// A directory and the entries it directly contains
///
/// Children are kept sorted by their raw name.
#[derive(Debug)]
pub struct DirectoryNode {
    path: PathBuf,
    key: OsString,
    name: String,
    children: Vec<Node>,
    digest: Memo<Digest>,
}

impl Node {
    /// Display name, NFC normalized.
    pub fn name(&self) -> &str {
        match self {
            Node::File(f) => &f.name,
            Node::Directory(d) => &d.name,
        }
    }

    /// Raw name used to match siblings across trees.
    pub fn key(&self) -> &OsStr {
        match self {
            Node::File(f) => &f.key,
            Node::Directory(d) => &d.key,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Node::File(f) => &f.path,
            Node::Directory(d) => &d.path,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::File(_) => NodeKind::File,
            Node::Directory(_) => NodeKind::Directory,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match self {
            Node::Directory(d) => Some(d),
            Node::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(f) => Some(f),
            Node::Directory(_) => None,
        }
    }

    /// Digest using the default hasher.
    pub fn digest(&self) -> Result<Digest, StorageError> {
        self.digest_with(&ContentHasher::default())
    }

    pub fn digest_with(&self, hasher: &ContentHasher) -> Result<Digest, StorageError> {
        match self {
            Node::File(f) => f.digest_with(hasher),
            Node::Directory(d) => d.digest_with(hasher),
        }
    }

    /// The memoized digest, without triggering any I/O.
    pub fn cached_digest(&self) -> Option<Digest> {
        match self {
            Node::File(f) => f.digest.get(),
            Node::Directory(d) => d.digest.get(),
        }
    }

    /// Force every digest in this subtree.
    pub fn hash_all(&self, hasher: &ContentHasher) -> Result<Digest, StorageError> {
        if let Node::Directory(d) = self {
            for child in d.directories() {
                Node::hash_subtree(child, hasher)?;
            }
        }
        self.digest_with(hasher)
    }

    fn hash_subtree(dir: &DirectoryNode, hasher: &ContentHasher) -> Result<(), StorageError> {
        for child in dir.directories() {
            Node::hash_subtree(child, hasher)?;
        }
        dir.digest_with(hasher)?;
        Ok(())
    }
}

impl From<FileNode> for Node {
    fn from(file: FileNode) -> Self {
        Node::File(file)
    }
}

impl From<DirectoryNode> for Node {
    fn from(dir: DirectoryNode) -> Self {
        Node::Directory(dir)
    }
}

impl FileNode {
    pub fn new(path: PathBuf) -> Self {
        let name = path::entry_name(&path);
        Self::with_name(path, name)
    }

    pub fn with_name(path: PathBuf, name: String) -> Self {
        Self {
            key: path::entry_key(&path),
            path,
            name,
            digest: Memo::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &OsStr {
        &self.key
    }

    pub fn digest(&self) -> Result<Digest, StorageError> {
        self.digest_with(&ContentHasher::default())
    }

    /// Hash the file on first call; later calls return the cached value.
    pub fn digest_with(&self, hasher: &ContentHasher) -> Result<Digest, StorageError> {
        self.digest
            .get_or_try_init(|| hasher.digest_file(&self.path))
    }

    pub fn is_hashed(&self) -> bool {
        self.digest.is_set()
    }
}

impl DirectoryNode {
    pub fn new(path: PathBuf, children: Vec<Node>) -> Self {
        let name = path::entry_name(&path);
        Self::with_name(path, name, children)
    }

    pub fn with_name(path: PathBuf, name: String, mut children: Vec<Node>) -> Self {
        children.sort_by(|a, b| a.key().cmp(b.key()));
        Self {
            key: path::entry_key(&path),
            path,
            name,
            children,
            digest: Memo::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &OsStr {
        &self.key
    }

    /// All direct children, sorted by raw name.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn files(&self) -> impl Iterator<Item = &FileNode> {
        self.children.iter().filter_map(Node::as_file)
    }

    pub fn directories(&self) -> impl Iterator<Item = &DirectoryNode> {
        self.children.iter().filter_map(Node::as_directory)
    }

    /// Child with exactly this raw name.
    pub fn child(&self, key: impl AsRef<OsStr>) -> Option<&Node> {
        let key = key.as_ref();
        self.children
            .binary_search_by(|c| c.key().cmp(key))
            .ok()
            .map(|i| &self.children[i])
    }

    pub fn digest(&self) -> Result<Digest, StorageError> {
        self.digest_with(&ContentHasher::default())
    }

    /// Hash of the direct file digests, in raw name order.
    ///
    /// Sub-directories do not contribute: two directories holding the same
    /// files hash equal whatever their nested layout.
    pub fn digest_with(&self, hasher: &ContentHasher) -> Result<Digest, StorageError> {
        self.digest.get_or_try_init(|| {
            let mut acc = Hasher::new();
            for file in self.files() {
                let digest = file.digest_with(hasher)?;
                acc.update(digest.to_hex().as_bytes());
            }
            Ok(acc.finalize().into())
        })
    }

    pub fn file_count(&self) -> usize {
        self.files().count() + self.directories().map(|d| d.file_count()).sum::<usize>()
    }

    pub fn directory_count(&self) -> usize {
        self.directories()
            .map(|d| 1 + d.directory_count())
            .sum::<usize>()
    }
}
