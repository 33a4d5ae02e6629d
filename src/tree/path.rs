//! Path canonicalization and entry naming

use crate::error::StorageError;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Canonicalize a root path before walking it
///
/// Resolves `.`/`..` and symlinks in the root itself, so that the root
/// name is the real directory name even for inputs like `.` or `foo/`.
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, StorageError> {
    dunce::canonicalize(path).map_err(|e| StorageError::from_io(path, e))
}

/// Normalize an entry name to Unicode NFC
///
/// Names are compared across trees, and some filesystems hand back
/// decomposed forms.
pub fn normalize_name(name: &str) -> String {
    name.nfc().collect()
}

/// Display name of an entry: its last path component, NFC normalized
pub fn entry_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => os_name(name),
        // Filesystem root has no final component
        None => normalize_name(&path.to_string_lossy()),
    }
}

/// Raw name of an entry as the filesystem stores it
///
/// Siblings are matched on this key. Normalized names may collide (composed
/// and decomposed forms, lossy non-UTF-8), so they are for display only.
pub fn entry_key(path: &Path) -> OsString {
    match path.file_name() {
        Some(name) => name.to_os_string(),
        None => path.as_os_str().to_os_string(),
    }
}

/// Normalized form of a raw directory entry name
pub fn os_name(name: &OsStr) -> String {
    normalize_name(&name.to_string_lossy())
}
