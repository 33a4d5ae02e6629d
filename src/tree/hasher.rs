//! Streaming content hashing using BLAKE3

use crate::error::StorageError;
use crate::types::Digest;
use blake3::Hasher;
use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;
use std::time::Instant;
use tracing::{instrument, trace};

/// Default read size: 64 KiB
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Carried inside the `TimedOut` error a passed deadline raises
#[derive(Debug, thiserror::Error)]
#[error("hash deadline exceeded")]
struct DeadlinePassed;

fn is_deadline(err: &io::Error) -> bool {
    err.get_ref()
        .is_some_and(|inner| inner.is::<DeadlinePassed>())
}

/// Computes content digests by streaming a reader in fixed-size chunks
///
/// The digest only depends on the bytes read, never on the chunk size used
/// to read them.
#[derive(Debug, Clone)]
pub struct ContentHasher {
    chunk_size: usize,
    deadline: Option<Instant>,
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            deadline: None,
        }
    }
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different read size. Zero is clamped to one byte.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Fail any hash still running after `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Hash a byte stream until EOF.
    ///
    /// Read errors are returned as-is. A passed deadline surfaces as
    /// `ErrorKind::TimedOut`.
    pub fn digest<R: Read>(&self, mut reader: R) -> io::Result<Digest> {
        let mut hasher = Hasher::new();
        let mut buf = vec![0u8; self.chunk_size];

        loop {
            if self.deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(io::Error::new(ErrorKind::TimedOut, DeadlinePassed));
            }
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buf[..n]);
        }

        Ok(hasher.finalize().into())
    }

    /// Open and hash a file, classifying failures by path.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn digest_file(&self, path: &Path) -> Result<Digest, StorageError> {
        let file = File::open(path).map_err(|e| StorageError::from_io(path, e))?;
        let digest = self.digest(file).map_err(|e| {
            if is_deadline(&e) {
                StorageError::DeadlineExceeded(path.to_path_buf())
            } else {
                StorageError::from_io(path, e)
            }
        })?;
        trace!(digest = %digest, "Hashed file");
        Ok(digest)
    }
}

/// Hash an in-memory buffer
pub fn digest_bytes(content: &[u8]) -> Digest {
    blake3::hash(content).into()
}
