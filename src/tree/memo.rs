//! Compute-once cell for lazily derived node values

use parking_lot::Mutex;
use std::sync::OnceLock;

/// A value that is either not yet computed or fixed forever
///
/// Reads after initialization are lock-free. First initialization is
/// serialized by a guard so a fallible computation runs at most once
/// successfully, and a failed attempt leaves the cell empty.
#[derive(Debug, Default)]
pub struct Memo<T> {
    value: OnceLock<T>,
    init: Mutex<()>,
}

impl<T: Copy> Memo<T> {
    pub fn new() -> Self {
        Self {
            value: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// The cached value, if computed.
    pub fn get(&self) -> Option<T> {
        self.value.get().copied()
    }

    pub fn is_set(&self) -> bool {
        self.value.get().is_some()
    }

    /// Return the cached value or run `f` once to produce it.
    pub fn get_or_try_init<E>(&self, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        if let Some(v) = self.get() {
            return Ok(v);
        }

        let _guard = self.init.lock();
        // Another caller may have finished while we waited
        if let Some(v) = self.get() {
            return Ok(v);
        }

        let v = f()?;
        Ok(*self.value.get_or_init(|| v))
    }
}
