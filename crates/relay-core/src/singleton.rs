//! Explicitly managed process-wide instance slot.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// A slot holding at most one shared instance.
///
/// Unlike `OnceLock`, the slot can be emptied again with [`Singleton::take`],
/// so an instance is constructed explicitly on first access and torn down
/// explicitly. Tests create their own slot instead of touching the global one.
pub struct Singleton<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> Singleton<T> {
    /// Creates an empty slot. Usable in `static` position.
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Returns the current instance, constructing it with `init` if the slot
    /// is empty.
    ///
    /// `init` runs while the slot is locked, so concurrent callers never
    /// construct two instances.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> Arc<T> {
        let mut slot = self.slot.lock();
        match slot.as_ref() {
            Some(instance) => Arc::clone(instance),
            None => {
                let instance = Arc::new(init());
                *slot = Some(Arc::clone(&instance));
                instance
            }
        }
    }

    /// Constructs and installs an instance only if the slot is empty.
    ///
    /// Returns `None`, without running `init`, when the slot is occupied.
    /// The check and the install happen under one lock.
    pub fn try_init(&self, init: impl FnOnce() -> T) -> Option<Arc<T>> {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            return None;
        }
        let instance = Arc::new(init());
        *slot = Some(Arc::clone(&instance));
        Some(instance)
    }

    /// Returns the current instance without constructing one.
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.lock().clone()
    }

    /// Empties the slot and returns what it held.
    pub fn take(&self) -> Option<Arc<T>> {
        self.slot.lock().take()
    }

    /// Returns `true` if the slot currently holds an instance.
    pub fn is_initialized(&self) -> bool {
        self.slot.lock().is_some()
    }
}

impl<T> Default for Singleton<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Singleton<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Singleton")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
