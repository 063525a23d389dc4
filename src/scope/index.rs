//! # Global existence index.
//!
//! Answers "is this name bound anywhere right now", independent of whether it is
//! visible from the caller's scope. Visibility lives in [`Registry`](crate::Registry);
//! existence lives here.
//!
//! ## Rules
//! - Reference counted: each established named scope holds one count.
//! - `register` / `unregister` are paired one-to-one with scope establishment and
//!   teardown; [`NameClaim`] ties the pair to a value's lifetime.
//! - An entry is removed when its count reaches zero.
//! - Unregistering a name that is not present is a no-op.
//!
//! The process-wide instance is reached through [`ExistenceIndex::global`]; separate
//! instances can be created for isolated trees (tests, embedded runtimes).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

static GLOBAL: OnceLock<Arc<ExistenceIndex>> = OnceLock::new();

/// Reference-counted set of names bound anywhere in a tree.
#[derive(Default)]
pub struct ExistenceIndex {
    names: Mutex<HashMap<String, usize>>,
}

impl ExistenceIndex {
    /// Creates an empty, standalone index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide index.
    pub fn global() -> Arc<ExistenceIndex> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ExistenceIndex::new())))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        self.names.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Increments the count for `name`.
    pub fn register(&self, name: &str) {
        *self.lock().entry(name.to_string()).or_insert(0) += 1;
    }

    /// Decrements the count for `name`, removing the entry at zero.
    pub fn unregister(&self, name: &str) {
        let mut names = self.lock();
        let Some(count) = names.get_mut(name) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            names.remove(name);
        }
    }

    /// True iff `name` is bound somewhere.
    pub fn exists(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Current reference count for `name` (`0` if absent).
    pub fn count(&self, name: &str) -> usize {
        self.lock().get(name).copied().unwrap_or(0)
    }

    /// Registers `name` and returns a guard that unregisters it on drop.
    pub fn claim(self: &Arc<Self>, name: impl Into<String>) -> NameClaim {
        let name = name.into();
        self.register(&name);
        NameClaim {
            index: Arc::clone(self),
            name,
        }
    }
}

impl fmt::Debug for ExistenceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.lock().iter()).finish()
    }
}

/// One registration in an [`ExistenceIndex`], released on drop.
pub struct NameClaim {
    index: Arc<ExistenceIndex>,
    name: String,
}

impl NameClaim {
    /// The claimed name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for NameClaim {
    fn drop(&mut self) {
        self.index.unregister(&self.name);
    }
}

impl fmt::Debug for NameClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NameClaim").field(&self.name).finish()
    }
}
