//! # Name registry tree.
//!
//! A [`Registry`] is an immutable snapshot mapping names to horizons: "what is
//! visible from here". A child registry is derived from its parent by copying the
//! parent's entries and adding (or overriding) at most one binding.
//!
//! ```text
//! root {}                     derive(None, h0)        → {}
//!  ├─ app {app: h1}           derive(Some("app"), h1) → {app: h1}
//!  │   └─ panel {app: h1, panel: h2}
//!  │        └─ inner {app: h3, panel: h2}   (shadows "app" in this subtree only)
//!  └─ side {side: h4}         (never sees "app")
//! ```
//!
//! Derivation never mutates the parent, so registries held by other scopes are
//! unaffected no matter in which order scopes are torn down.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::Horizon;

/// Immutable name → horizon mapping.
#[derive(Clone, Default)]
pub struct Registry {
    entries: Arc<HashMap<String, Horizon>>,
}

impl Registry {
    /// Creates an empty registry (the root of a tree).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a child registry with `name` (if any) bound to `horizon`.
    ///
    /// Without a name the child sees exactly what the parent sees and the
    /// snapshot is shared rather than copied.
    #[must_use]
    pub fn derive(&self, name: Option<&str>, horizon: &Horizon) -> Registry {
        let Some(name) = name else {
            return self.clone();
        };
        let mut entries = HashMap::clone(&self.entries);
        entries.insert(name.to_string(), horizon.clone());
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Returns the horizon bound to `name`, if visible.
    pub fn lookup(&self, name: &str) -> Option<&Horizon> {
        self.entries.get(name)
    }

    /// True if `name` is visible.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns sorted list of visible names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Number of visible names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}
