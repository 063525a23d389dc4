//! # Scope resolver.
//!
//! Looks up a horizon by name in the registry in effect and classifies failures:
//!
//! ```text
//! registry.lookup(name) ── Some(h) ──────────────► Ok(h)
//!          │
//!          None ──► index.exists(name) ── true ──► NotInScope
//!                                      └─ false ─► NotFound
//! ```
//!
//! The existence index is consulted only to classify a failure; it never makes an
//! invisible horizon reachable.

use std::sync::Arc;

use crate::engine::Horizon;
use crate::error::{HorizonError, ScopeFailure};
use crate::events::Payload;
use crate::scope::index::ExistenceIndex;
use crate::scope::registry::Registry;

/// Name resolution against a registry plus an existence index.
#[derive(Clone, Debug)]
pub struct Resolver {
    index: Arc<ExistenceIndex>,
}

impl Default for Resolver {
    /// Resolver backed by the process-wide index.
    fn default() -> Self {
        Self::new(ExistenceIndex::global())
    }
}

impl Resolver {
    /// Creates a resolver backed by `index`.
    pub fn new(index: Arc<ExistenceIndex>) -> Self {
        Self { index }
    }

    /// The existence index used for classification.
    pub fn index(&self) -> &Arc<ExistenceIndex> {
        &self.index
    }

    /// Returns the horizon bound to `name` in `registry`.
    ///
    /// # Errors
    /// - [`HorizonError::NotInScope`] if `name` is bound elsewhere in the process
    /// - [`HorizonError::NotFound`] otherwise
    pub fn resolve(&self, registry: &Registry, name: &str) -> Result<Horizon, HorizonError> {
        registry
            .lookup(name)
            .cloned()
            .ok_or_else(|| self.classify(name))
    }

    /// Emits to the horizon named `name`, reporting scoping failures as a value.
    ///
    /// Never panics on a missing name; callers that must not propagate errors
    /// inspect [`ScopeFailure::code`] instead.
    pub fn resolve_safe(
        &self,
        registry: &Registry,
        name: &str,
        kind: impl Into<Arc<str>>,
        payload: Payload,
    ) -> Result<(), ScopeFailure> {
        let target = self.resolve(registry, name).map_err(ScopeFailure::from)?;
        target.emit(kind, payload);
        Ok(())
    }

    /// Returns the current horizon, or [`HorizonError::NoActiveScope`] if there is none.
    pub fn resolve_current(current: Option<&Horizon>) -> Result<Horizon, HorizonError> {
        current.cloned().ok_or(HorizonError::NoActiveScope)
    }

    fn classify(&self, name: &str) -> HorizonError {
        if self.index.exists(name) {
            HorizonError::NotInScope {
                name: name.to_string(),
            }
        } else {
            HorizonError::NotFound {
                name: name.to_string(),
            }
        }
    }
}
