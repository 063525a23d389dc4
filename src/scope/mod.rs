//! Scoped name resolution.
//!
//! Visibility and existence are deliberately different questions:
//! - [`Registry`] — which names are visible from a position (copy-on-derive tree);
//! - [`ExistenceIndex`] — which names are bound anywhere right now (ref-counted);
//! - [`Resolver`] — lookup in the registry, classification via the index;
//! - [`Scope`] — a tree position tying the three together with the current horizon.
//!
//! ```text
//!            ┌─────────────────────┐
//!  name ───► │ Registry (visible?) │── yes ──► Horizon
//!            └─────────┬───────────┘
//!                      no
//!            ┌─────────▼───────────┐
//!            │ ExistenceIndex      │── yes ──► NotInScope
//!            │ (exists anywhere?)  │── no  ──► NotFound
//!            └─────────────────────┘
//! ```

mod index;
mod registry;
mod resolver;
#[allow(clippy::module_inception)]
mod scope;

pub use index::{ExistenceIndex, NameClaim};
pub use registry::Registry;
pub use resolver::Resolver;
pub use scope::{Scope, ScopeSpec};
