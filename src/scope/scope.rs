//! # Scopes: positions in a hierarchical tree.
//!
//! A [`Scope`] bundles what a position in the tree needs to address horizons:
//! - the **current** horizon (nearest enclosing one, if any),
//! - the **registry** in effect (names visible from here),
//! - the **resolver** (registry lookup + existence classification).
//!
//! ## Lifecycle
//! ```text
//! Scope::root()                      no current horizon, empty registry
//!   └─ establish(ScopeSpec)          ─► claim name in index (once)
//!        │                           ─► derive registry (once)
//!        └─ drop last handle         ─► release name claim
//!           (and of every descendant)
//! ```
//!
//! Establishing and tearing down a scope are the only places that touch the
//! existence index, so `register`/`unregister` stay paired however many clones of
//! a scope handle exist. A child holds its parent, so a name stays claimed while
//! any scope below it is alive.
//!
//! ## Example
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use event_horizon::{ErrorCode, HorizonError, Payload, Scope, ScopeSpec};
//!
//! let root = Scope::root_isolated();
//! let left = root.establish(ScopeSpec::named("left"));
//! let right = root.establish(ScopeSpec::new());
//!
//! assert!(matches!(right.named("left"), Err(HorizonError::NotInScope { .. })));
//!
//! let res = right.emit_to_safe("left", "ping", Payload::empty());
//! assert_eq!(res.unwrap_err().code, ErrorCode::NotInScope);
//!
//! drop(left);
//! assert!(matches!(right.named("left"), Err(HorizonError::NotFound { .. })));
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::engine::{Horizon, HorizonConfig, Subscription};
use crate::error::{HandlerError, HorizonError, ScopeFailure};
use crate::events::{Message, Payload};
use crate::handlers::{HandlerFn, HandlerRef};
use crate::scope::index::{ExistenceIndex, NameClaim};
use crate::scope::registry::Registry;
use crate::scope::resolver::Resolver;

/// Declaration of a new scope region.
///
/// The region always defines a horizon: either the provided instance or a new one
/// built from `config`. The name is optional; unnamed regions are reachable only as
/// the current horizon of their subtree.
#[derive(Clone, Debug, Default)]
pub struct ScopeSpec {
    name: Option<String>,
    horizon: Option<Horizon>,
    config: HorizonConfig,
}

impl ScopeSpec {
    /// An unnamed region with a fresh horizon.
    pub fn new() -> Self {
        Self::default()
    }

    /// A region addressable by `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().with_name(name)
    }

    /// Sets the region name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Uses an existing horizon instead of creating one.
    pub fn with_horizon(mut self, horizon: Horizon) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Config for the horizon created by this region (ignored with `with_horizon`).
    pub fn with_config(mut self, config: HorizonConfig) -> Self {
        self.config = config;
        self
    }

    /// Shorthand for toggling the created horizon's log flag.
    pub fn with_log(mut self, log: bool) -> Self {
        self.config.log = log;
        self
    }

    /// Declared name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[derive(Debug)]
struct Node {
    parent: Option<Arc<Node>>,
    current: Option<Horizon>,
    registry: Registry,
    resolver: Resolver,
    claim: Option<NameClaim>,
}

/// Cloneable handle to one position in the scope tree.
///
/// Clones refer to the same position. The name claim of an established scope is
/// released once the last clone and every scope established below it are dropped.
#[derive(Clone, Debug)]
pub struct Scope {
    node: Arc<Node>,
}

impl Scope {
    /// Root of a tree backed by the process-wide existence index.
    pub fn root() -> Self {
        Self::root_with(Resolver::default())
    }

    /// Root of a tree backed by its own existence index.
    pub fn root_isolated() -> Self {
        Self::root_with(Resolver::new(Arc::new(ExistenceIndex::new())))
    }

    /// Root of a tree using `resolver`.
    pub fn root_with(resolver: Resolver) -> Self {
        Self {
            node: Arc::new(Node {
                parent: None,
                current: None,
                registry: Registry::new(),
                resolver,
                claim: None,
            }),
        }
    }

    /// Establishes a child region below this scope.
    ///
    /// Claims the declared name in the existence index and derives the child's
    /// registry; both happen exactly once per call.
    #[must_use = "the region is torn down as soon as the returned scope is dropped"]
    pub fn establish(&self, spec: ScopeSpec) -> Scope {
        let ScopeSpec {
            name,
            horizon,
            config,
        } = spec;
        let horizon = horizon.unwrap_or_else(|| Horizon::with_config(config));
        let registry = self.node.registry.derive(name.as_deref(), &horizon);
        let claim = name.map(|n| self.node.resolver.index().claim(n));

        if horizon.config().log {
            tracing::debug!(
                target: "event_horizon",
                name = claim.as_ref().map(NameClaim::name),
                visible = registry.len(),
                "scope established"
            );
        }

        Scope {
            node: Arc::new(Node {
                parent: Some(Arc::clone(&self.node)),
                current: Some(horizon),
                registry,
                resolver: self.node.resolver.clone(),
                claim,
            }),
        }
    }

    /// Scope this one was established under, or `None` at the root.
    pub fn parent(&self) -> Option<Scope> {
        self.node.parent.as_ref().map(|node| Scope {
            node: Arc::clone(node),
        })
    }

    /// Nearest enclosing horizon, or `None` at the root.
    pub fn current(&self) -> Option<&Horizon> {
        self.node.current.as_ref()
    }

    /// Registry in effect at this position.
    pub fn registry(&self) -> &Registry {
        &self.node.registry
    }

    /// Resolver shared by the whole tree.
    pub fn resolver(&self) -> &Resolver {
        &self.node.resolver
    }

    /// Name declared by this scope, if any.
    pub fn name(&self) -> Option<&str> {
        self.node.claim.as_ref().map(NameClaim::name)
    }

    /// Current horizon, or [`HorizonError::NoActiveScope`].
    pub fn horizon(&self) -> Result<Horizon, HorizonError> {
        Resolver::resolve_current(self.current())
    }

    /// Horizon named `name` as seen from here.
    pub fn named(&self, name: &str) -> Result<Horizon, HorizonError> {
        self.node.resolver.resolve(&self.node.registry, name)
    }

    /// Emits on the current horizon.
    pub fn emit(&self, kind: impl Into<Arc<str>>, payload: Payload) -> Result<(), HorizonError> {
        self.horizon()?.emit(kind, payload);
        Ok(())
    }

    /// Emits on the horizon named `name`.
    pub fn emit_to(
        &self,
        name: &str,
        kind: impl Into<Arc<str>>,
        payload: Payload,
    ) -> Result<(), HorizonError> {
        self.named(name)?.emit(kind, payload);
        Ok(())
    }

    /// Emits on the horizon named `name`, returning scoping failures as a value.
    pub fn emit_to_safe(
        &self,
        name: &str,
        kind: impl Into<Arc<str>>,
        payload: Payload,
    ) -> Result<(), ScopeFailure> {
        self.node
            .resolver
            .resolve_safe(&self.node.registry, name, kind, payload)
    }

    /// Subscribes on the current horizon.
    pub fn on(
        &self,
        kind: impl Into<Arc<str>>,
        handler: HandlerRef,
    ) -> Result<Subscription, HorizonError> {
        Ok(self.horizon()?.on(kind, handler))
    }

    /// Subscribes a closure on the current horizon.
    pub fn on_fn<F, Fut>(
        &self,
        kind: impl Into<Arc<str>>,
        f: F,
    ) -> Result<Subscription, HorizonError>
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Ok(self.horizon()?.on_fn(kind, f))
    }

    /// Subscribes on the horizon named `name`.
    pub fn on_named(
        &self,
        name: &str,
        kind: impl Into<Arc<str>>,
        handler: HandlerRef,
    ) -> Result<Subscription, HorizonError> {
        Ok(self.named(name)?.on(kind, handler))
    }

    /// Subscribes on the horizon named `name`, or quietly does nothing if it is not visible.
    pub fn on_named_safe(
        &self,
        name: &str,
        kind: impl Into<Arc<str>>,
        handler: HandlerRef,
    ) -> Option<Subscription> {
        self.node
            .registry
            .lookup(name)
            .map(|target| target.on(kind, handler))
    }

    /// Closure form of [`Scope::on_named_safe`].
    pub fn on_named_fn_safe<F, Fut>(
        &self,
        name: &str,
        kind: impl Into<Arc<str>>,
        f: F,
    ) -> Option<Subscription>
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let kind: Arc<str> = kind.into();
        let handler = HandlerFn::arc(format!("{name}:{kind}"), f);
        self.on_named_safe(name, kind, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::sync::Mutex;

    #[test]
    fn test_root_has_no_active_scope() {
        let root = Scope::root_isolated();
        assert!(root.current().is_none());
        assert_eq!(root.horizon().unwrap_err(), HorizonError::NoActiveScope);
        assert_eq!(
            root.emit("x", Payload::empty()).unwrap_err(),
            HorizonError::NoActiveScope
        );
        assert!(root.on_fn("x", |_msg| async move { Ok(()) }).is_err());
    }

    #[test]
    fn test_establish_registers_once_per_region() {
        let root = Scope::root_isolated();
        let index = Arc::clone(root.resolver().index());

        let app = root.establish(ScopeSpec::named("app"));
        let again = app.clone();
        assert_eq!(app.name(), Some("app"));
        assert_eq!(index.count("app"), 1);

        drop(app);
        assert!(index.exists("app"));
        drop(again);
        assert!(!index.exists("app"));
    }

    #[test]
    fn test_descendant_keeps_ancestor_name_claimed() {
        let root = Scope::root_isolated();
        let index = Arc::clone(root.resolver().index());

        let app = root.establish(ScopeSpec::named("app"));
        let panel = app.establish(ScopeSpec::named("panel"));
        drop(app);
        assert_eq!(index.count("app"), 1);
        assert!(panel.named("app").is_ok());
        assert_eq!(panel.parent().and_then(|p| p.name().map(str::to_owned)).as_deref(), Some("app"));
        assert!(root.parent().is_none());

        drop(panel);
        assert!(!index.exists("app"));
        assert!(!index.exists("panel"));
    }

    #[test]
    fn test_unnamed_region_is_current_but_not_addressable() {
        let root = Scope::root_isolated();
        let region = root.establish(ScopeSpec::new());
        assert!(region.current().is_some());
        assert!(region.registry().is_empty());
        assert!(region.name().is_none());
    }

    #[test]
    fn test_provided_horizon_is_used() {
        let root = Scope::root_isolated();
        let h = Horizon::new();
        let region = root.establish(ScopeSpec::named("shared").with_horizon(h.clone()));

        assert!(Horizon::ptr_eq(&region.horizon().unwrap(), &h));
        assert!(Horizon::ptr_eq(&region.named("shared").unwrap(), &h));
    }

    #[test]
    fn test_config_reaches_created_horizon() {
        let root = Scope::root_isolated();
        let region = root.establish(ScopeSpec::new().with_log(true));
        assert!(region.horizon().unwrap().config().log);
    }

    #[test]
    fn test_on_named_safe_skips_invisible() {
        let root = Scope::root_isolated();
        let _left = root.establish(ScopeSpec::named("left"));
        let right = root.establish(ScopeSpec::named("right"));

        assert!(right
            .on_named_fn_safe("left", "ping", |_msg| async move { Ok(()) })
            .is_none());

        let sub = right.on_named_fn_safe("right", "ping", |_msg| async move { Ok(()) });
        assert!(sub.is_some());
        assert_eq!(right.horizon().unwrap().listener_count("ping"), 1);
    }

    #[tokio::test]
    async fn test_emit_to_named_ancestor() {
        let root = Scope::root_isolated();
        let app = root.establish(ScopeSpec::named("app"));
        let panel = app.establish(ScopeSpec::named("panel"));

        let got: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let g = Arc::clone(&got);
        let _sub = app
            .on_fn("saved", move |msg| {
                let g = Arc::clone(&g);
                async move {
                    if let Some(doc) = msg.payload().downcast_ref::<String>() {
                        g.lock().unwrap().push(doc.clone());
                    }
                    Ok(())
                }
            })
            .unwrap();

        panel
            .emit_to("app", "saved", Payload::new(String::from("doc-1")))
            .unwrap();
        assert_eq!(
            panel.emit_to_safe("app", "saved", Payload::new(String::from("doc-2"))),
            Ok(())
        );
        app.horizon().unwrap().settled().await;
        assert_eq!(*got.lock().unwrap(), vec!["doc-1", "doc-2"]);

        let failure = panel
            .emit_to_safe("nowhere", "saved", Payload::empty())
            .unwrap_err();
        assert_eq!(failure.code, ErrorCode::NotFound);
    }
}
