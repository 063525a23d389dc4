//! # Subscription handle.
//!
//! Returned by [`Horizon::on`](crate::Horizon::on). Calling
//! [`unsubscribe`](Subscription::unsubscribe) removes exactly that registration.
//!
//! Dropping the handle does **not** unsubscribe: a registration stays live for the
//! horizon's lifetime unless removed explicitly. This makes the handle fit an
//! effect primitive directly: subscribe when the effect runs, hand
//! [`into_cleanup`](Subscription::into_cleanup) back as the cleanup.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::engine::horizon::Shared;

/// Handle to one `(kind, handler)` registration.
#[must_use = "dropping a Subscription leaves the handler registered; call unsubscribe() to remove it"]
pub struct Subscription {
    horizon: Weak<Shared>,
    kind: Arc<str>,
    id: u64,
    done: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(horizon: Weak<Shared>, kind: Arc<str>, id: u64) -> Self {
        Self {
            horizon,
            kind,
            id,
            done: AtomicBool::new(false),
        }
    }

    /// Message kind this registration listens to.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// True while [`unsubscribe`](Self::unsubscribe) has not been called and the horizon is still alive.
    pub fn is_active(&self) -> bool {
        !self.done.load(Ordering::Acquire) && self.horizon.strong_count() > 0
    }

    /// Removes the registration. Idempotent: later calls are no-ops.
    ///
    /// A delivery already in progress still reaches this handler; later ones do not.
    pub fn unsubscribe(&self) {
        if self.done.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(shared) = self.horizon.upgrade() {
            shared.off(&self.kind, self.id);
        }
    }

    /// Converts the handle into a cleanup closure for effect-style bindings.
    pub fn into_cleanup(self) -> impl FnOnce() + Send + 'static {
        move || self.unsubscribe()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Horizon, Payload};

    #[tokio::test]
    async fn test_cleanup_removes_registration() {
        let h = Horizon::new();
        let sub = h.on_fn("k", |_msg| async move { Ok(()) });
        assert!(sub.is_active());
        assert_eq!(sub.kind(), "k");

        let cleanup = sub.into_cleanup();
        cleanup();
        assert!(!h.has_listeners("k"));

        h.emit("k", Payload::empty());
        h.settled().await;
    }

    #[test]
    fn test_only_own_registration_is_removed() {
        let h = Horizon::new();
        let a = h.on_fn("k", |_msg| async move { Ok(()) });
        let b = h.on_fn("k", |_msg| async move { Ok(()) });
        assert_eq!(h.listener_count("k"), 2);

        a.unsubscribe();
        a.unsubscribe();
        assert_eq!(h.listener_count("k"), 1);
        assert!(!a.is_active());
        assert!(b.is_active());

        b.unsubscribe();
        assert!(!h.has_listeners("k"));
    }

    #[test]
    fn test_outlives_horizon() {
        let h = Horizon::new();
        let sub = h.on_fn("k", |_msg| async move { Ok(()) });
        assert!(sub.is_active());
        drop(h);
        assert!(!sub.is_active());
        sub.unsubscribe();
    }
}
