//! # Horizon: one independent publish/subscribe bus.
//!
//! A [`Horizon`] owns a FIFO queue of [`Message`]s and a map from message kind to
//! the handlers registered for it. Emitting never blocks: the message is queued and
//! a drain loop is spawned onto the Tokio runtime if none is active.
//!
//! ## Architecture
//! ```text
//! emit(kind, payload) ──► [queue] ──► drain loop (at most one per horizon)
//!                                          │
//!                                          ├─ pop oldest message
//!                                          ├─ snapshot handlers for its kind
//!                                          └─ for h in snapshot (insertion order):
//!                                                 dispatch(h, msg).await
//!                                                 └─ Err / panic ─► report(), continue
//! ```
//!
//! ## Rules
//! - **Non-blocking emit**: delivery never runs inline inside `emit()`.
//! - **FIFO per horizon**: messages are delivered in queue order.
//! - **Sequential handlers**: each handler is awaited before the next one starts.
//! - **Snapshot per message**: handlers added during a delivery see only later messages;
//!   handlers removed during a delivery still receive the message in progress.
//! - **Breadth-first re-entrancy**: an emit from inside a handler is queued and delivered
//!   after every handler of the current message has finished.
//! - **Pause**: the in-flight message completes; nothing new is pulled until `resume()`.
//!
//! All mutation of the queue and handler map happens under a short `std::sync::Mutex`
//! that is never held across an `.await`.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::runtime::Handle;
use tokio::sync::Notify;

use crate::engine::config::HorizonConfig;
use crate::engine::dispatch::{dispatch, report};
use crate::engine::subscription::Subscription;
use crate::error::HandlerError;
use crate::events::{Message, Payload};
use crate::handlers::{HandlerFn, HandlerRef};

/// One registered handler.
struct Registration {
    id: u64,
    handler: HandlerRef,
}

/// Mutable bus state, guarded by [`Shared::state`].
#[derive(Default)]
struct State {
    handlers: HashMap<Arc<str>, Vec<Registration>>,
    queue: VecDeque<Message>,
    draining: bool,
    paused: bool,
}

impl State {
    /// Claims the drain slot if there is work and nobody holds it.
    fn try_begin_drain(&mut self) -> bool {
        if self.draining || self.paused || self.queue.is_empty() {
            return false;
        }
        self.draining = true;
        true
    }

    /// Pulls the next message with a snapshot of its handlers.
    ///
    /// Releases the drain slot when there is nothing to pull; both happen under the
    /// same lock so a concurrent `emit` either sees `draining = true` and its message
    /// is picked up here, or sees `draining = false` and spawns a new loop.
    fn next_or_release(&mut self) -> Option<(Message, Vec<HandlerRef>)> {
        let msg = if self.paused {
            None
        } else {
            self.queue.pop_front()
        };
        let Some(msg) = msg else {
            self.draining = false;
            return None;
        };

        let snapshot = self
            .handlers
            .get(msg.kind())
            .map(|regs| regs.iter().map(|r| Arc::clone(&r.handler)).collect())
            .unwrap_or_default();
        Some((msg, snapshot))
    }

    fn is_settled(&self) -> bool {
        !self.draining && (self.paused || self.queue.is_empty())
    }
}

/// State shared between horizon handles, subscriptions and the drain loop.
pub(crate) struct Shared {
    state: Mutex<State>,
    idle: Notify,
    next_id: AtomicU64,
    config: HorizonConfig,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        // Nothing panics while the lock is held; recover the guard if it ever does.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes one registration; drops the kind's entry once its list is empty.
    pub(crate) fn off(&self, kind: &str, id: u64) -> bool {
        let (removed, remaining) = {
            let mut st = self.lock();
            let Some(regs) = st.handlers.get_mut(kind) else {
                return false;
            };
            let before = regs.len();
            regs.retain(|r| r.id != id);
            let removed = regs.len() != before;
            let remaining = regs.len();
            if remaining == 0 {
                st.handlers.remove(kind);
            }
            (removed, remaining)
        };

        if removed && self.config.log {
            tracing::debug!(target: "event_horizon", kind, count = remaining, "off");
        }
        removed
    }
}

/// Ownership of the drain slot for one spawned loop.
///
/// Dropping it releases the slot even if the loop never ran to completion (runtime
/// shutdown cancels the task, or drops it before the first poll), so the next
/// `emit`/`resume` can start a fresh loop over whatever is still queued.
struct DrainSlot {
    shared: Arc<Shared>,
    held: bool,
}

impl DrainSlot {
    async fn run(mut self) {
        loop {
            let next = self.shared.lock().next_or_release();
            let Some((msg, handlers)) = next else {
                // `next_or_release` already cleared the flag under the lock.
                self.held = false;
                break;
            };

            if self.shared.config.log {
                tracing::debug!(
                    target: "event_horizon",
                    kind = msg.kind(),
                    seq = msg.seq,
                    handlers = handlers.len(),
                    "deliver"
                );
            }

            for handler in &handlers {
                if let Err(err) = dispatch(handler, &msg).await {
                    report(handler, &msg, &err);
                }
            }
        }
    }
}

impl Drop for DrainSlot {
    fn drop(&mut self) {
        if self.held {
            self.shared.lock().draining = false;
            tracing::warn!(target: "event_horizon", "drain loop cancelled; slot released");
        }
        self.shared.idle.notify_waiters();
    }
}

/// Cloneable handle to one bus.
///
/// Clones share the same queue and handlers; the bus lives as long as any handle
/// (or an active drain loop) refers to it. Use [`Horizon::ptr_eq`] for identity.
#[derive(Clone)]
pub struct Horizon {
    shared: Arc<Shared>,
}

impl Default for Horizon {
    fn default() -> Self {
        Self::new()
    }
}

impl Horizon {
    /// Creates a horizon with the default configuration.
    pub fn new() -> Self {
        Self::with_config(HorizonConfig::default())
    }

    /// Creates a horizon with the given configuration.
    pub fn with_config(config: HorizonConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::default()),
                idle: Notify::new(),
                next_id: AtomicU64::new(0),
                config,
            }),
        }
    }

    /// Configuration this horizon was built with.
    pub fn config(&self) -> &HorizonConfig {
        &self.shared.config
    }

    /// True if both handles refer to the same bus.
    pub fn ptr_eq(a: &Horizon, b: &Horizon) -> bool {
        Arc::ptr_eq(&a.shared, &b.shared)
    }

    /// Registers `handler` for messages of `kind`.
    ///
    /// Every call creates a distinct registration, even for a handler that is
    /// already registered. The returned [`Subscription`] removes exactly this one.
    pub fn on(&self, kind: impl Into<Arc<str>>, handler: HandlerRef) -> Subscription {
        let kind: Arc<str> = kind.into();
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);

        let count = {
            let mut st = self.shared.lock();
            let regs = st.handlers.entry(Arc::clone(&kind)).or_default();
            regs.push(Registration { id, handler });
            regs.len()
        };

        if self.shared.config.log {
            tracing::debug!(target: "event_horizon", kind = &*kind, count, "on");
        }
        Subscription::new(Arc::downgrade(&self.shared), kind, id)
    }

    /// Registers a closure as a handler for messages of `kind`.
    pub fn on_fn<F, Fut>(&self, kind: impl Into<Arc<str>>, f: F) -> Subscription
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let kind: Arc<str> = kind.into();
        let handler = HandlerFn::arc(format!("on:{kind}"), f);
        self.on(kind, handler)
    }

    /// Queues a message and starts draining if idle and not paused.
    ///
    /// Returns immediately. When the queue is bounded and full, the message is
    /// dropped and a warning is traced.
    ///
    /// The drain loop runs on the current Tokio runtime. Outside a runtime the
    /// message stays queued and is delivered by the next `emit` or `resume` made
    /// inside one.
    pub fn emit(&self, kind: impl Into<Arc<str>>, payload: Payload) {
        let msg = Message::new(kind, payload);
        let limit = self.shared.config.capacity_limit();
        let runtime = Handle::try_current().ok();

        let (start, pending) = {
            let mut st = self.shared.lock();
            if limit.is_some_and(|cap| st.queue.len() >= cap) {
                drop(st);
                tracing::warn!(
                    target: "event_horizon",
                    kind = msg.kind(),
                    seq = msg.seq,
                    capacity = self.shared.config.queue_capacity,
                    "message dropped: queue full"
                );
                return;
            }
            st.queue.push_back(msg.clone());
            (runtime.is_some() && st.try_begin_drain(), st.queue.len())
        };

        if self.shared.config.log {
            tracing::debug!(
                target: "event_horizon",
                kind = msg.kind(),
                seq = msg.seq,
                pending,
                "emit"
            );
        }
        match runtime {
            Some(rt) if start => self.spawn_drain(&rt),
            Some(_) => {}
            None => tracing::warn!(
                target: "event_horizon",
                kind = msg.kind(),
                seq = msg.seq,
                "no tokio runtime: message left queued"
            ),
        }
    }

    /// Stops pulling messages off the queue. The in-flight message, if any, completes.
    pub fn pause(&self) {
        self.shared.lock().paused = true;
    }

    /// Clears the paused flag and drains whatever was queued meanwhile.
    ///
    /// Also restarts delivery of messages left queued by an `emit` made outside a
    /// runtime. Outside a runtime only the flag is cleared.
    pub fn resume(&self) {
        let runtime = Handle::try_current().ok();
        let start = {
            let mut st = self.shared.lock();
            st.paused = false;
            runtime.is_some() && st.try_begin_drain()
        };
        if let (true, Some(rt)) = (start, runtime) {
            self.spawn_drain(&rt);
        }
    }

    /// Waits until no drain loop is active and nothing deliverable is queued.
    ///
    /// A paused horizon with pending messages counts as settled.
    pub async fn settled(&self) {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.shared.lock().is_settled() {
                return;
            }
            notified.await;
        }
    }

    /// True if the horizon is paused.
    pub fn is_paused(&self) -> bool {
        self.shared.lock().paused
    }

    /// True while a drain loop is active.
    pub fn is_draining(&self) -> bool {
        self.shared.lock().draining
    }

    /// Number of messages waiting to be pulled.
    pub fn queued_len(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Number of live registrations for `kind`.
    pub fn listener_count(&self, kind: &str) -> usize {
        self.shared
            .lock()
            .handlers
            .get(kind)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// True if `kind` has an entry in the handler map.
    pub fn has_listeners(&self, kind: &str) -> bool {
        self.shared.lock().handlers.contains_key(kind)
    }

    /// Non-owning handle; does not keep the bus alive.
    ///
    /// Handlers that emit on their own horizon should capture this instead of a
    /// clone, otherwise the registration keeps the bus alive forever.
    pub fn downgrade(&self) -> WeakHorizon {
        WeakHorizon {
            shared: Arc::downgrade(&self.shared),
        }
    }

    // The slot is built before spawning so a task dropped unpolled still releases it.
    fn spawn_drain(&self, rt: &Handle) {
        let slot = DrainSlot {
            shared: Arc::clone(&self.shared),
            held: true,
        };
        rt.spawn(slot.run());
    }
}

/// Weak counterpart of [`Horizon`], obtained with [`Horizon::downgrade`].
#[derive(Clone, Debug, Default)]
pub struct WeakHorizon {
    shared: Weak<Shared>,
}

impl WeakHorizon {
    /// Returns a strong handle if the bus is still alive.
    pub fn upgrade(&self) -> Option<Horizon> {
        self.shared.upgrade().map(|shared| Horizon { shared })
    }
}

impl fmt::Debug for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.shared.lock();
        f.debug_struct("Horizon")
            .field("kinds", &st.handlers.len())
            .field("queued", &st.queue.len())
            .field("draining", &st.draining)
            .field("paused", &st.paused)
            .field("config", &self.shared.config)
            .finish()
    }
}
