//! # Messages carried by a horizon.
//!
//! A [`Message`] is an immutable `{kind, payload}` pair. The payload is type-erased
//! ([`Payload`]) so that a single horizon can carry heterogeneous messages; handlers
//! recover the concrete type with [`Payload::downcast_ref`].
//!
//! ## Ordering guarantees
//! Each message gets a process-wide sequence number (`seq`) at construction.
//! Within one horizon, delivery follows queue order, which is also `seq` order for
//! messages emitted from a single task. Across horizons `seq` is informational only.
//!
//! ## Example
//! ```rust
//! use event_horizon::{Message, Payload};
//!
//! let msg = Message::new("ping", Payload::new(7u32));
//!
//! assert_eq!(msg.kind(), "ping");
//! assert_eq!(msg.payload().downcast_ref::<u32>(), Some(&7));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Global sequence counter for message ordering.
static MESSAGE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Type-erased, cheaply cloneable message payload.
#[derive(Clone)]
pub struct Payload(Option<Arc<dyn Any + Send + Sync>>);

impl Payload {
    /// Wraps a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    /// A payload carrying nothing.
    pub fn empty() -> Self {
        Self(None)
    }

    /// True if the payload carries no value.
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|v| v.downcast_ref::<T>())
    }

    /// Returns the value as a shared `Arc<T>` if it is a `T`.
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.0.clone().and_then(|v| v.downcast::<T>().ok())
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("Payload(<empty>)"),
            Some(_) => f.write_str("Payload(..)"),
        }
    }
}

/// Queued unit of delivery.
#[derive(Clone, Debug)]
pub struct Message {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    kind: Arc<str>,
    payload: Payload,
}

impl Message {
    /// Creates a new message and assigns the next sequence number.
    pub fn new(kind: impl Into<Arc<str>>, payload: Payload) -> Self {
        Self {
            seq: MESSAGE_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind: kind.into(),
            payload,
        }
    }

    /// Message kind (the routing key).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Message payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}
