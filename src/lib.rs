//! # event-horizon
//!
//! **event-horizon** is an in-process, scoped publish/subscribe library for Rust.
//!
//! Many independent buses ([`Horizon`]s) can live side by side. Each may be
//! addressable by a name, and name resolution is scoped to a tree: a name visible
//! in one branch can be invisible (but still known to exist) in another.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  producers                                              consumers
//!  ─────────                                              ─────────
//!  horizon.emit(kind, payload)                            horizon.on(kind, handler)
//!        │                                                        │
//!        ▼                                                        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Horizon (one bus)                                                │
//! │  - FIFO queue of Message {seq, kind, payload}                     │
//! │  - kind → [handler, handler, ...] (insertion order)               │
//! │  - flags: draining, paused                                        │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!                   drain loop (tokio task, one per horizon)
//!                      ├─ pop oldest message
//!                      ├─ snapshot its handlers
//!                      └─ await each handler in turn
//!                            └─ Err / panic ─► tracing::error!, continue
//! ```
//!
//! ### Scoped addressing
//! ```text
//! Scope::root()
//!   ├─ establish("app")   registry {app}          index {app: 1}
//!   │    └─ establish("panel")  registry {app, panel}   index {app: 1, panel: 1}
//!   └─ establish("side")  registry {side}
//!
//! side.named("panel")  → NotInScope   (exists, not visible)
//! side.named("ghost")  → NotFound     (exists nowhere)
//! root.horizon()       → NoActiveScope
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types                                |
//! |-------------------|--------------------------------------------------------------|------------------------------------------|
//! | **Bus engine**    | Ordered, queued, pausable delivery with handler isolation.   | [`Horizon`], [`WeakHorizon`], [`Subscription`] |
//! | **Handlers**      | Async trait or closures.                                     | [`Handler`], [`HandlerFn`]               |
//! | **Messages**      | Type-erased payloads with global sequence numbers.           | [`Message`], [`Payload`]                 |
//! | **Scopes**        | Tree positions, registries, existence index, resolution.     | [`Scope`], [`Registry`], [`Resolver`]    |
//! | **Errors**        | Typed lookup and handler errors.                             | [`HorizonError`], [`HandlerError`]       |
//! | **Configuration** | Per-horizon logging and queue bound.                         | [`HorizonConfig`], [`ScopeSpec`]         |
//!
//! ## Example
//! ```rust
//! use event_horizon::{HandlerError, Horizon, Message, Payload};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let bus = Horizon::new();
//!
//!     let sub = bus.on_fn("greet", |msg: Message| async move {
//!         let who = msg.payload().downcast_ref::<&'static str>().copied().unwrap_or("nobody");
//!         println!("hello, {who}");
//!         Ok::<_, HandlerError>(())
//!     });
//!
//!     bus.emit("greet", Payload::new("world"));
//!     bus.settled().await;
//!
//!     sub.unsubscribe();
//! }
//! ```
mod engine;
mod error;
mod events;
mod handlers;
mod scope;

// ---- Public re-exports ----

pub use engine::{Horizon, HorizonConfig, Subscription, WeakHorizon};
pub use error::{ErrorCode, HandlerError, HorizonError, ScopeFailure};
pub use events::{Message, Payload};
pub use handlers::{Handler, HandlerFn, HandlerRef};
pub use scope::{ExistenceIndex, NameClaim, Registry, Resolver, Scope, ScopeSpec};
