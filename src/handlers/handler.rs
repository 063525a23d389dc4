//! # Handler abstraction.
//!
//! Provides [`Handler`], the extension point for reacting to messages delivered by a
//! [`Horizon`](crate::Horizon). The common handle type is [`HandlerRef`], an
//! `Arc<dyn Handler>` that can be registered on several horizons at once.
//!
//! ## Rules
//! - Handlers for one message run **sequentially**, in registration order.
//! - The drain loop awaits each handler before invoking the next one.
//! - An `Err` or a panic is caught per handler and reported; siblings still run.
//! - A handler that never completes stalls its horizon (no built-in timeout).
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use event_horizon::{Handler, HandlerError, Message};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Handler for Audit {
//!     async fn handle(&self, msg: &Message) -> Result<(), HandlerError> {
//!         if msg.payload().is_empty() {
//!             return Err(HandlerError::failed("empty payload"));
//!         }
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str { "audit" }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::Message;

/// Shared handler handle.
pub type HandlerRef = Arc<dyn Handler>;

/// Message handler.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Return `Err` for expected failures; panics are caught but noisier.
/// - Long-running work stalls the horizon; spawn it if ordering is not needed.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Processes a single message.
    ///
    /// Called from the horizon's drain loop, not in the emitter's context.
    async fn handle(&self, msg: &Message) -> Result<(), HandlerError>;

    /// Returns the handler name used in diagnostics.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
