//! Message handlers.
//!
//! - [`Handler`] async trait invoked by the drain loop
//! - [`HandlerFn`] closure-backed implementation
//! - [`HandlerRef`] shared `Arc<dyn Handler>` handle

mod handler;
mod handler_fn;

pub use handler::{Handler, HandlerRef};
pub use handler_fn::HandlerFn;
