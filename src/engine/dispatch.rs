//! # Per-handler catch boundary.
//!
//! Every handler invocation is wrapped individually, so one failure never skips
//! uninvolved handlers:
//! ```text
//! drain loop ──► dispatch(h1, msg) ──► Ok / Err / panic ──► report()
//!            ──► dispatch(h2, msg) ──► ...
//! ```
//! Reported failures go to the fixed diagnostic sink: `tracing::error!` with
//! target `event_horizon`.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::error::HandlerError;
use crate::events::Message;
use crate::handlers::{Handler, HandlerRef};

/// Runs one handler for one message, converting panics into [`HandlerError::Panicked`].
pub(crate) async fn dispatch(handler: &HandlerRef, msg: &Message) -> Result<(), HandlerError> {
    let fut = handler.handle(msg);
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(panic_err) => Err(HandlerError::Panicked {
            info: panic_info(&*panic_err),
        }),
    }
}

/// Reports a handler failure to the diagnostic sink.
pub(crate) fn report(handler: &HandlerRef, msg: &Message, err: &HandlerError) {
    tracing::error!(
        target: "event_horizon",
        handler = handler.name(),
        kind = msg.kind(),
        seq = msg.seq,
        label = err.as_label(),
        "handler error: {}",
        err.as_message()
    );
}

fn panic_info(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
