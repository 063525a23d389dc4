//! Messages: the unit of delivery on a horizon.
//!
//! ## Contents
//! - [`Message`] immutable `{kind, payload}` with a global sequence number
//! - [`Payload`] type-erased, cheaply cloneable payload

mod message;

pub use message::{Message, Payload};
