//! Bus engine.
//!
//! The only public types from this module are [`Horizon`], [`WeakHorizon`],
//! [`Subscription`] and [`HorizonConfig`].
//!
//! Internal modules:
//! - [`horizon`]: queue, handler map and the drain loop;
//! - [`dispatch`]: per-handler catch boundary and diagnostic reporting;
//! - [`subscription`]: registration handle returned by `on`;
//! - [`config`]: per-horizon settings.

mod config;
mod dispatch;
mod horizon;
mod subscription;

pub use config::HorizonConfig;
pub use horizon::{Horizon, WeakHorizon};
pub use subscription::Subscription;
