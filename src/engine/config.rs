//! # Per-horizon configuration.
//!
//! Provides [`HorizonConfig`], the settings a [`Horizon`](crate::Horizon) is built with.
//!
//! Config is used in two ways:
//! 1. **Explicit creation**: `Horizon::with_config(config)`
//! 2. **Scope establishment**: `ScopeSpec::with_config(config)` when the scope creates its own horizon
//!
//! ## Sentinel values
//! - `queue_capacity = 0` → unbounded queue

/// Configuration for one horizon.
///
/// ## Field semantics
/// - `log`: emit `debug` traces for subscribe/unsubscribe/emit/delivery
/// - `queue_capacity`: pending-message bound (`0` = unbounded)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HorizonConfig {
    /// Trace every `on`, `off` and `emit` at `debug` level (target `event_horizon`).
    pub log: bool,

    /// Maximum number of pending (not yet pulled) messages.
    ///
    /// - `0` = unbounded
    /// - `n > 0` = once `n` messages are pending, newly emitted messages are
    ///   dropped and a warning is traced
    ///
    /// The message currently being delivered does not count as pending.
    pub queue_capacity: usize,
}

impl HorizonConfig {
    /// Shorthand for a config with only the log flag set.
    pub fn logged(log: bool) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Returns the queue bound as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → at most `n` pending messages
    #[inline]
    pub fn capacity_limit(&self) -> Option<usize> {
        if self.queue_capacity == 0 {
            None
        } else {
            Some(self.queue_capacity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded_and_quiet() {
        let cfg = HorizonConfig::default();
        assert!(!cfg.log);
        assert_eq!(cfg.capacity_limit(), None);
    }

    #[test]
    fn test_capacity_limit() {
        let cfg = HorizonConfig {
            queue_capacity: 8,
            ..HorizonConfig::logged(true)
        };
        assert!(cfg.log);
        assert_eq!(cfg.capacity_limit(), Some(8));
    }
}
