//! Timing and ordering settings for a sync session.

use std::time::Duration;
use thiserror::Error;

/// Order in which pending events reach the synchronizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueueOrder {
    /// Newest event first. Reacts to the latest change quickly, but an old
    /// event can starve while newer ones keep arriving.
    #[default]
    Lifo,
    /// Oldest event first.
    Fifo,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Settings shared by the poll loop, the synchronizer and the watcher.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Delay between two browser poll cycles
    pub poll_period: Duration,
    /// Minimum time after an applied action before the same index accepts
    /// another event; also the settle delay between push and re-read
    pub debounce_window: Duration,
    /// Delivery order of the event queue
    pub queue_order: QueueOrder,
    /// Window over which raw filesystem notifications are coalesced
    pub watch_coalesce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_period: Duration::from_secs(1),
            debounce_window: Duration::from_secs(1),
            queue_order: QueueOrder::Lifo,
            watch_coalesce: Duration::from_millis(50),
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_period.is_zero() {
            return Err(ConfigError::ZeroDuration("poll period"));
        }
        if self.debounce_window.is_zero() {
            return Err(ConfigError::ZeroDuration("debounce window"));
        }
        if self.watch_coalesce.is_zero() {
            return Err(ConfigError::ZeroDuration("watch coalesce window"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.poll_period, Duration::from_secs(1));
        assert_eq!(config.debounce_window, Duration::from_secs(1));
        assert_eq!(config.queue_order, QueueOrder::Lifo);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_debounce() {
        let config = SyncConfig {
            debounce_window: Duration::ZERO,
            ..SyncConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroDuration("debounce window"))
        ));
    }
}
