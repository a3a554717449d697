//! Configuration for the sync engine.

use std::time::Duration;

/// Configuration for drain behavior.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on each individual delivery attempt.
    ///
    /// A timed-out request is treated like any other transport failure.
    pub request_timeout: Duration,
    /// Whether an offline → online transition triggers a drain automatically.
    pub auto_drain_on_reconnect: bool,
}

impl EngineConfig {
    /// Creates a configuration with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            auto_drain_on_reconnect: true,
        }
    }

    /// Sets the per-request delivery timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Enables or disables automatic draining on reconnect.
    #[must_use]
    pub fn with_auto_drain_on_reconnect(mut self, enabled: bool) -> Self {
        self.auto_drain_on_reconnect = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = EngineConfig::new()
            .with_request_timeout(Duration::from_secs(5))
            .with_auto_drain_on_reconnect(false);

        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(!config.auto_drain_on_reconnect);
    }

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.auto_drain_on_reconnect);
    }
}
