//! Reactive adapter configuration.

use std::time::Duration;

use crate::CachePolicy;

/// Reactive adapter configuration.
#[derive(Debug, Clone)]
pub struct ReactiveConfig {
    /// Cache policy used by [`ReactiveClient::query`](crate::ReactiveClient::query).
    pub default_cache_policy: CachePolicy,
    /// Store flag used by [`ReactiveClient::mutate`](crate::ReactiveClient::mutate).
    pub publish_result_to_store: bool,
    /// Fail single-value results that are not settled within this time.
    pub timeout: Option<Duration>,
    /// Cancel the client operation when its result is dropped unsettled.
    pub cancel_on_drop: bool,
}

impl Default for ReactiveConfig {
    fn default() -> Self {
        Self {
            default_cache_policy: CachePolicy::default(),
            publish_result_to_store: true,
            timeout: None,
            cancel_on_drop: true,
        }
    }
}

impl ReactiveConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ReactiveConfigBuilder {
        ReactiveConfigBuilder::default()
    }
}

/// Builder for reactive adapter configuration.
#[derive(Debug, Default)]
pub struct ReactiveConfigBuilder {
    config: ReactiveConfig,
}

impl ReactiveConfigBuilder {
    /// Set the cache policy for queries issued without one.
    pub fn default_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.config.default_cache_policy = policy;
        self
    }

    /// Set whether mutations issued without a flag publish to the store.
    pub fn publish_result_to_store(mut self, publish: bool) -> Self {
        self.config.publish_result_to_store = publish;
        self
    }

    /// Set the settlement timeout.
    ///
    /// A result that is still pending when first polled then needs a tokio
    /// runtime with the time driver enabled.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Enable or disable cancellation on drop.
    pub fn cancel_on_drop(mut self, enabled: bool) -> Self {
        self.config.cancel_on_drop = enabled;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ReactiveConfig {
        self.config
    }
}
