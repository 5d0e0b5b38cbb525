//! Configuration for the dead-letter queue.

use crate::events::DlqEvent;
use resilience_core::{EventListeners, FnListener};
use std::time::Duration;

/// Configuration for a [`crate::DeadLetterQueue`].
pub struct DlqConfig {
 pub(crate) capacity: usize,
 pub(crate) auto_retry_enabled: bool,
 pub(crate) auto_retry_delay: Duration,
 pub(crate) auto_retry_max_count: u32,
 pub(crate) cleanup_interval: Duration,
 pub(crate) keep_resolved: Duration,
 pub(crate) default_ttl: Option<Duration>,
 pub(crate) event_listeners: EventListeners<DlqEvent>,
}

/// Builder for [`DlqConfig`].
pub struct DlqConfigBuilder {
 capacity: usize,
 auto_retry_enabled: bool,
 auto_retry_delay: Duration,
 auto_retry_max_count: u32,
 cleanup_interval: Duration,
 keep_resolved: Duration,
 default_ttl: Option<Duration>,
 event_listeners: EventListeners<DlqEvent>,
}

impl DlqConfigBuilder {
 pub fn new() -> Self {
 Self {
 capacity: 1000,
 auto_retry_enabled: true,
 auto_retry_delay: Duration::from_secs(60),
 auto_retry_max_count: 5,
 cleanup_interval: Duration::from_secs(300),
 keep_resolved: Duration::from_secs(3600),
 default_ttl: Some(Duration::from_secs(24 * 3600)),
 event_listeners: EventListeners::new(),
 }
 }

 /// Maximum number of items the queue holds before evicting the oldest
 /// non-`processing` item. Default: 1000.
 pub fn capacity(mut self, capacity: usize) -> Self {
 self.capacity = capacity;
 self
 }

 /// Whether newly admitted items start `scheduled` for auto-retry. Default: true.
 pub fn auto_retry_enabled(mut self, enabled: bool) -> Self {
 self.auto_retry_enabled = enabled;
 self
 }

 /// Base delay before the first auto-retry attempt. Default: 60s.
 pub fn auto_retry_delay(mut self, delay: Duration) -> Self {
 self.auto_retry_delay = delay;
 self
 }

 /// Maximum number of auto-retries before an item settles into `pending`. Default: 5.
 pub fn auto_retry_max_count(mut self, max_count: u32) -> Self {
 self.auto_retry_max_count = max_count;
 self
 }

 /// Interval of the background cleanup sweep. Default: 300s.
 pub fn cleanup_interval(mut self, interval: Duration) -> Self {
 self.cleanup_interval = interval;
 self
 }

 /// How long a resolved/discarded/expired item is retained before removal. Default: 3600s.
 pub fn keep_resolved(mut self, keep: Duration) -> Self {
 self.keep_resolved = keep;
 self
 }

 /// Default `expires_at` offset applied to items that don't set one explicitly.
 /// Default: 24h. Pass `None` to disable expiry by default.
 pub fn default_ttl(mut self, ttl: Option<Duration>) -> Self {
 self.default_ttl = ttl;
 self
 }

 /// Registers a callback invoked on every [`DlqEvent`].
 pub fn on_event<F>(mut self, f: F) -> Self
 where
 F: Fn(&DlqEvent) + Send + Sync + 'static,
 {
 self.event_listeners.add(FnListener::new(f));
 self
 }

 pub fn build(self) -> DlqConfig {
 DlqConfig {
 capacity: self.capacity,
 auto_retry_enabled: self.auto_retry_enabled,
 auto_retry_delay: self.auto_retry_delay,
 auto_retry_max_count: self.auto_retry_max_count,
 cleanup_interval: self.cleanup_interval,
 keep_resolved: self.keep_resolved,
 default_ttl: self.default_ttl,
 event_listeners: self.event_listeners,
 }
 }
}

impl Default for DlqConfigBuilder {
 fn default() -> Self {
 Self::new()
 }
}

impl DlqConfig {
 pub fn builder() -> DlqConfigBuilder {
 DlqConfigBuilder::new()
 }
}

impl Default for DlqConfig {
 fn default() -> Self {
 DlqConfigBuilder::new().build()
 }
}

#[cfg(test)]
mod tests {
 use super::*;

 #[test]
 fn defaults_are_sane() {
 let config = DlqConfig::default();
 assert_eq!(config.capacity, 1000);
 assert!(config.auto_retry_enabled);
 assert_eq!(config.auto_retry_delay, Duration::from_secs(60));
 assert_eq!(config.auto_retry_max_count, 5);
 assert_eq!(config.cleanup_interval, Duration::from_secs(300));
 assert_eq!(config.keep_resolved, Duration::from_secs(3600));
 }

 #[test]
 fn builder_overrides_take_effect() {
 let config = DlqConfig::builder()
.capacity(10)
.auto_retry_enabled(false)
.auto_retry_max_count(2)
.build();
 assert_eq!(config.capacity, 10);
 assert!(!config.auto_retry_enabled);
 assert_eq!(config.auto_retry_max_count, 2);
 }
}
