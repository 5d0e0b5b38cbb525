//! Configuration for the idempotency ledger.

use crate::events::IdempotencyEvent;
use resilience_core::{EventListeners, FnListener};
use std::time::Duration;

pub struct IdempotencyConfig {
 pub(crate) ttl: Duration,
 pub(crate) event_listeners: EventListeners<IdempotencyEvent>,
}

pub struct IdempotencyConfigBuilder {
 ttl: Duration,
 event_listeners: EventListeners<IdempotencyEvent>,
}

impl IdempotencyConfigBuilder {
 pub fn new() -> Self {
 Self {
 ttl: Duration::from_secs(3600),
 event_listeners: EventListeners::new(),
 }
 }

 /// Records older than this are treated as absent. Default: 1 hour.
 pub fn ttl(mut self, ttl: Duration) -> Self {
 self.ttl = ttl;
 self
 }

 pub fn on_event<F>(mut self, f: F) -> Self
 where
 F: Fn(&IdempotencyEvent) + Send + Sync + 'static,
 {
 self.event_listeners.add(FnListener::new(f));
 self
 }

 pub fn build(self) -> IdempotencyConfig {
 IdempotencyConfig {
 ttl: self.ttl,
 event_listeners: self.event_listeners,
 }
 }
}

impl Default for IdempotencyConfigBuilder {
 fn default() -> Self {
 Self::new()
 }
}

impl IdempotencyConfig {
 pub fn builder() -> IdempotencyConfigBuilder {
 IdempotencyConfigBuilder::new()
 }
}

impl Default for IdempotencyConfig {
 fn default() -> Self {
 IdempotencyConfigBuilder::new().build()
 }
}
