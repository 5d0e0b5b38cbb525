//! Configuration for the progress adapter.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ProgressConfig {
 pub(crate) heartbeat_timeout: Duration,
}

pub struct ProgressConfigBuilder {
 heartbeat_timeout: Duration,
}

impl ProgressConfigBuilder {
 pub fn new() -> Self {
 Self {
 heartbeat_timeout: Duration::from_secs(15),
 }
 }

 /// How long without any dispatched message before running steps are
 /// marked `stalled`. Default: 15s.
 pub fn heartbeat_timeout(mut self, timeout: Duration) -> Self {
 self.heartbeat_timeout = timeout;
 self
 }

 pub fn build(self) -> ProgressConfig {
 ProgressConfig {
 heartbeat_timeout: self.heartbeat_timeout,
 }
 }
}

impl Default for ProgressConfigBuilder {
 fn default() -> Self {
 Self::new()
 }
}

impl ProgressConfig {
 pub fn builder() -> ProgressConfigBuilder {
 ProgressConfigBuilder::new()
 }
}

impl Default for ProgressConfig {
 fn default() -> Self {
 ProgressConfigBuilder::new().build()
 }
}
