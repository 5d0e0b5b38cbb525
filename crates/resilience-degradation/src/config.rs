use std::time::Duration;

/// Error-rate thresholds driving automatic triggering. Percentages are expressed as `0.0..=100.0`.
#[derive(Debug, Clone)]
pub struct DegradationConfig {
 pub(crate) light_threshold: f64,
 pub(crate) moderate_threshold: f64,
 pub(crate) heavy_threshold: f64,
 pub(crate) critical_threshold: f64,
 pub(crate) max_degradation_duration: Duration,
}

impl DegradationConfig {
 pub fn builder() -> DegradationConfigBuilder {
 DegradationConfigBuilder::new()
 }
}

impl Default for DegradationConfig {
 fn default() -> Self {
 DegradationConfigBuilder::new().build()
 }
}

pub struct DegradationConfigBuilder {
 light_threshold: f64,
 moderate_threshold: f64,
 heavy_threshold: f64,
 critical_threshold: f64,
 max_degradation_duration: Duration,
}

impl DegradationConfigBuilder {
 pub fn new() -> Self {
 Self {
 light_threshold: 5.0,
 moderate_threshold: 15.0,
 heavy_threshold: 30.0,
 critical_threshold: 50.0,
 max_degradation_duration: Duration::from_secs(30 * 60),
 }
 }

 pub fn light_threshold(mut self, pct: f64) -> Self {
 self.light_threshold = pct;
 self
 }

 pub fn moderate_threshold(mut self, pct: f64) -> Self {
 self.moderate_threshold = pct;
 self
 }

 pub fn heavy_threshold(mut self, pct: f64) -> Self {
 self.heavy_threshold = pct;
 self
 }

 pub fn critical_threshold(mut self, pct: f64) -> Self {
 self.critical_threshold = pct;
 self
 }

 pub fn max_degradation_duration(mut self, d: Duration) -> Self {
 self.max_degradation_duration = d;
 self
 }

 pub fn build(self) -> DegradationConfig {
 DegradationConfig {
 light_threshold: self.light_threshold,
 moderate_threshold: self.moderate_threshold,
 heavy_threshold: self.heavy_threshold,
 critical_threshold: self.critical_threshold,
 max_degradation_duration: self.max_degradation_duration,
 }
 }
}

impl Default for DegradationConfigBuilder {
 fn default() -> Self {
 Self::new()
 }
}
