use crate::level::DegradationLevel;
use std::time::Instant;

/// Which providers an [`ActiveDegradation`] applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
 /// Applies to every provider.
 Global,
 /// Applies only to the named provider.
 Provider(String),
}

impl Scope {
 pub fn matches(&self, provider: &str) -> bool {
 match self {
 Scope::Global => true,
 Scope::Provider(p) => p == provider,
 }
 }
}

/// A single triggered degradation record.
#[derive(Debug, Clone)]
pub struct ActiveDegradation {
 pub id: u64,
 pub level: DegradationLevel,
 pub reason: String,
 pub scope: Scope,
 pub started_at: Instant,
 pub expires_at: Option<Instant>,
 pub auto_recover: bool,
}

impl ActiveDegradation {
 pub(crate) fn is_expired(&self) -> bool {
 self.expires_at
.map(|expiry| Instant::now() >= expiry)
.unwrap_or(false)
 }
}
