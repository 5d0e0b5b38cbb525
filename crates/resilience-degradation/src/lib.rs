//! Multi-level graceful degradation.
//! A discrete five-level lattice reacting to observed error rate, with a
//! frozen per-level strategy table, rather than a continuously tuned AIMD
//! concurrency limit reacting to observed latency.

mod active;
mod config;
mod controller;
mod events;
mod level;
mod modifications;
mod strategy;

pub use active::{ActiveDegradation, Scope};
pub use config::{DegradationConfig, DegradationConfigBuilder};
pub use controller::DegradationController;
pub use events::DegradationEvent;
pub use level::DegradationLevel;
pub use modifications::RequestModifications;
pub use strategy::{strategy_for, Strategy};
