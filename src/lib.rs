//! Hourly water demand stress simulator with demand-response load shifting.

/// Baseline demand sources and the built-in fallback profile.
pub mod baseline;
pub mod config;
pub mod error;
pub mod io;
pub mod profile;
/// Scenario, stress, shifting, and orchestration modules.
pub mod sim;
