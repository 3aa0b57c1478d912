/// Single-day orchestration of baseline, scenario, stress, and shifting.
pub mod engine;
pub mod kpi;
/// Demand scenario catalog and multipliers.
pub mod scenario;
pub mod shift;
pub mod stress;
pub mod types;
