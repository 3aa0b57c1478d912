//! Shared test fixtures for integration tests.

use std::sync::Arc;

use rand::Rng;
use rand::rngs::StdRng;

use peakflow_sim::baseline::FixedBaseline;
use peakflow_sim::profile::{HOURS_PER_DAY, HourlyProfile};
use peakflow_sim::sim::engine::Simulator;
use peakflow_sim::sim::types::ModelConfig;

/// Flat profile with the same demand every hour.
pub fn flat_profile(value: f64) -> HourlyProfile {
    HourlyProfile::new([value; HOURS_PER_DAY]).expect("flat profile should be valid")
}

/// Profile of 100 m³/h with a single peak hour.
pub fn profile_with_peak(hour: usize, peak: f64) -> HourlyProfile {
    let mut values = [100.0; HOURS_PER_DAY];
    values[hour] = peak;
    HourlyProfile::new(values).expect("peak profile should be valid")
}

/// Random profile with hourly demand drawn uniformly from `[0, max)`.
pub fn random_profile(rng: &mut StdRng, max: f64) -> HourlyProfile {
    let values = std::array::from_fn(|_| rng.random_range(0.0..max));
    HourlyProfile::new(values).expect("random profile should be valid")
}

/// Default model constants.
pub fn default_model() -> ModelConfig {
    ModelConfig::default()
}

/// Simulator that always uses `profile` as its baseline.
pub fn fixed_simulator(profile: HourlyProfile) -> Simulator {
    Simulator::with_source(default_model(), Arc::new(FixedBaseline::new(profile)))
}

/// Absolute path of the bundled meter history sample.
pub fn sample_history_path() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/sample_history.csv")
}
