//! TOML-based run configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::baseline::{BaselineSource, CsvHistory, FixedBaseline, TimedSource};
use crate::error::SimError;
use crate::profile::{HOURS_PER_DAY, HourlyProfile};
use crate::sim::engine::Simulator;
use crate::sim::scenario::ScenarioKind;
use crate::sim::types::{ModelConfig, SimulationParameters, StressThresholds};

/// Per-household hourly consumption of the reference district (litres).
const DISTRICT_LITRES_PER_HOUSEHOLD: [f64; HOURS_PER_DAY] = [
    10.0, 8.0, 6.0, 5.0, 6.0, 15.0, 45.0, 70.0, 65.0, 50.0, 45.0, 45.0, 50.0, 45.0, 40.0, 45.0,
    55.0, 75.0, 90.0, 85.0, 70.0, 50.0, 30.0, 15.0,
];

/// Households served by the reference district.
const DISTRICT_HOUSEHOLDS: f64 = 4000.0;

/// Top-level run configuration parsed from TOML.
///
/// All fields have defaults matching the `default` preset. Load from TOML
/// with [`RunConfig::from_toml_file`] or use [`RunConfig::from_preset`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Scenario and demand-response settings.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Physical constants of the supply zone.
    #[serde(default)]
    pub model: SupplyZoneConfig,
    /// Traffic-light cut-offs.
    #[serde(default)]
    pub thresholds: StressThresholds,
    /// Where the baseline comes from.
    #[serde(default)]
    pub baseline: BaselineConfig,
}

/// Scenario and demand-response settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Scenario id, e.g. `"hot_day"`.
    pub scenario: String,
    /// Fraction of red-hour flow eligible for shifting (0.0-1.0).
    pub participation_rate: f64,
    /// Fraction of the eligible flow that is moved (0.0-1.0).
    pub shift_fraction: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scenario: ScenarioKind::NormalDay.id().to_string(),
            participation_rate: SimulationParameters::DEFAULT_PARTICIPATION_RATE,
            shift_fraction: SimulationParameters::DEFAULT_SHIFT_FRACTION,
        }
    }
}

/// Physical constants of the supply zone.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SupplyZoneConfig {
    /// Flow that corresponds to a stress index of 1.0 (m³/h).
    pub max_safe_flow: f64,
    /// Reservoir volume (m³).
    pub tank_capacity: f64,
    /// Reservoir fill fraction at midnight (0.0-1.0).
    pub initial_tank_ratio: f64,
    /// Constant inflow as a multiple of mean daily demand.
    pub inflow_multiplier: f64,
    /// Hours between a red hour and the hour receiving its shifted load.
    pub shift_offset_hours: usize,
}

impl Default for SupplyZoneConfig {
    fn default() -> Self {
        let m = ModelConfig::default();
        Self {
            max_safe_flow: m.max_safe_flow,
            tank_capacity: m.tank_capacity,
            initial_tank_ratio: m.initial_tank_ratio,
            inflow_multiplier: m.inflow_multiplier,
            shift_offset_hours: m.shift_offset_hours,
        }
    }
}

/// Baseline source selection.
///
/// With neither `history_csv` nor `profile` set, the built-in fallback
/// profile is used.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BaselineConfig {
    /// CSV file of historical delivery readings.
    pub history_csv: Option<PathBuf>,
    /// Explicit 24-value baseline (m³/h).
    pub profile: Option<Vec<f64>>,
    /// Upper bound on loading the history (milliseconds).
    pub fetch_timeout_ms: u64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            history_csv: None,
            profile: None,
            fetch_timeout_ms: 2000,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"model.tank_capacity"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl RunConfig {
    /// Returns the default preset: documented constants on the fallback profile.
    pub fn default_preset() -> Self {
        Self::default()
    }

    /// Returns the district preset: a 4000-household residential district
    /// with a smaller safe flow rate.
    pub fn district() -> Self {
        let profile = DISTRICT_LITRES_PER_HOUSEHOLD
            .iter()
            .map(|litres| litres * DISTRICT_HOUSEHOLDS / 1000.0)
            .collect();
        Self {
            model: SupplyZoneConfig {
                max_safe_flow: 280.0,
                ..SupplyZoneConfig::default()
            },
            baseline: BaselineConfig {
                profile: Some(profile),
                ..BaselineConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "district"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default_preset()),
            "district" => Ok(Self::district()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// A relative `baseline.history_csv` is resolved against the file's
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        let mut cfg = Self::from_toml_str(&content)?;
        if let (Some(csv), Some(dir)) = (cfg.baseline.history_csv.as_mut(), path.parent()) {
            if csv.is_relative() {
                *csv = dir.join(&*csv);
            }
        }
        log::info!("loaded configuration from {}", path.display());
        Ok(cfg)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: String| {
            errors.push(ConfigError {
                field: field.to_string(),
                message,
            });
        };

        let s = &self.simulation;
        if let Err(e) = s.scenario.parse::<ScenarioKind>() {
            push("simulation.scenario", e.to_string());
        }
        if let Err(e) = SimulationParameters::new(
            ScenarioKind::default(),
            s.participation_rate,
            s.shift_fraction,
        ) {
            let field = match &e {
                SimError::InvalidParameter {
                    name: "shift_fraction",
                    ..
                } => "simulation.shift_fraction",
                _ => "simulation.participation_rate",
            };
            push(field, e.to_string());
        }

        let m = &self.model;
        if !(m.max_safe_flow.is_finite() && m.max_safe_flow > 0.0) {
            push("model.max_safe_flow", "must be > 0".into());
        }
        if !(m.tank_capacity.is_finite() && m.tank_capacity > 0.0) {
            push("model.tank_capacity", "must be > 0".into());
        }
        if !(0.0..=1.0).contains(&m.initial_tank_ratio) {
            push("model.initial_tank_ratio", "must be in [0.0, 1.0]".into());
        }
        if !(m.inflow_multiplier.is_finite() && m.inflow_multiplier >= 0.0) {
            push("model.inflow_multiplier", "must be >= 0".into());
        }
        if m.shift_offset_hours == 0 || m.shift_offset_hours >= HOURS_PER_DAY {
            push("model.shift_offset_hours", "must be in 1..=23".into());
        }

        let t = &self.thresholds;
        for (field, value) in [
            ("thresholds.red_stress", t.red_stress),
            ("thresholds.yellow_stress", t.yellow_stress),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                push(field, "must be >= 0".into());
            }
        }
        for (field, value) in [
            ("thresholds.red_tank_ratio", t.red_tank_ratio),
            ("thresholds.yellow_tank_ratio", t.yellow_tank_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                push(field, "must be in [0.0, 1.0]".into());
            }
        }
        if t.yellow_stress > t.red_stress {
            push(
                "thresholds.yellow_stress",
                "must be <= thresholds.red_stress".into(),
            );
        }
        if t.red_tank_ratio > t.yellow_tank_ratio {
            push(
                "thresholds.red_tank_ratio",
                "must be <= thresholds.yellow_tank_ratio".into(),
            );
        }

        let b = &self.baseline;
        if b.history_csv.is_some() && b.profile.is_some() {
            push(
                "baseline.profile",
                "cannot be combined with baseline.history_csv".into(),
            );
        }
        if let Some(Err(e)) = b.profile.as_deref().map(HourlyProfile::from_slice) {
            push("baseline.profile", e.to_string());
        }
        if b.fetch_timeout_ms == 0 {
            push("baseline.fetch_timeout_ms", "must be > 0".into());
        }

        errors
    }

    /// Model constants assembled from the `[model]` and `[thresholds]` sections.
    pub fn model_config(&self) -> ModelConfig {
        let m = &self.model;
        ModelConfig {
            max_safe_flow: m.max_safe_flow,
            tank_capacity: m.tank_capacity,
            initial_tank_ratio: m.initial_tank_ratio,
            inflow_multiplier: m.inflow_multiplier,
            shift_offset_hours: m.shift_offset_hours,
            thresholds: self.thresholds,
        }
    }

    /// Validated run parameters from the `[simulation]` section.
    ///
    /// # Errors
    ///
    /// Returns `SimError` for an unknown scenario or out-of-range rates.
    pub fn parameters(&self) -> Result<SimulationParameters, SimError> {
        let s = &self.simulation;
        let scenario = s.scenario.parse()?;
        SimulationParameters::new(scenario, s.participation_rate, s.shift_fraction)
    }

    /// Builds the configured baseline source, if any.
    ///
    /// # Errors
    ///
    /// Returns `SimError::MalformedProfile` for an invalid `baseline.profile`.
    pub fn baseline_source(&self) -> Result<Option<Arc<dyn BaselineSource>>, SimError> {
        let b = &self.baseline;
        if let Some(path) = &b.history_csv {
            let history: Arc<dyn BaselineSource> = Arc::new(CsvHistory::new(path.clone()));
            let timeout = Duration::from_millis(b.fetch_timeout_ms);
            return Ok(Some(Arc::new(TimedSource::new(history, timeout))));
        }
        if let Some(values) = &b.profile {
            let profile = HourlyProfile::from_slice(values)?;
            return Ok(Some(Arc::new(FixedBaseline::new(profile))));
        }
        Ok(None)
    }

    /// Builds a simulator wired to the configured model and baseline source.
    ///
    /// # Errors
    ///
    /// Returns `SimError` if the baseline section is malformed.
    pub fn simulator(&self) -> Result<Simulator, SimError> {
        let model = self.model_config();
        Ok(match self.baseline_source()? {
            Some(source) => Simulator::with_source(model, source),
            None => Simulator::new(model),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::BaselineOrigin;

    #[test]
    fn default_preset_valid() {
        let cfg = RunConfig::default_preset();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = RunConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in RunConfig::PRESETS {
            let cfg = RunConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn district_profile_is_scaled_to_cubic_metres() {
        let cfg = RunConfig::district();
        let profile = cfg.baseline.profile.as_deref().unwrap_or_default();
        assert_eq!(profile.len(), 24);
        assert_eq!(profile[0], 40.0);
        assert_eq!(profile[18], 360.0);
        assert_eq!(cfg.model.max_safe_flow, 280.0);
    }

    #[test]
    fn district_has_red_evening_peak() {
        let cfg = RunConfig::district();
        let sim = cfg.simulator().unwrap();
        let r = sim.simulate_with(&cfg.parameters().unwrap()).unwrap();
        assert_eq!(r.baseline_source, BaselineOrigin::Custom);
        assert!(r.stats.red_hours > 0);
        assert!(r.stats.red_hours_flex <= r.stats.red_hours);
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
scenario = "football_day"
participation_rate = 0.5
shift_fraction = 0.4

[model]
max_safe_flow = 600.0
tank_capacity = 2500.0
initial_tank_ratio = 0.6
inflow_multiplier = 1.1
shift_offset_hours = 2

[thresholds]
red_stress = 0.9
yellow_stress = 0.7
red_tank_ratio = 0.2
yellow_tank_ratio = 0.35

[baseline]
fetch_timeout_ms = 500
"#;
        let cfg = RunConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.unwrap();
        assert!(cfg.validate().is_empty());
        let params = cfg.parameters().unwrap();
        assert_eq!(params.scenario, ScenarioKind::FootballDay);
        let model = cfg.model_config();
        assert_eq!(model.max_safe_flow, 600.0);
        assert_eq!(model.shift_offset_hours, 2);
        assert_eq!(model.thresholds.red_stress, 0.9);
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
scenario = "hot_day"
bogus_field = true
"#;
        assert!(RunConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
scenario = "hot_day"
"#;
        let cfg = RunConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.simulation.scenario, "hot_day");
        assert_eq!(cfg.simulation.participation_rate, 0.25);
        assert_eq!(cfg.model.tank_capacity, 3000.0);
        assert_eq!(cfg.thresholds, StressThresholds::default());
        assert_eq!(cfg.baseline.fetch_timeout_ms, 2000);
    }

    #[test]
    fn validation_catches_unknown_scenario() {
        let mut cfg = RunConfig::default_preset();
        cfg.simulation.scenario = "blizzard".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.scenario"));
        assert!(cfg.parameters().is_err());
    }

    #[test]
    fn validation_catches_bad_rates() {
        let mut cfg = RunConfig::default_preset();
        cfg.simulation.shift_fraction = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.shift_fraction"));

        let mut cfg = RunConfig::default_preset();
        cfg.simulation.participation_rate = -0.1;
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "simulation.participation_rate")
        );
    }

    #[test]
    fn validation_catches_bad_model() {
        let mut cfg = RunConfig::default_preset();
        cfg.model.tank_capacity = 0.0;
        cfg.model.shift_offset_hours = 24;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "model.tank_capacity"));
        assert!(errors.iter().any(|e| e.field == "model.shift_offset_hours"));
    }

    #[test]
    fn validation_catches_bad_thresholds() {
        let cfg = RunConfig::from_toml_str(
            r#"
[thresholds]
red_stress = nan
red_tank_ratio = -0.1
yellow_tank_ratio = 1.5
"#,
        )
        .unwrap();
        let errors = cfg.validate();
        for field in [
            "thresholds.red_stress",
            "thresholds.red_tank_ratio",
            "thresholds.yellow_tank_ratio",
        ] {
            assert!(errors.iter().any(|e| e.field == field), "missing {field}");
        }
        assert!(!errors.iter().any(|e| e.field == "thresholds.yellow_stress"));

        let mut cfg = RunConfig::default_preset();
        cfg.thresholds.yellow_stress = f64::INFINITY;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "thresholds.yellow_stress"));
    }

    #[test]
    fn validation_catches_bad_profile() {
        let mut cfg = RunConfig::default_preset();
        cfg.baseline.profile = Some(vec![1.0; 23]);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "baseline.profile"));
        assert!(cfg.simulator().is_err());
    }

    #[test]
    fn validation_rejects_two_baseline_sources() {
        let mut cfg = RunConfig::district();
        cfg.baseline.history_csv = Some(PathBuf::from("history.csv"));
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "baseline.profile"));
    }

    #[test]
    fn history_source_falls_back_when_file_missing() {
        let mut cfg = RunConfig::default_preset();
        cfg.baseline.history_csv = Some(PathBuf::from("/nonexistent/peakflow.csv"));
        let sim = cfg.simulator().unwrap();
        let r = sim.simulate_with(&cfg.parameters().unwrap()).unwrap();
        assert_eq!(r.baseline_source, BaselineOrigin::Fallback);
    }
}
