//! Core simulation types: model constants, run parameters, and per-hour results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::profile::HOURS_PER_DAY;

use super::kpi::SummaryStats;
use super::scenario::ScenarioKind;

/// Traffic-light cut-offs for the stress classification.
///
/// Stress values are fractions of `max_safe_flow`; tank values are fractions
/// of `tank_capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StressThresholds {
    /// Stress index at or above which an hour is red.
    pub red_stress: f64,
    /// Stress index at or above which an hour is at least yellow.
    pub yellow_stress: f64,
    /// Tank ratio below which an hour is red.
    pub red_tank_ratio: f64,
    /// Tank ratio below which an hour is at least yellow.
    pub yellow_tank_ratio: f64,
}

impl Default for StressThresholds {
    fn default() -> Self {
        Self {
            red_stress: 0.85,
            yellow_stress: 0.60,
            red_tank_ratio: 0.25,
            yellow_tank_ratio: 0.40,
        }
    }
}

/// Physical constants of the supply zone.
///
/// Passed explicitly to the evaluator and shifter so alternative constants
/// can be simulated side by side.
///
/// # Examples
///
/// ```
/// use peakflow_sim::sim::types::ModelConfig;
///
/// let cfg = ModelConfig::default();
/// assert_eq!(cfg.initial_tank_level(), 2100.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelConfig {
    /// Flow rate that corresponds to a stress index of 1.0 (m³/h).
    pub max_safe_flow: f64,
    /// Reservoir volume (m³).
    pub tank_capacity: f64,
    /// Fill fraction of the reservoir at hour 0.
    pub initial_tank_ratio: f64,
    /// Constant inflow as a multiple of the day's mean demand.
    pub inflow_multiplier: f64,
    /// How many hours later shifted demand lands.
    pub shift_offset_hours: usize,
    /// Classification cut-offs.
    pub thresholds: StressThresholds,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_safe_flow: 800.0,
            tank_capacity: 3000.0,
            initial_tank_ratio: 0.7,
            inflow_multiplier: 1.2,
            shift_offset_hours: 3,
            thresholds: StressThresholds::default(),
        }
    }
}

impl ModelConfig {
    /// Tank volume at hour 0 (m³).
    pub fn initial_tank_level(&self) -> f64 {
        self.tank_capacity * self.initial_tank_ratio
    }

    /// Hour receiving demand shifted out of `hour`.
    pub fn shift_target(&self, hour: usize) -> usize {
        (hour + self.shift_offset_hours) % HOURS_PER_DAY
    }
}

/// Validated inputs for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationParameters {
    pub scenario: ScenarioKind,
    /// Fraction of a red hour's flow eligible for shifting.
    pub participation_rate: f64,
    /// Fraction of the eligible flow actually moved.
    pub shift_fraction: f64,
}

impl SimulationParameters {
    /// Default participation rate used when none is given.
    pub const DEFAULT_PARTICIPATION_RATE: f64 = 0.25;
    /// Default shift fraction used when none is given.
    pub const DEFAULT_SHIFT_FRACTION: f64 = 0.3;

    /// Validates and bundles the run parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] when either rate lies outside
    /// `[0, 1]` or is not finite, or when their product exceeds 1.
    pub fn new(
        scenario: ScenarioKind,
        participation_rate: f64,
        shift_fraction: f64,
    ) -> Result<Self, SimError> {
        check_unit_interval("participation_rate", participation_rate)?;
        check_unit_interval("shift_fraction", shift_fraction)?;
        let product = participation_rate * shift_fraction;
        if product > 1.0 {
            return Err(SimError::InvalidParameter {
                name: "participation_rate * shift_fraction",
                value: product,
                reason: "must not exceed 1",
            });
        }
        Ok(Self {
            scenario,
            participation_rate,
            shift_fraction,
        })
    }

    /// Share of a red hour's demand that is moved.
    pub fn shifted_share(&self) -> f64 {
        self.participation_rate * self.shift_fraction
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            scenario: ScenarioKind::NormalDay,
            participation_rate: Self::DEFAULT_PARTICIPATION_RATE,
            shift_fraction: Self::DEFAULT_SHIFT_FRACTION,
        }
    }
}

fn check_unit_interval(name: &'static str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::InvalidParameter {
            name,
            value,
            reason: "must be in [0, 1]",
        })
    }
}

/// Operational risk of one hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLight {
    Green,
    Yellow,
    Red,
}

impl TrafficLight {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for TrafficLight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Where the baseline of a run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineOrigin {
    /// Aggregated historical measurements.
    History,
    /// A profile supplied in configuration.
    Custom,
    /// The built-in profile used when no source is available.
    Fallback,
}

impl fmt::Display for BaselineOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::History => "history",
            Self::Custom => "custom",
            Self::Fallback => "fallback",
        })
    }
}

/// Complete record of one simulated hour, baseline and flex side by side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourResult {
    pub hour: usize,
    /// Scenario demand before shifting (m³/h).
    pub demand: f64,
    /// Demand after demand-response shifting (m³/h).
    pub demand_flex: f64,
    pub stress_index: f64,
    pub stress_index_flex: f64,
    /// Reservoir volume (m³).
    pub tank_level: f64,
    pub tank_level_flex: f64,
    pub color: TrafficLight,
    pub color_flex: TrafficLight,
}

impl fmt::Display for HourResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "h={:>2} | demand={:>7.2} -> {:>7.2} m3/h | stress={:>5.3} -> {:>5.3} | \
             tank={:>7.1} -> {:>7.1} m3 | {:<6} -> {}",
            self.hour,
            self.demand,
            self.demand_flex,
            self.stress_index,
            self.stress_index_flex,
            self.tank_level,
            self.tank_level_flex,
            self.color,
            self.color_flex,
        )
    }
}

/// Outcome of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// One entry per hour, index equals hour.
    pub hourly_data: [HourResult; HOURS_PER_DAY],
    pub stats: SummaryStats,
    /// Parameters the run used.
    pub config: SimulationParameters,
    pub baseline_source: BaselineOrigin,
}
